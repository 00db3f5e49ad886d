use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::storage::FileStorage;
use crate::types::{ResourceType, Role};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub args: CommandArguments,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in as a learner (or admin) and open your home page
    Login(Credentials),
    /// Log in to the admin dashboard
    AdminLogin(Credentials),
    /// Create a new account
    Signup(SignupArgs),
    /// Set interests, learning goal and weekly hours
    Setup(SetupArgs),
    /// End the current login
    Logout,
    /// Show the logged-in profile
    Whoami,
    /// Show progress across all roadmaps
    Dashboard,
    /// List available roadmaps
    Roadmaps,
    /// Show one roadmap with step status and locks
    Roadmap {
        /// Roadmap id
        id: String,
    },
    /// Mark a step as in progress
    Start {
        roadmap: String,
        step: String,
    },
    /// Mark a step as completed
    Complete {
        roadmap: String,
        step: String,
    },
    /// Open a page by path, e.g. /dashboard or /roadmap/1
    Go {
        path: String,
    },
    /// Curate roadmap resources (admins only)
    #[command(subcommand)]
    Admin(AdminCommand),
    /// List badges and which ones you hold
    Badges,
    /// Print the JSON schema of the stored profile
    Schema,
    /// Open an interactive config editor for settings.json
    Config,
    /// Clear the whole session store
    Reset,
    /// Run commands interactively until `exit` or Ctrl-C
    Shell,
    /// Print version information
    Version,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Show roadmaps, steps and resource ids
    List,
    /// Add a resource to a step
    Add {
        roadmap: String,
        step: String,
        #[command(flatten)]
        resource: ResourceArgs,
    },
    /// Edit an existing resource; omitted fields keep their value
    Edit {
        roadmap: String,
        step: String,
        resource_id: String,
        #[command(flatten)]
        resource: ResourceArgs,
    },
    /// Delete a resource
    Delete {
        roadmap: String,
        step: String,
        resource_id: String,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub confirm_password: Option<String>,
    /// learner or admin
    #[arg(long)]
    pub role: Option<Role>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupArgs {
    /// Interest id, repeatable (web-dev, mobile-dev, data-science, ui-ux, devops, cybersecurity)
    #[arg(long = "interest")]
    pub interests: Vec<String>,
    #[arg(long)]
    pub goal: Option<String>,
    /// Hours per week (1-40)
    #[arg(long)]
    pub hours: Option<u32>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    /// video, blog or quiz
    #[arg(long = "type")]
    pub kind: Option<ResourceType>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CommandArguments {
    /// Directory holding the session file
    #[arg(long, env = "PATHPULSE_SESSION_DIR", global = true)]
    pub session_dir: Option<PathBuf>,

    /// Settings file (defaults to the user config dir)
    #[arg(long, env = "PATHPULSE_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Content catalog JSON replacing the built-in roadmaps and demo users
    #[arg(long, env = "PATHPULSE_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// XP awarded for each newly completed step
    #[arg(long, env = "PATHPULSE_XP_PER_STEP", global = true)]
    pub xp_per_step: Option<u64>,

    /// Never prompt; missing fields are an error
    #[arg(long, env = "PATHPULSE_NO_INPUT", default_value_t = false, global = true)]
    pub no_input: bool,
}

impl CommandArguments {
    pub fn session_file(&self) -> PathBuf {
        match &self.session_dir {
            Some(dir) => dir.join("session.json"),
            None => FileStorage::default_path(),
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(crate::config::Settings::default_path)
    }

    /// Validate CLI/environment-derived arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(dir) = &self.session_dir {
            if dir.is_file() {
                return Err(format!(
                    "PATHPULSE_SESSION_DIR '{}' is a file, expected a directory",
                    dir.display()
                ));
            }
        }
        if let Some(catalog) = &self.catalog {
            if !catalog.is_file() {
                return Err(format!(
                    "PATHPULSE_CATALOG '{}' does not exist",
                    catalog.display()
                ));
            }
        }
        if self.xp_per_step == Some(0) {
            return Err("PATHPULSE_XP_PER_STEP must be greater than zero".to_string());
        }
        Ok(())
    }
}
