use std::path::{Path, PathBuf};

use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};

use crate::admin::ResourceDraft;
use crate::app::AppContext;
use crate::auth::{DEFAULT_WEEKLY_TIME, INTERESTS, LoginForm, ProfileSetupForm, SignupForm};
use crate::cli::{AdminCommand, Command, Credentials, ResourceArgs, SetupArgs, SignupArgs};
use crate::config::Settings;
use crate::error::{ServiceError, ServiceResult};
use crate::metadata::{PKG_LICENSE, PKG_NAME, PKG_VERSION};
use crate::notify::Notifier;
use crate::render;
use crate::routes::Route;
use crate::storage::SessionStorage;
use crate::types::{BadgeCriteria, ResourceType, Role, StepTransition, UserProfile};

/// How a command may gather missing input.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub interactive: bool,
    pub settings_path: PathBuf,
}

fn ask(options: &RunOptions, flag: &str, prompt: &str, value: Option<String>) -> ServiceResult<String> {
    match value {
        Some(value) => Ok(value),
        None if options.interactive => Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
        None => Err(ServiceError::InvalidArguments(format!("missing --{flag}"))),
    }
}

fn ask_secret(options: &RunOptions, flag: &str, prompt: &str, value: Option<String>) -> ServiceResult<String> {
    match value {
        Some(value) => Ok(value),
        None if options.interactive => Ok(Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?),
        None => Err(ServiceError::InvalidArguments(format!("missing --{flag}"))),
    }
}

fn credentials(options: &RunOptions, args: Credentials) -> ServiceResult<LoginForm> {
    Ok(LoginForm {
        email: ask(options, "email", "Email", args.email)?,
        password: ask_secret(options, "password", "Password", args.password)?,
    })
}

fn signup_form(options: &RunOptions, args: SignupArgs) -> ServiceResult<SignupForm> {
    let name = ask(options, "name", "Full name", args.name)?;
    let email = ask(options, "email", "Email", args.email)?;
    let password = ask_secret(options, "password", "Password", args.password)?;
    let confirm_password = ask_secret(
        options,
        "confirm-password",
        "Confirm password",
        args.confirm_password,
    )?;
    let role = match args.role {
        Some(role) => role,
        None if options.interactive => {
            let picked = Select::new()
                .with_prompt("I am joining as")
                .items(&["Learner", "Admin"])
                .default(0)
                .interact()?;
            if picked == 1 { Role::Admin } else { Role::Learner }
        }
        None => Role::Learner,
    };
    Ok(SignupForm {
        name,
        email,
        password,
        confirm_password,
        role,
    })
}

fn setup_form(options: &RunOptions, args: SetupArgs) -> ServiceResult<ProfileSetupForm> {
    let interests = if args.interests.is_empty() && options.interactive {
        let labels: Vec<&str> = INTERESTS.iter().map(|(_, label)| *label).collect();
        MultiSelect::new()
            .with_prompt("What are you interested in learning?")
            .items(&labels)
            .interact()?
            .into_iter()
            .map(|index| INTERESTS[index].0.to_string())
            .collect()
    } else {
        args.interests
    };
    let learning_goal = match args.goal {
        Some(goal) => goal,
        None if options.interactive => Input::<String>::new()
            .with_prompt("What's your learning goal?")
            .allow_empty(true)
            .interact_text()?,
        None => String::new(),
    };
    let weekly_time = match args.hours {
        Some(hours) => hours,
        None if options.interactive => Input::<u32>::new()
            .with_prompt("Hours per week")
            .default(DEFAULT_WEEKLY_TIME)
            .interact_text()?,
        None => DEFAULT_WEEKLY_TIME,
    };
    Ok(ProfileSetupForm {
        interests,
        learning_goal,
        weekly_time,
    })
}

fn resource_draft(options: &RunOptions, args: ResourceArgs, base: ResourceDraft) -> ServiceResult<ResourceDraft> {
    let title = match args.title {
        Some(title) => title,
        None if !base.title.is_empty() => base.title,
        None if options.interactive => ask(options, "title", "Title", None)?,
        None => String::new(),
    };
    let url = match args.url {
        Some(url) => url,
        None if !base.url.is_empty() => base.url,
        None if options.interactive => ask(options, "url", "URL", None)?,
        None => String::new(),
    };
    let kind = match args.kind {
        Some(kind) => kind,
        None if options.interactive => {
            let current = ResourceType::ALL
                .iter()
                .position(|k| *k == base.kind)
                .unwrap_or(0);
            ResourceType::ALL[Select::new()
                .with_prompt("Type")
                .items(&ResourceType::ALL)
                .default(current)
                .interact()?]
        }
        None => base.kind,
    };
    Ok(ResourceDraft {
        title,
        url,
        kind,
        description: args.description.unwrap_or(base.description),
    })
}

/// Prints the page a route leads to.
pub fn show<S: SessionStorage, N: Notifier>(app: &mut AppContext<S, N>, route: &Route) -> ServiceResult<()> {
    match route {
        Route::Landing => print!("{}", render::landing()),
        Route::Login => println!("Log in with `login` or `admin-login`."),
        Route::Signup => println!("Create an account with `signup`."),
        Route::AdminLogin => println!("Log in as an administrator with `admin-login`."),
        Route::ProfileSetup => println!("Finish your profile with `setup`."),
        Route::Dashboard => {
            let view = app.dashboard()?;
            print!("{}", render::dashboard(&view));
        }
        Route::AdminDashboard => print!("{}", render::admin_overview(&app.catalog().roadmaps)),
        Route::Roadmap(id) => {
            let view = app.roadmap_view(id)?;
            print!("{}", render::roadmap(&view));
        }
        Route::NotFound(path) => print!("{}", render::not_found(path)),
    }
    Ok(())
}

fn mark<S: SessionStorage, N: Notifier>(
    app: &mut AppContext<S, N>,
    roadmap: &str,
    step: &str,
    transition: StepTransition,
) -> ServiceResult<()> {
    let outcome = app.mark_step(roadmap, step, transition)?;
    println!(
        "{} {} XP",
        "Total:".dimmed(),
        outcome.profile.xp.to_string().cyan()
    );
    Ok(())
}

fn admin<S: SessionStorage, N: Notifier>(
    app: &mut AppContext<S, N>,
    options: &RunOptions,
    command: AdminCommand,
) -> ServiceResult<()> {
    match command {
        AdminCommand::List => {
            let route = app.navigate("/admin-dashboard").route;
            show(app, &route)?;
        }
        AdminCommand::Add {
            roadmap,
            step,
            resource,
        } => {
            let draft = resource_draft(options, resource, ResourceDraft::default())?;
            let added = app.admin_add_resource(&roadmap, &step, draft)?;
            println!("{} {}", "id".dimmed(), added.id);
        }
        AdminCommand::Edit {
            roadmap,
            step,
            resource_id,
            resource,
        } => {
            let existing = app
                .catalog()
                .roadmap(&roadmap)
                .and_then(|r| r.step(&step))
                .and_then(|s| s.resources.iter().find(|r| r.id == resource_id))
                .map(ResourceDraft::from_resource)
                .unwrap_or_default();
            let draft = resource_draft(options, resource, existing)?;
            app.admin_update_resource(&roadmap, &step, &resource_id, draft)?;
        }
        AdminCommand::Delete {
            roadmap,
            step,
            resource_id,
        } => {
            app.admin_delete_resource(&roadmap, &step, &resource_id)?;
        }
    }
    Ok(())
}

/// Walks the settings through dialoguer prompts and saves them.
pub fn edit_settings(path: &Path) -> ServiceResult<Settings> {
    let mut settings = Settings::load(path)?;
    println!("{} {}", "Editing".bold(), path.display());

    settings.rules.xp_per_step = Input::<u64>::new()
        .with_prompt("XP per completed step")
        .default(settings.rules.xp_per_step)
        .interact_text()?;

    if Confirm::new()
        .with_prompt("Edit badge thresholds?")
        .default(false)
        .interact()?
    {
        for badge in &mut settings.rules.badges {
            let prompt = format!("{} {}", badge.image, badge.name);
            match &mut badge.criteria {
                BadgeCriteria::Xp { value } => {
                    *value = Input::<u64>::new()
                        .with_prompt(format!("{prompt} (XP)"))
                        .default(*value)
                        .interact_text()?;
                }
                BadgeCriteria::CompletedSteps { value } | BadgeCriteria::RoadmapCompleted { value, .. } => {
                    *value = Input::<usize>::new()
                        .with_prompt(format!("{prompt} (steps)"))
                        .default(*value)
                        .interact_text()?;
                }
            }
        }
    }

    let catalog = Input::<String>::new()
        .with_prompt("Catalog file (empty for built-in)")
        .allow_empty(true)
        .with_initial_text(
            settings
                .catalog_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
        .interact_text()?;
    settings.catalog_file = (!catalog.trim().is_empty()).then(|| PathBuf::from(catalog.trim()));

    settings
        .rules
        .validate()
        .map_err(ServiceError::InvalidArguments)?;
    settings.save(path)?;
    println!("{}", "Settings saved.".green());
    Ok(settings)
}

pub fn profile_schema() -> ServiceResult<String> {
    let schema = schemars::schema_for!(UserProfile);
    Ok(serde_json::to_string_pretty(&schema)?)
}

fn version_line() -> String {
    format!("{PKG_NAME} {PKG_VERSION} ({PKG_LICENSE})")
}

/// Runs one command against the session. `Shell` is handled by the caller.
pub fn run<S: SessionStorage, N: Notifier>(
    app: &mut AppContext<S, N>,
    options: &RunOptions,
    command: Command,
) -> ServiceResult<()> {
    match command {
        Command::Login(args) => {
            let form = credentials(options, args)?;
            let route = app.login(&form)?;
            show(app, &route)?;
        }
        Command::AdminLogin(args) => {
            let form = credentials(options, args)?;
            let route = app.admin_login(&form)?;
            show(app, &route)?;
        }
        Command::Signup(args) => {
            let form = signup_form(options, args)?;
            let route = app.signup(&form)?;
            show(app, &route)?;
        }
        Command::Setup(args) => {
            app.require_user()?;
            let form = setup_form(options, args)?;
            let route = app.profile_setup(&form)?;
            show(app, &route)?;
        }
        Command::Logout => {
            app.logout()?;
        }
        Command::Whoami => match app.current() {
            Some(profile) => print!("{}", render::profile(profile)),
            None => println!("{}", "Not logged in.".dimmed()),
        },
        Command::Dashboard => {
            let route = app.navigate("/dashboard").route;
            show(app, &route)?;
        }
        Command::Roadmaps => print!("{}", render::roadmap_list(&app.catalog().roadmaps)),
        Command::Roadmap { id } => {
            let route = app.navigate(&format!("/roadmap/{id}")).route;
            show(app, &route)?;
        }
        Command::Start { roadmap, step } => mark(app, &roadmap, &step, StepTransition::InProgress)?,
        Command::Complete { roadmap, step } => mark(app, &roadmap, &step, StepTransition::Completed)?,
        Command::Go { path } => {
            let route = app.navigate(&path).route;
            show(app, &route)?;
        }
        Command::Admin(command) => admin(app, options, command)?,
        Command::Badges => print!(
            "{}",
            render::badge_catalog(&app.rules().badges, app.current())
        ),
        Command::Schema => println!("{}", profile_schema()?),
        Command::Config => {
            if !options.interactive {
                return Err(ServiceError::InvalidArguments(
                    "config needs an interactive terminal".to_string(),
                ));
            }
            edit_settings(&options.settings_path)?;
            println!("Changes apply from the next command.");
        }
        Command::Reset => {
            app.reset()?;
            println!("{}", "Session cleared.".green());
        }
        Command::Shell => {
            return Err(ServiceError::InvalidArguments(
                "the shell is already running".to_string(),
            ));
        }
        Command::Version => println!("{}", version_line()),
    }
    Ok(())
}
