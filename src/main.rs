use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use pathpulse::app::AppContext;
use pathpulse::catalog::Catalog;
use pathpulse::cli::{Cli, Command, CommandArguments};
use pathpulse::commands::{self, RunOptions};
use pathpulse::config::{RulesConfig, Settings};
use pathpulse::error::{ServiceError, ServiceResult};
use pathpulse::notify::ConsoleNotifier;
use pathpulse::shell;
use pathpulse::storage::{FileStorage, MemoryStorage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn build_context(args: &CommandArguments) -> ServiceResult<AppContext<FileStorage, ConsoleNotifier>> {
    let settings = Settings::load(&args.settings_file())?;
    let mut rules = settings.rules;
    if let Some(xp) = args.xp_per_step {
        rules.xp_per_step = xp;
    }
    rules.validate().map_err(ServiceError::InvalidArguments)?;

    let catalog = match args.catalog.as_ref().or(settings.catalog_file.as_ref()) {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::embedded()?,
    };
    let storage = FileStorage::open(args.session_file())?;
    tracing::debug!(session = %storage.path().display(), "session storage opened");
    Ok(AppContext::new(storage, catalog, rules, ConsoleNotifier))
}

fn execute(cli: Cli) -> ServiceResult<()> {
    cli.args
        .validate()
        .map_err(ServiceError::InvalidArguments)?;
    let options = RunOptions {
        interactive: !cli.args.no_input && std::io::stdin().is_terminal(),
        settings_path: cli.args.settings_file(),
    };

    // These do not touch the session.
    if matches!(cli.command, Command::Version | Command::Schema | Command::Config) {
        let mut app = AppContext::new(
            MemoryStorage::new(),
            Catalog::embedded()?,
            RulesConfig::default(),
            ConsoleNotifier,
        );
        return commands::run(&mut app, &options, cli.command);
    }

    let mut app = build_context(&cli.args)?;
    match cli.command {
        Command::Shell => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(shell::run(&mut app, &options))
        }
        command => commands::run(&mut app, &options, command),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            if !err.was_notified() {
                eprintln!("{} {err}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}
