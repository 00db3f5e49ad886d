use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::app::AppContext;
use crate::cli::{Cli, Command};
use crate::commands::{self, RunOptions};
use crate::error::ServiceResult;
use crate::metadata::PKG_NAME;
use crate::notify::Notifier;
use crate::storage::SessionStorage;

/// Splits a shell line into words. Double quotes group words; a backslash
/// escapes the next character.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    Cli::try_parse_from(std::iter::once(PKG_NAME.to_string()).chain(words))
        .map(|cli| Some(cli.command))
        .map_err(|e| e.to_string())
}

/// Runs one shell line and returns what still needs printing. Failures the
/// notifier already showed return `None`.
fn handle_line<S: SessionStorage, N: Notifier>(
    app: &mut AppContext<S, N>,
    options: &RunOptions,
    line: &str,
) -> Option<String> {
    let command = match parse_line(line) {
        Ok(Some(Command::Shell)) | Ok(None) => return None,
        Ok(Some(command)) => command,
        Err(message) => return Some(message),
    };
    match commands::run(app, options, command) {
        Ok(()) => None,
        Err(err) => {
            tracing::debug!(error = %err, "shell command failed");
            (!err.was_notified()).then(|| err.to_string().red().to_string())
        }
    }
}

/// Reads commands from stdin one line at a time until `exit`, EOF or Ctrl-C.
/// Each line runs to completion before the next is read.
pub async fn run<S: SessionStorage, N: Notifier>(
    app: &mut AppContext<S, N>,
    options: &RunOptions,
) -> ServiceResult<()> {
    let options = RunOptions {
        interactive: false,
        ..options.clone()
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    println!(
        "{} interactive shell. Type `help` for commands, `exit` to quit.",
        PKG_NAME.bold()
    );

    loop {
        stdout.write_all(b"pathpulse> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                tracing::debug!("shell interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match line.trim() {
            "exit" | "quit" => break,
            "help" => {
                if let Err(e) = Cli::try_parse_from([PKG_NAME, "help"]) {
                    println!("{e}");
                }
                continue;
            }
            _ => {}
        }

        if let Some(message) = handle_line(app, &options, &line) {
            println!("{message}");
        }
    }
    Ok(())
}
