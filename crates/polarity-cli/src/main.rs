#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod server;

use std::process::ExitCode;

use anyhow::Context;

use crate::command::{CliError, Command};
use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "polarity_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "polarity_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "polarity_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "polarity_cli::command";

/// Exit status for command-line misuse, matching clap's own usage errors.
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let error = match run().await {
        Ok(()) => return ExitCode::SUCCESS,
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    if error.downcast_ref::<CliError>().is_some() {
        ExitCode::from(EXIT_USAGE)
    } else {
        ExitCode::FAILURE
    }
}

/// Parses the command line, validates what the command needs, and runs it.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let command = Command::from_name(&cli.command)?;
    cli.validate(command).context("invalid configuration")?;

    command.run(&cli).await
}
