//! Command-line and environment configuration.
//!
//! ```text
//! Cli
//! ├── command, text                # What to run, and the text to score
//! ├── service: ServiceConfig       # Remote store, local artifact directory
//! ├── training: TrainingConfig     # Tokenizer and classifier fitting
//! ├── recovery: RecoveryConfig     # Request timeout
//! └── server: ServerConfig         # Host, port, shutdown
//! ```
//!
//! Every option has an environment variable twin; flags win over the
//! environment, and a `.env` file is read first when the `dotenv` feature is on.

mod server;

use std::process;

use anyhow::{Context, anyhow};
use clap::Parser;
use polarity_model::TrainingConfig;
use polarity_server::middleware::RecoveryConfig;
use polarity_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Everything a `polarity` invocation is configured with.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "polarity")]
#[command(about = "Sentiment scoring for short English texts")]
#[command(version)]
pub struct Cli {
    /// One of: predict, train, upload, download, all, serve.
    #[arg(default_value = "all")]
    pub command: String,

    /// Words to score, joined with spaces (predict only).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    #[serde(default)]
    pub text: Vec<String>,

    /// Remote store and local artifact directory.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Training hyperparameters.
    #[clap(flatten)]
    pub training: TrainingConfig,

    /// Recovery middleware configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,
}

impl Cli {
    /// Reads `.env`, then parses the process arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("polarity: ignoring unreadable .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Installs a stderr subscriber filtered by `RUST_LOG`, `info` by default.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates the configuration `command` depends on.
    ///
    /// The remote location is checked before any work starts, for every
    /// command that touches the store.
    pub fn validate(&self, command: Command) -> anyhow::Result<()> {
        if command.uses_store() {
            self.service
                .storage
                .validate()
                .context("invalid storage configuration")?;
        }

        if matches!(command, Command::Train | Command::All) {
            self.training
                .validate()
                .context("invalid training configuration")?;
        }

        if command == Command::Serve {
            self.server
                .validate()
                .context("invalid server configuration")?;

            self.recovery
                .validate()
                .map_err(|message| anyhow!(message))
                .context("invalid recovery configuration")?;
        }

        Ok(())
    }

    /// Logs the build and the artifact settings at debug level. Credentials
    /// are never logged.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            target_os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "polarity starting"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            command = %self.command,
            backend = self.service.storage.backend_name(),
            bucket = ?self.service.storage.bucket,
            data_dir = %self.service.artifacts.data_dir.display(),
            model_file = %self.service.artifacts.model_file,
            tokenizer_file = %self.service.artifacts.tokenizer_file,
            "Artifact configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "s3").then_some("s3"),
            cfg!(feature = "gcs").then_some("gcs"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("polarity").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_defaults_to_all() {
        let cli = parse(&[]);
        assert_eq!(cli.command, "all");
        assert!(cli.text.is_empty());
    }

    #[test]
    fn predict_collects_the_remaining_words() {
        let cli = parse(&["--bucket", "artifacts", "predict", "not", "-so", "bad"]);
        assert_eq!(cli.command, "predict");
        assert_eq!(cli.text, ["not", "-so", "bad"]);
        assert_eq!(cli.service.storage.bucket.as_deref(), Some("artifacts"));
    }

    #[test]
    fn store_commands_require_a_bucket() {
        let mut cli = parse(&["upload"]);
        cli.service.storage.bucket = None;

        assert!(cli.validate(Command::Upload).is_err());
        assert!(cli.validate(Command::Train).is_ok());

        cli.service.storage.bucket = Some("artifacts".to_owned());
        assert!(cli.validate(Command::Upload).is_ok());
    }

    #[test]
    fn serve_checks_the_request_timeout() {
        let mut cli = parse(&["--bucket", "artifacts", "serve"]);
        assert!(cli.validate(Command::Serve).is_ok());

        cli.recovery.request_timeout = 0;
        assert!(cli.validate(Command::Serve).is_err());
        assert!(cli.validate(Command::Download).is_ok());
    }
}
