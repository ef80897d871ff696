//! Command dispatch.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use polarity_core::{ArtifactKind, BlobStore};
use polarity_model::Trainer;
use polarity_opendal::StorageBackend;
use polarity_runtime::{ArtifactSync, Predictor, SentimentPipeline, TrainingReport, train};
use polarity_server::handler::routes;
use polarity_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
use polarity_server::service::ServiceState;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::TRACING_TARGET_COMMAND;
use crate::config::Cli;
use crate::server;

/// Errors raised while interpreting the command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The positional command is not one of [`Command`]'s names.
    #[error("unknown command '{0}', expected one of: {expected}", expected = Command::names())]
    UnknownCommand(String),
}

/// What the binary does once configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    /// Score the remaining arguments.
    Predict,
    /// Fit both artifacts into the data directory.
    Train,
    /// Upload the tokenizer, then the model.
    Upload,
    /// Download the model.
    Download,
    /// Train, then upload the tokenizer, then the model.
    All,
    /// Serve the HTTP API.
    Serve,
}

impl Command {
    /// Parses a command name.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownCommand`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, CliError> {
        name.parse()
            .map_err(|_| CliError::UnknownCommand(name.to_owned()))
    }

    /// Returns whether this command needs the remote store.
    pub fn uses_store(self) -> bool {
        !matches!(self, Self::Train)
    }

    fn names() -> String {
        Self::iter()
            .map(|command| command.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Runs the command.
    pub async fn run(self, cli: &Cli) -> anyhow::Result<()> {
        tracing::debug!(target: TRACING_TARGET_COMMAND, command = %self, "Running command");

        match self {
            Self::Predict => {
                let text = cli.text.join(" ");
                let score = predict(cli, &text).await?;
                println!("{}", format_score(score));
            }
            Self::Train => {
                run_training(cli).await?;
            }
            Self::Upload => {
                let sync = artifact_sync(cli)?;
                upload(&sync, ArtifactKind::Tokenizer).await?;
                upload(&sync, ArtifactKind::Model).await?;
            }
            Self::Download => {
                let sync = artifact_sync(cli)?;
                sync.download(ArtifactKind::Model)
                    .await
                    .context("failed to download the model")?;
            }
            Self::All => {
                let sync = artifact_sync(cli)?;
                run_training(cli).await?;
                upload(&sync, ArtifactKind::Tokenizer).await?;
                upload(&sync, ArtifactKind::Model).await?;
            }
            Self::Serve => {
                serve(cli).await?;
            }
        }

        Ok(())
    }
}

/// Formats a score the way `predict` prints it.
pub fn format_score(score: f32) -> String {
    let sentiment = if score > 0.5 { "positive" } else { "negative" };
    format!("score is: {score:.2} ({sentiment} sentiment)")
}

fn store(cli: &Cli) -> anyhow::Result<Arc<dyn BlobStore>> {
    let backend = StorageBackend::new(cli.service.storage.clone())
        .context("failed to initialize the artifact store")?;
    Ok(Arc::new(backend))
}

fn artifact_sync(cli: &Cli) -> anyhow::Result<ArtifactSync> {
    Ok(ArtifactSync::new(store(cli)?, cli.service.artifacts.layout()))
}

async fn upload(sync: &ArtifactSync, kind: ArtifactKind) -> anyhow::Result<()> {
    sync.upload(kind)
        .await
        .with_context(|| format!("failed to upload the {kind}"))
}

async fn predict(cli: &Cli, text: &str) -> anyhow::Result<f32> {
    let pipeline = SentimentPipeline::from_store(store(cli)?, &cli.service.artifacts.layout());
    pipeline.predict(text).await.context("prediction failed")
}

async fn run_training(cli: &Cli) -> anyhow::Result<TrainingReport> {
    let layout = cli.service.artifacts.layout();
    let loader = cli.service.artifacts.corpus_loader();
    let trainer = Trainer::new(cli.training.clone());

    let report = train(&layout, &loader, &trainer)
        .await
        .context("training failed")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        sentences = report.sentences,
        vocabulary_size = report.vocabulary_size,
        accuracy = report.accuracy,
        "Artifacts trained"
    );

    Ok(report)
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let state = ServiceState::from_config(&cli.service).context("failed to create service state")?;

    state
        .predictions
        .warm_up()
        .await
        .context("failed to warm up the model")?;

    let router = create_router(state, &cli.recovery);
    server::serve(router, cli.server.clone()).await?;
    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, recovery: &RecoveryConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(recovery)
}
