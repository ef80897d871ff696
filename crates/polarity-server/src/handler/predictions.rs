//! Sentiment prediction handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::get;

use super::request::PredictionRequest;
use super::response::PredictionResponse;
use crate::extract::Json;
use crate::handler::Result;
use crate::service::{PredictionService, ServiceState};

/// Tracing target for prediction operations.
const TRACING_TARGET: &str = "polarity_server::handler::predictions";

/// Plain-text usage returned by `GET /predict`.
pub const PREDICT_USAGE: &str = r#"post /predict

Predicts the sentiment of an input text using a model trained on movie reviews.
Return value is a score between 0 and 1.
Above 0.5 is considered positive sentiment.

Inputs:
    text (string)
Outputs:
    score (float)

Example input:
{
    "text": "this movie really sucked"
}

Example output:
{
    "score": 0.1
}
"#;

async fn usage() -> &'static str {
    PREDICT_USAGE
}

#[tracing::instrument(skip_all)]
async fn predict(
    State(predictions): State<PredictionService>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>> {
    let text = request.text()?;

    tracing::debug!(target: TRACING_TARGET, chars = text.len(), "Prediction requested");

    let score = predictions.predict(text).await.inspect_err(|error| {
        tracing::error!(target: TRACING_TARGET, error = %error, "Prediction failed");
    })?;

    tracing::info!(target: TRACING_TARGET, score = score, "Prediction served");

    Ok(Json(PredictionResponse::new(score)))
}

/// Returns a [`Router`] with the prediction routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/predict", get(usage).post(predict))
}
