//! Response types for HTTP handlers.

mod error_response;
mod predictions;

pub use error_response::ErrorResponse;
pub use predictions::PredictionResponse;
