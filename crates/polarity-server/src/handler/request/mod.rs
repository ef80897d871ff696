//! Request types for HTTP handlers.

mod predictions;

pub use predictions::PredictionRequest;
