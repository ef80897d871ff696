//! Request extractors with JSON error responses.
//!
//! - [`Json`] - JSON deserialization whose rejections answer with the
//!   server's error body instead of axum's plain-text one.

mod json;

pub use crate::extract::json::Json;
