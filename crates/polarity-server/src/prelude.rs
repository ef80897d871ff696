//! Prelude module for polarity-server.
//!
//! This module re-exports the most commonly used types and traits from polarity-server,
//! making it easy to import everything you need with a single `use` statement.
//!
//! # Example
//!
//! ```rust
//! use polarity_server::prelude::*;
//! ```

// Re-export extractor types
pub use crate::extract::*;
// Re-export handler types
pub use crate::handler::{Error, ErrorKind, Result, routes};
// Re-export middleware types
pub use crate::middleware::*;
// Re-export service types
pub use crate::service::*;
