//! mp-core: shared ids, errors, configuration, and upload path rules.
//!
//! This crate is the foundational dependency for the other mp-* crates,
//! providing type-safe identifiers, a unified error type, application
//! configuration, and the filename rules applied to every uploaded image.

pub mod config;
pub mod error;
pub mod ids;
pub mod paths;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
