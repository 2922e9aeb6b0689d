//! Error types for grid generation
//!
//! The generation algorithms themselves never fail: out-of-range lookups are
//! skipped, unsplittable regions become leaves and cancellation is reported
//! through [`crate::generation::GenerationOutcome`]. Errors only come from the
//! edges of the crate (configuration, template lookup, file export).

use thiserror::Error;

/// Errors raised while configuring or exporting a generation run.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown tile template '{0}'")]
    UnknownTemplate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image export error: {0}")]
    Image(#[from] image::ImageError),
}

pub type GenResult<T> = Result<T, GenError>;
