//! Error types for building a predictor.

use thiserror::Error;

/// Errors raised while configuring a predictor.
///
/// Prediction and training themselves cannot fail; only construction and
/// configuration loading can.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration field is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON for [`Config`](crate::config::Config).
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for predictor construction.
pub type Result<T> = std::result::Result<T, Error>;
