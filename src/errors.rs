//! Custom error types for the envrisk scoring engine.
//!
//! Input problems, configuration problems and ambient I/O failures share one
//! enum so callers can match on the kind of failure they care about.

use std::path::PathBuf;

/// The main error type for envrisk operations.
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    /// No module produced a score, so there is nothing to aggregate
    #[error("Insufficient signal: no detection module produced a usable score")]
    InsufficientSignal,

    /// A collected field is malformed or outside its allowed range
    #[error("Invalid signal field '{field}': {reason}")]
    InvalidSignal { field: String, reason: String },

    /// Weight table or scoring policy rejected at configuration time
    #[error("Invalid configuration '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Computed composite score escaped [0, 100]
    #[error("Computed score {0} is outside [0, 100]")]
    ScoreOutOfRange(f64),

    /// I/O error (bundle or config read, report write)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("Failed to parse TOML config {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config file with an extension we cannot parse
    #[error("Unsupported config format for {path:?}: .{extension}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Thread pool initialization error
    #[error("Failed to initialize thread pool: {0}")]
    ThreadPool(String),
}

/// Result type alias using RiskError
pub type RiskResult<T> = Result<T, RiskError>;

impl RiskError {
    /// Create an input validation error for a named field
    pub fn invalid_signal(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSignal {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for RiskError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
