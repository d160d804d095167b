use thiserror::Error;

/// Failures reported by the match engine to its callers.
///
/// All variants are local and recoverable; none of them leave a match in a
/// partially mutated state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code used by the JSON API.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CoreError::IllegalState(_) => "ILLEGAL_STATE",
            CoreError::Internal(_) => "INTERNAL",
        }
    }
}

/// Failures while loading or validating the startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
