//! Error types for endevor-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.endevor/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("search location '{name}' already exists")]
    LocationExists { name: String },

    /// No service was given and the store does not hold exactly one.
    #[error("no service specified; available services: [{}]", available.join(", "))]
    ServiceNotSpecified { available: Vec<String> },

    /// Names become file names, so separators and leading dots are refused.
    #[error("invalid name '{0}': must be non-empty and must not contain path separators")]
    InvalidName(String),

    #[error("invalid service URL '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },
}

/// Errors from encoding or decoding generic report URIs.
#[derive(Debug, Error)]
pub enum ReportUriError {
    #[error("invalid report URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("Uri scheme is incorrect: {actual}, but should be: {expected}")]
    WrongScheme { actual: String, expected: &'static str },

    #[error("report URI has no query")]
    MissingQuery,

    #[error("report URI query is not valid UTF-8 after decoding")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("report URI query is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
