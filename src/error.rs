use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
///
/// These are fatal: they fail fast and are never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("unknown service '{service}': no rate rule configured")]
    UnknownService { service: String },

    #[error("malformed override for {key}: {reason}")]
    MalformedOverride { key: String, reason: String },
}

/// A metric or price history could not be obtained for an asset.
///
/// Surfaced to the scoring boundary as an unscored asset; never aborts
/// scoring of other assets.
#[derive(Error, Debug, Clone)]
pub enum DataError {
    #[error("{metric} unavailable for {asset}: {reason}")]
    Unavailable {
        asset: String,
        metric: &'static str,
        reason: String,
    },

    #[error("expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("dispatcher shut down before {request} was admitted")]
    DispatcherClosed { request: String },
}

pub type Result<T> = std::result::Result<T, Error>;
