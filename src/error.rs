use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors with structured variants.
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

    #[error("{0}")]
    Other(String),
}

/// Model discovery and loading errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("model '{name}' not found")]
    NotFound { name: String },

    #[error("unsupported or invalid model at {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to load model '{name}': {reason}")]
    LoadFailed { name: String, reason: String },

    #[error("artifact at {} did not stabilize in time", path.display())]
    Unstable { path: PathBuf },

    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Inference container errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("serving container for '{name}' did not become available within {timeout_secs}s")]
    ReadinessTimeout { name: String, timeout_secs: u64 },

    #[error("no free port in range {start}-{end}")]
    NoFreePort { start: u16, end: u16 },

    #[error("container engine error: {0}")]
    Engine(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("container registry persistence error: {0}")]
    Persistence(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a container engine failure.
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Container(ContainerError::Engine(message.into()))
    }

    /// Whether this error means the named model is unknown.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Model(ModelError::NotFound { .. }))
    }
}
