use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a page or an artifact.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid header '{name}' for {url}: {reason}")]
    InvalidHeader {
        url: String,
        name: String,
        reason: String,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::InvalidHeader { url, .. } => {
                url
            }
        }
    }
}

/// The site adapter could not make sense of a fetched page.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("unexpected page layout at {url}: {reason}")]
    MissingStructure { url: String, reason: String },

    #[error("no metadata was handed down for {0}")]
    MissingMetadata(String),

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root page {url} could not be fetched: {reason}")]
    RootUnavailable { url: String, reason: String },

    #[error("Root page {url} could not be parsed: {reason}")]
    RootUnparseable { url: String, reason: String },

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Failed writing {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ScanError {
    /// Whether this error ends the whole run rather than a single node.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RootUnavailable { .. }
                | Self::RootUnparseable { .. }
                | Self::Metadata { .. }
                | Self::InvalidUrl(_)
                | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
