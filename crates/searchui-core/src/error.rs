//! Error types shared across searchui crates.

use thiserror::Error;

/// Failure to load or validate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config source error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A user action was rejected before any network call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a search query first.")]
    EmptyQuery,
    #[error("unknown sort field {0:?}")]
    UnknownSortField(String),
    #[error("invalid sort direction {0:?} (expected ASC or DESC)")]
    InvalidSortDirection(String),
    #[error("unknown relevancy model {0:?}")]
    UnknownRelevancyModel(String),
}

/// A search or signal call failed.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unsupported protocol {0:?}")]
    UnsupportedProtocol(String),
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("search request timed out after {0}ms")]
    Timeout(u64),
}

/// Writing an export artifact failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not persist staged file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("{titles} column titles for {keys} column keys")]
    ColumnMismatch { titles: usize, keys: usize },
}

/// A single webplayer message attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("invalid target origin {0:?}")]
    InvalidOrigin(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("target answered HTTP {0}")]
    Status(u16),
    #[error("attempt timed out")]
    Timeout,
}
