#[derive(Debug, thiserror::Error)]
pub enum FareError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decimal error: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to persist '{key}': {reason}")]
    Persistence { key: String, reason: String },

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Rendering failed: {0}")]
    Rendering(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Duplicate observation key: {0}")]
    DuplicateKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl FareError {
    /// Wrap any storage-layer failure for `key` as a persistence failure.
    pub fn persistence(key: &str, reason: impl std::fmt::Display) -> Self {
        FareError::Persistence {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FareError>;
