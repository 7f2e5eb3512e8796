use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnchorError {
    /// The anchor store could not be reached or rejected the write.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("invalid anchor: {0}")]
    InvalidAnchor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnchorError {
    pub fn is_persistence(&self) -> bool {
        matches!(self, AnchorError::PersistenceUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, AnchorError>;
