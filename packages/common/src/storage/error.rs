use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing is stored under the key.
    #[error("no blob at {0}")]
    NotFound(String),

    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A digest string that is not 64 hex characters.
    #[error("not a SHA-256 hex digest: {0}")]
    InvalidHash(String),
}
