use thiserror::Error;

/// Errors that can occur while talking to object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be constructed from the given settings.
    #[error("object storage misconfigured: {0}")]
    Config(String),
    /// The backend rejected or failed a request.
    #[error("object storage request failed: {0}")]
    Backend(String),
}
