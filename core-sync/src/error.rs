use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),

    #[error("Sync job not found: {0}")]
    JobNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
