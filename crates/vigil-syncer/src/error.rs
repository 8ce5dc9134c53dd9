use thiserror::Error;
use vigil_api::{ApiError, CacheError};
use vigil_core::ValidationError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The declared definitions are inconsistent with each other or with
    /// what exists remotely.
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("detail cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("confirmation prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}
