//! Storage error types
//!
//! These never reach the player: progress and settings code swallows them
//! and falls back to defaults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing store could not be reached (no window, no LocalStorage, ...)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Store refused the write (quota, private mode, ...)
    #[error("write rejected for key `{key}`")]
    Rejected { key: String },
}
