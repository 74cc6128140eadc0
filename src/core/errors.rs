use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the store, codec, and scheduler layers.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The backing storage could not be reached or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Stored data exists but fails to decode.
    #[error("Corrupt stored state: {0}")]
    CorruptState(String),
    /// Caller supplied data that violates a model invariant.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The host denied a precise-timer privilege. Not fatal; the scheduler
    /// escalates to its next fallback tier.
    #[error("Scheduling denied: {0}")]
    SchedulingDenied(String),
    /// A backup document is missing required fields or cannot be restored.
    #[error("Restore rejected: {0}")]
    RestoreRejected(String),
}

pub type Result<T> = StdResult<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::CorruptState(err.to_string())
    }
}
