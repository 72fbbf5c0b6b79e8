use std::io;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Recurring rule not found: {0}")]
    RuleNotFound(Uuid),
    #[error("Recurring rule {0} is already paused")]
    AlreadyPaused(Uuid),
    #[error("Recurring rule {0} is already active")]
    AlreadyActive(Uuid),
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Bad input, rejected before anything was written.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::InvalidFrequency(_) | CoreError::Validation(_))
    }

    /// Pause-while-paused or resume-while-active.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, CoreError::AlreadyPaused(_) | CoreError::AlreadyActive(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::RuleNotFound(_))
    }
}
