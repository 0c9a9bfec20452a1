use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category not found: {0}")]
    NotFound(String),
    #[error("Category validation error: {0}")]
    ValidationError(String),
    #[error("Category store error: {0}")]
    Store(#[from] FrameworkError),
}

impl CategoryError {
    /// Maps a store failure onto the domain error: rejections become validation errors.
    pub fn from_store(error: FrameworkError) -> Self {
        match error {
            FrameworkError::Rejected(message) => Self::ValidationError(message),
            FrameworkError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
