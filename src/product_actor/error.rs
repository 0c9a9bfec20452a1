use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::actors::AssetError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Product image upload failed: {0}")]
    Asset(#[from] AssetError),
    #[error("Product store error: {0}")]
    Store(#[from] FrameworkError),
}

impl ProductError {
    /// Maps a store failure onto the domain error: rejections become validation errors.
    pub fn from_store(error: FrameworkError) -> Self {
        match error {
            FrameworkError::Rejected(message) => Self::ValidationError(message),
            FrameworkError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
