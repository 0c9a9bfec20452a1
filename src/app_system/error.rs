use thiserror::Error;

use crate::actors::AssetError;
use crate::category_actor::CategoryError;
use crate::domain::CartError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// Top-level error for code driving the whole system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Actor task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
