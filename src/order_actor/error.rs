use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderStatus, Role};

/// Errors that can occur while building or advancing an order.
///
/// Everything except `NotFound` and `Store` is a validation failure: the caller
/// keeps its input and may correct and resubmit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Table number is required for table service")]
    MissingTableLabel,
    #[error("No payment method selected")]
    NoPaymentMethodSelected,
    #[error("Order total does not fit in the amount range")]
    AmountOverflow,
    #[error("Payment amount mismatch: given {given}, expected {expected}")]
    PaymentAmountMismatch { given: u64, expected: u64 },
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
    #[error("{actor} may not move an order from {from} to {to}")]
    ActorNotPermitted {
        actor: Role,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order store error: {0}")]
    Store(#[from] FrameworkError),
}

impl OrderError {
    /// True for input problems the user can fix; false for store failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::Store(_))
    }

    /// Maps a store failure onto the order error.
    pub fn from_store(error: FrameworkError) -> Self {
        match error {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
