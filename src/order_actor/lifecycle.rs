//! Order construction, payment reconciliation and the status state machine.
//!
//! Everything here is synchronous and performs no I/O. Persisting the results
//! is the job of [`crate::clients::OrderClient`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use super::OrderError;
use crate::clock::Clock;
use crate::domain::{
    Cart, CartLine, CustomerType, Order, OrderCreate, OrderItem, OrderStatus, OrderTopping,
    PaymentMethod, Role, SourcePayment, TimelineEntry,
};

/// Label stored for customers not seated at a table.
pub const WALK_IN_LABEL: &str = "Vãng lai";

/// Surcharge per unit for an upsized drink, in đồng.
pub const DEFAULT_UPSIZE_SURCHARGE: u64 = 10_000;

/// Tunables of the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub upsize_surcharge: u64,
    pub walk_in_label: String,
    /// Whether staff may still cancel once the kitchen has started.
    pub allow_cancel_while_preparing: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            upsize_surcharge: DEFAULT_UPSIZE_SURCHARGE,
            walk_in_label: WALK_IN_LABEL.to_string(),
            allow_cancel_while_preparing: true,
        }
    }
}

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Customer {
    Table(String),
    WalkIn,
}

impl Customer {
    pub fn table(label: impl Into<String>) -> Self {
        Self::Table(label.into())
    }

    fn customer_type(&self) -> CustomerType {
        match self {
            Self::Table(_) => CustomerType::Table,
            Self::WalkIn => CustomerType::WalkIn,
        }
    }
}

/// Amount entered for a ticked payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tender {
    /// Nothing typed; the method covers the whole order total.
    Full,
    Amount(u64),
}

impl Tender {
    fn resolve(self, total: u64) -> u64 {
        match self {
            Self::Full => total,
            Self::Amount(amount) => amount,
        }
    }
}

/// Payment methods ticked at the counter and what was entered for each.
/// `None` means the method is not selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaymentSelection {
    pub cash: Option<Tender>,
    pub transfer: Option<Tender>,
}

impl PaymentSelection {
    pub fn cash(amount: u64) -> Self {
        Self {
            cash: Some(Tender::Amount(amount)),
            transfer: None,
        }
    }

    pub fn transfer(amount: u64) -> Self {
        Self {
            cash: None,
            transfer: Some(Tender::Amount(amount)),
        }
    }

    /// A single method that takes the full order total.
    pub fn full(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self {
                cash: Some(Tender::Full),
                transfer: None,
            },
            PaymentMethod::Transfer => Self {
                cash: None,
                transfer: Some(Tender::Full),
            },
        }
    }

    /// Both methods with amounts taken exactly as given.
    pub fn split(cash: u64, transfer: u64) -> Self {
        Self {
            cash: Some(Tender::Amount(cash)),
            transfer: Some(Tender::Amount(transfer)),
        }
    }

    /// Resolves the selection against the computed total and checks it balances.
    pub fn reconcile(&self, total: u64) -> Result<SourcePayment, OrderError> {
        let payment = SourcePayment {
            cash: self.cash.map(|tender| tender.resolve(total)),
            transfer: self.transfer.map(|tender| tender.resolve(total)),
        };

        let has_positive = payment.cash.is_some_and(|a| a > 0) || payment.transfer.is_some_and(|a| a > 0);
        if !has_positive {
            return Err(OrderError::NoPaymentMethodSelected);
        }

        // An overflowing sum can never equal a representable total.
        match payment.total() {
            Some(given) if given == total => {}
            given => {
                return Err(OrderError::PaymentAmountMismatch {
                    given: given.unwrap_or(u64::MAX),
                    expected: total,
                });
            }
        }
        Ok(payment)
    }
}

/// Everything about an order that does not come from the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderContext {
    pub customer: Customer,
    pub payment: PaymentSelection,
}

/// Edges of the status machine and the role allowed to take each.
pub fn permitted_role(from: OrderStatus, to: OrderStatus, policy: &LifecyclePolicy) -> Option<Role> {
    match (from, to) {
        (OrderStatus::Pending, OrderStatus::Preparing) => Some(Role::Kitchen),
        (OrderStatus::Pending, OrderStatus::Cancelled) => Some(Role::Staff),
        (OrderStatus::Preparing, OrderStatus::Completed) => Some(Role::Kitchen),
        (OrderStatus::Preparing, OrderStatus::Cancelled) if policy.allow_cancel_while_preparing => {
            Some(Role::Staff)
        }
        _ => None,
    }
}

/// The order lifecycle engine.
#[derive(Clone)]
pub struct OrderLifecycle {
    policy: LifecyclePolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for OrderLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLifecycle")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl OrderLifecycle {
    pub fn new(policy: LifecyclePolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Validates a cart and produces the order creation payload.
    ///
    /// Checks run in a fixed order and stop at the first failure: empty cart,
    /// table label, payment method, payment amount.
    #[instrument(skip(self, cart, context), fields(lines = cart.len()))]
    pub fn build_order(&self, cart: &Cart, context: &OrderContext) -> Result<OrderCreate, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let table_label = match &context.customer {
            Customer::Table(label) if label.trim().is_empty() => {
                return Err(OrderError::MissingTableLabel);
            }
            Customer::Table(label) => label.clone(),
            Customer::WalkIn => self.policy.walk_in_label.clone(),
        };

        let Some(total_price) = cart.total(self.policy.upsize_surcharge) else {
            warn!("Cart total overflows");
            return Err(OrderError::AmountOverflow);
        };
        let source_payment = context.payment.reconcile(total_price).inspect_err(|e| {
            warn!(error = %e, total_price, "Payment does not reconcile");
        })?;

        let customer_type = context.customer.customer_type();
        let items = cart
            .lines()
            .iter()
            .map(|line| snapshot_line(line, customer_type))
            .collect();

        debug!(total_price, "Order payload built");
        Ok(OrderCreate {
            table_label,
            items,
            total_price,
            source_payment,
            is_cancelled: false,
            status: OrderStatus::Pending,
            timeline: vec![TimelineEntry {
                status: OrderStatus::Pending,
                timestamp: self.clock.now(),
                description: OrderStatus::Pending.description().to_string(),
                actor: Role::Staff,
            }],
        })
    }

    /// Moves an order to `to`, appending exactly one timeline entry.
    ///
    /// On error the order is left untouched.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status))]
    pub fn transition(&self, order: &mut Order, to: OrderStatus, actor: Role) -> Result<(), OrderError> {
        let from = order.status;
        let Some(role) = permitted_role(from, to, &self.policy) else {
            warn!("Rejected status transition");
            return Err(OrderError::InvalidStatusTransition { from, to });
        };
        if role != actor {
            warn!(%actor, "Actor not permitted for transition");
            return Err(OrderError::ActorNotPermitted { actor, from, to });
        }

        order.timeline.push(TimelineEntry {
            status: to,
            timestamp: self.next_timestamp(order),
            description: to.description().to_string(),
            actor,
        });
        order.status = to;
        if to == OrderStatus::Cancelled {
            order.is_cancelled = true;
        }
        debug!(%to, "Order status changed");
        Ok(())
    }

    /// Never earlier than the last entry, so the timeline stays ordered under clock skew.
    fn next_timestamp(&self, order: &Order) -> DateTime<Utc> {
        let now = self.clock.now();
        match order.last_entry() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

fn snapshot_line(line: &CartLine, customer_type: CustomerType) -> OrderItem {
    OrderItem {
        product_id: line.product.id.clone(),
        product_name: line.product.name.clone(),
        quantity: line.quantity,
        unit_price: line.product.price,
        is_upsize: line.is_upsize,
        sugar_level: line.sugar_level,
        ice_level: line.ice_level,
        note: line.note.clone(),
        toppings: line
            .toppings
            .iter()
            .map(|t| OrderTopping {
                id: t.topping.id,
                name: t.topping.name.clone(),
                quantity: t.quantity,
                price: t.topping.price,
            })
            .collect(),
        customer_type,
    }
}
