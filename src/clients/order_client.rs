use tracing::{error, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Cart, Order, OrderPatch, OrderStatus, Role};
use crate::order_actor::{OrderContext, OrderError, OrderLifecycle};

/// Client for the order table.
///
/// Validation and status rules run locally through [`OrderLifecycle`]; the store
/// only ever sees finished payloads and patches.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    lifecycle: OrderLifecycle,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, lifecycle: OrderLifecycle) -> Self {
        Self { inner, lifecycle }
    }

    pub fn lifecycle(&self) -> &OrderLifecycle {
        &self.lifecycle
    }

    /// Validates the cart, then persists the resulting order.
    ///
    /// The cart is only borrowed so the caller still has it when validation fails.
    #[instrument(skip(self, cart, context), fields(lines = cart.len()))]
    pub async fn submit_order(&self, cart: &Cart, context: &OrderContext) -> Result<Order, OrderError> {
        info!("Processing submit_order request");
        let payload = self.lifecycle.build_order(cart, context)?;
        let order = self.inner.create(payload).await.map_err(|e| {
            error!(error = %e, "Order insert failed");
            OrderError::from_store(e)
        })?;
        info!(order_id = %order.id, total_price = order.total_price, "Order created");
        Ok(order)
    }

    /// All orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.inner.list().await.map_err(OrderError::from_store)?;
        // Reverse insertion order first: the sort is stable, so orders sharing a
        // timestamp stay newest-inserted first.
        orders.reverse();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Reads the current order, applies the transition and writes the result back.
    ///
    /// Last write wins if two clients race on the same order.
    #[instrument(skip(self))]
    pub async fn transition_order(&self, id: String, to: OrderStatus, actor: Role) -> Result<Order, OrderError> {
        let Some(mut order) = self.get_order(id.clone()).await? else {
            error!("Order not found");
            return Err(OrderError::NotFound(id));
        };
        self.lifecycle.transition(&mut order, to, actor)?;
        let updated = self
            .inner
            .update(id, OrderPatch::from(&order))
            .await
            .map_err(OrderError::from_store)?;
        info!(status = %updated.status, "Order status updated");
        Ok(updated)
    }

    pub async fn start_preparing(&self, id: String) -> Result<Order, OrderError> {
        self.transition_order(id, OrderStatus::Preparing, Role::Kitchen).await
    }

    pub async fn complete_order(&self, id: String) -> Result<Order, OrderError> {
        self.transition_order(id, OrderStatus::Completed, Role::Kitchen).await
    }

    pub async fn cancel_order(&self, id: String) -> Result<Order, OrderError> {
        self.transition_order(id, OrderStatus::Cancelled, Role::Staff).await
    }
}
