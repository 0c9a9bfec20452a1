use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use super::SystemError;
use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::actors::AssetService;
use crate::clients::{AssetClient, CategoryClient, OrderClient, ProductClient};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::domain::{Category, Order, Product};
use crate::order_actor::OrderLifecycle;

/// The main application system that orchestrates all actors.
///
/// Owns the store actors and hands out clients for them. Pass it (or clones of
/// its clients) to whatever needs backend access instead of reaching for
/// globals.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    pub category_client: CategoryClient,
    pub asset_client: AssetClient,
    config: Config,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Starts every actor. Must be called inside a tokio runtime.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let mut handles = Vec::new();

        // 1. Asset bucket
        let (asset_service, asset_client) = AssetService::new(config.store_buffer_size, config.asset_bucket());
        handles.push(tokio::spawn(asset_service.with_clock(clock.clone()).run()));

        // 2. Catalog tables
        let category_inner = spawn_table::<Category>(&config, &clock, &mut handles);
        let category_client = CategoryClient::new(category_inner);

        let product_inner = spawn_table::<Product>(&config, &clock, &mut handles);
        let product_client = ProductClient::new(product_inner, asset_client.clone());

        // 3. Orders
        let order_inner = spawn_table::<Order>(&config, &clock, &mut handles);
        let lifecycle = OrderLifecycle::new(config.policy(), clock);
        let order_client = OrderClient::new(order_inner, lifecycle);

        info!(actors = handles.len(), "Order system started");
        Self {
            order_client,
            product_client,
            category_client,
            asset_client,
            config,
            handles,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stops the asset service, closes every store channel and waits for the actors.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        if let Err(e) = self.asset_client.shutdown().await {
            // Already stopped; nothing left to signal.
            info!(error = %e, "Asset service was not running");
        }

        // Store actors stop once every client clone is gone.
        drop(self.order_client);
        drop(self.product_client);
        drop(self.category_client);
        drop(self.asset_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

fn spawn_table<T>(
    config: &Config,
    clock: &Arc<dyn Clock>,
    handles: &mut Vec<tokio::task::JoinHandle<()>>,
) -> ResourceClient<T>
where
    T: Entity<Id = String>,
{
    let (actor, client) = ResourceActor::<T>::new(config.store_buffer_size, || Uuid::new_v4().to_string());
    let actor = actor
        .with_clock(clock.clone())
        .with_feed_buffer(config.feed_buffer_size);
    handles.push(tokio::spawn(actor.run()));
    client
}
