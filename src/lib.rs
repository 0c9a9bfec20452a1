//! Point-of-sale core for a tea and coffee shop: catalog, carts, the order
//! lifecycle and dashboard analytics over an actor-backed record store.

pub mod actor_framework;
pub mod actors;
pub mod app_system;
pub mod category_actor;
pub mod clients;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod live_view;
pub mod messages;
pub mod order_actor;
pub mod product_actor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;
