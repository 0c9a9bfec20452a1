#[macro_use]
mod macros;

pub mod asset_client;
pub mod category_client;
pub mod order_client;
pub mod product_client;

pub use asset_client::*;
pub use category_client::*;
pub use order_client::*;
pub use product_client::*;
