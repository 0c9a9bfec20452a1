//! Order records: store-side hooks plus the lifecycle engine that builds and
//! advances them.

pub mod entity;
pub mod error;
pub mod lifecycle;

pub use error::*;
pub use lifecycle::*;
