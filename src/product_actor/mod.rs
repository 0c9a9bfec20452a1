//! Product records and their validation at the store boundary.

pub mod entity;
pub mod error;

pub use error::*;
