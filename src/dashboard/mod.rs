//! Read-side helpers for the admin screens: order filters and dashboard folds.
//!
//! Everything here is a pure function over already-fetched records. Calendar
//! bucketing happens in the shop's local offset, passed in explicitly.

pub mod filters;
pub mod stats;

pub use filters::*;
pub use stats::*;
