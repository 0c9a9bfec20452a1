//! Hand-written services that do not fit the generic resource actor.

pub mod asset_service;

pub use asset_service::*;
