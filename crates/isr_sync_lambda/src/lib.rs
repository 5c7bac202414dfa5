//! HTTP-facing runtime for the environment sync and revalidation function.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! remote env-API adapter, and the revalidation dispatcher) on top of the
//! contracts defined in `isr_sync_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod reconcile;
