//! Shared environment-sync domain primitives.
//!
//! This crate owns request/response contracts, batch validation, and summary
//! composition. It intentionally excludes HTTP and Lambda runtime concerns.

pub mod contract;
pub mod summary;
