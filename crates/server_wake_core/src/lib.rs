//! Shared domain primitives for the on-demand server wake trigger.
//!
//! This crate owns the service identity configuration, the typed shape of an
//! incoming invocation event, and the response contracts. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod config;
pub mod contract;
pub mod event;
