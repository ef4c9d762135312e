//! AWS-oriented adapters and handlers for the on-demand server wake trigger.
//!
//! This crate owns runtime integration details (the Lambda handler, the ECS
//! port it drives, and log setup) on top of the contracts in
//! `server_wake_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
