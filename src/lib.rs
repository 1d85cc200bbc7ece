//! Library exports.
//!
//! The domain, ports and adapters live in the crates under `crates/`; this
//! crate re-exports them under stable module paths and wires them together
//! for the `oauth2-resources` binary and the integration tests.

pub mod app;
pub mod config;
pub mod models;
pub mod resolver;
pub mod storage;
pub mod telemetry;
