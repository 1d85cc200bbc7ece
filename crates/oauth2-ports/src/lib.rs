//! Integration ports for the resource catalog.
//!
//! Implement these traits in your own crate to back scope resolution with custom
//! persistence without forking.

pub mod storage;

pub use storage::*;
