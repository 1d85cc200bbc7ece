//! Framework-agnostic OAuth2/OIDC resource catalog types and helpers.
//!
//! This crate holds the identity/API resource model, the catalog validation
//! rules and the pure filtering helpers used when building tokens and
//! discovery documents. Store-backed resolution lives in `oauth2-resolver`.

pub mod discovery;
pub mod filtering;
pub mod models;
pub mod validation;

pub use discovery::DiscoveryMetadata;
pub use filtering::{filter, required_scope_names};
pub use models::*;
pub use validation::validate_resources;
