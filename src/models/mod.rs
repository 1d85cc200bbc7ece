// Domain models live in the `oauth2-core` crate.
pub use oauth2_core::*;
