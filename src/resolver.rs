pub use oauth2_resolver::ScopeResolver;

use crate::storage::DynResourceStore;

/// Resolver over whichever backend the configuration selected.
pub type DynScopeResolver = ScopeResolver<DynResourceStore>;
