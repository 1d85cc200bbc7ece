//! Consistency checks over the static resource catalog.

use std::collections::HashSet;

use crate::models::{ApiResource, CatalogError, IdentityResource, ScopeCategory};

/// Check a set of identity and API resources for scope-name conflicts.
///
/// Identity resource names must be unique among themselves, API scope names
/// must be unique across every API resource, and no name may appear in both
/// categories. Duplicates are reported per category (identity first); each
/// offending name appears once, in order of first repetition.
pub fn validate_resources(
    identity_resources: &[IdentityResource],
    api_resources: &[ApiResource],
) -> Result<(), CatalogError> {
    let identity_names: Vec<&str> = identity_resources.iter().map(|r| r.name.as_str()).collect();
    let api_scope_names: Vec<&str> = api_resources
        .iter()
        .flat_map(|api| api.scope_names())
        .collect();

    let dups = duplicates(&identity_names);
    if !dups.is_empty() {
        return Err(CatalogError::DuplicateScopeNames {
            category: ScopeCategory::Identity,
            names: dups,
        });
    }

    let dups = duplicates(&api_scope_names);
    if !dups.is_empty() {
        return Err(CatalogError::DuplicateScopeNames {
            category: ScopeCategory::Api,
            names: dups,
        });
    }

    let api_set: HashSet<&str> = api_scope_names.into_iter().collect();
    let overlap: Vec<String> = identity_names
        .into_iter()
        .filter(|name| api_set.contains(name))
        .map(str::to_string)
        .collect();
    if !overlap.is_empty() {
        return Err(CatalogError::OverlappingScopeNamespace { names: overlap });
    }

    Ok(())
}

fn duplicates(names: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();

    for name in names {
        if !seen.insert(*name) && reported.insert(*name) {
            out.push((*name).to_string());
        }
    }

    out
}
