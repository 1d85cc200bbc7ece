//! Pure helpers that narrow an already-resolved [`Resources`] value.

use std::collections::BTreeSet;

use crate::models::{Resources, OFFLINE_ACCESS};

/// Names of every required identity resource and required API scope.
pub fn required_scope_names(resources: &Resources) -> BTreeSet<String> {
    let identity = resources
        .identity_resources
        .iter()
        .filter(|r| r.required)
        .map(|r| r.name.clone());

    let api = resources
        .api_resources
        .iter()
        .flat_map(|api| api.scopes.iter())
        .filter(|s| s.required)
        .map(|s| s.name.clone());

    identity.chain(api).collect()
}

/// Narrow `resources` to what a caller consented to.
///
/// Required entries always survive. `offline_access` is taken out of the
/// scope set and becomes the output flag. API resources left without any
/// scope are dropped. `None` behaves like an empty set.
pub fn filter(resources: &Resources, scopes: Option<&BTreeSet<String>>) -> Resources {
    let empty = BTreeSet::new();
    let scopes = scopes.unwrap_or(&empty);

    let offline_access = scopes.contains(OFFLINE_ACCESS);
    let requested = |name: &str| name != OFFLINE_ACCESS && scopes.contains(name);

    let identity_resources = resources
        .identity_resources
        .iter()
        .filter(|r| r.required || requested(&r.name))
        .cloned()
        .collect();

    let api_resources = resources
        .api_resources
        .iter()
        .filter_map(|api| {
            let kept: Vec<_> = api
                .scopes
                .iter()
                .filter(|s| s.required || requested(&s.name))
                .cloned()
                .collect();
            (!kept.is_empty()).then(|| api.clone_with_scopes(kept))
        })
        .collect();

    Resources {
        identity_resources,
        api_resources,
        offline_access,
    }
}
