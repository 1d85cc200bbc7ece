use serde::{Deserialize, Serialize};

use crate::models::{Resources, OFFLINE_ACCESS};

/// The scope/claim portion of an OpenID Provider discovery document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryMetadata {
    pub scopes_supported: Vec<String>,
    pub claims_supported: Vec<String>,
}

impl DiscoveryMetadata {
    /// Build from the enabled catalog. Entries hidden from discovery are skipped.
    pub fn from_resources(resources: &Resources, include_offline_access: bool) -> Self {
        let visible_identity = resources
            .identity_resources
            .iter()
            .filter(|r| r.show_in_discovery_document);

        let mut scopes_supported: Vec<String> =
            visible_identity.clone().map(|r| r.name.clone()).collect();
        scopes_supported.extend(
            resources
                .api_resources
                .iter()
                .flat_map(|api| api.scopes.iter())
                .filter(|s| s.show_in_discovery_document)
                .map(|s| s.name.clone()),
        );
        if include_offline_access || resources.offline_access {
            scopes_supported.push(OFFLINE_ACCESS.to_string());
        }
        dedup_in_order(&mut scopes_supported);

        let mut claims_supported: Vec<String> = visible_identity
            .flat_map(|r| r.user_claims.iter().cloned())
            .collect();
        dedup_in_order(&mut claims_supported);

        Self {
            scopes_supported,
            claims_supported,
        }
    }
}

fn dedup_in_order(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiResource, IdentityResource, Scope};

    #[test]
    fn lists_visible_scopes_and_identity_claims() {
        let resources = Resources::new(
            vec![
                IdentityResource::openid(),
                IdentityResource::email(),
                IdentityResource::new("internal", ["employee_id"]).shown_in_discovery(false),
            ],
            vec![ApiResource::new("orders")
                .with_scope(Scope::new("orders.read"))
                .with_scope(Scope::new("orders.admin").shown_in_discovery(false))],
        );

        let metadata = DiscoveryMetadata::from_resources(&resources, true);

        assert_eq!(
            metadata.scopes_supported,
            vec!["openid", "email", "orders.read", "offline_access"]
        );
        assert_eq!(
            metadata.claims_supported,
            vec!["sub", "email", "email_verified"]
        );
    }

    #[test]
    fn offline_access_is_opt_in() {
        let metadata = DiscoveryMetadata::from_resources(&Resources::default(), false);
        assert!(metadata.scopes_supported.is_empty());
        assert!(metadata.claims_supported.is_empty());
    }
}
