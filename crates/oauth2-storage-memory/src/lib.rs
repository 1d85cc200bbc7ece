//! In-memory resource catalog.
//!
//! Suited to catalogs declared in configuration and to tests. Resources are
//! kept in insertion order.

use async_trait::async_trait;
use tokio::sync::RwLock;

use oauth2_core::{ApiResource, IdentityResource, OAuth2Error};
use oauth2_ports::ResourceStore;

#[derive(Default)]
pub struct InMemoryResourceStore {
    identity_resources: RwLock<Vec<IdentityResource>>,
    api_resources: RwLock<Vec<ApiResource>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a catalog exactly as given, conflicts included.
    pub fn with_catalog(
        identity_resources: Vec<IdentityResource>,
        api_resources: Vec<ApiResource>,
    ) -> Self {
        Self {
            identity_resources: RwLock::new(identity_resources),
            api_resources: RwLock::new(api_resources),
        }
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn init(&self) -> Result<(), OAuth2Error> {
        Ok(())
    }

    async fn save_identity_resource(
        &self,
        resource: &IdentityResource,
    ) -> Result<(), OAuth2Error> {
        let mut identity_resources = self.identity_resources.write().await;
        if identity_resources.iter().any(|r| r.name == resource.name) {
            return Err(OAuth2Error::invalid_request("duplicate key"));
        }
        identity_resources.push(resource.clone());
        Ok(())
    }

    async fn save_api_resource(&self, resource: &ApiResource) -> Result<(), OAuth2Error> {
        let mut api_resources = self.api_resources.write().await;
        if api_resources.iter().any(|r| r.name == resource.name) {
            return Err(OAuth2Error::invalid_request("duplicate key"));
        }
        api_resources.push(resource.clone());
        Ok(())
    }

    async fn find_identity_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<IdentityResource>, OAuth2Error> {
        Ok(self
            .identity_resources
            .read()
            .await
            .iter()
            .filter(|r| scope_names.contains(&r.name))
            .cloned()
            .collect())
    }

    async fn find_api_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<ApiResource>, OAuth2Error> {
        Ok(self
            .api_resources
            .read()
            .await
            .iter()
            .filter(|api| api.scopes.iter().any(|s| scope_names.contains(&s.name)))
            .cloned()
            .collect())
    }

    async fn get_all_identity_resources(&self) -> Result<Vec<IdentityResource>, OAuth2Error> {
        Ok(self.identity_resources.read().await.clone())
    }

    async fn get_all_api_resources(&self) -> Result<Vec<ApiResource>, OAuth2Error> {
        Ok(self.api_resources.read().await.clone())
    }

    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2_core::Scope;

    #[tokio::test]
    async fn seeded_catalog_keeps_conflicting_entries() {
        let store = InMemoryResourceStore::with_catalog(
            vec![IdentityResource::email(), IdentityResource::email()],
            vec![],
        );

        let all = store.get_all_identity_resources().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn api_lookup_returns_every_scope_of_a_match() {
        let store = InMemoryResourceStore::new();
        store
            .save_api_resource(
                &ApiResource::new("orders")
                    .with_scope(Scope::new("orders.read"))
                    .with_scope(Scope::new("orders.write")),
            )
            .await
            .unwrap();

        let found = store
            .find_api_resources_by_scope_name(&["orders.write".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].scopes.len(), 2);
        assert!(store
            .find_api_resources_by_scope_name(&["orders".to_string()])
            .await
            .unwrap()
            .is_empty());
    }
}
