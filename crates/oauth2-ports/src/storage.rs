use async_trait::async_trait;
use std::sync::Arc;

use oauth2_core::{ApiResource, IdentityResource, OAuth2Error};

/// Trait implemented by all resource catalog backends.
///
/// Finders always return fully populated entities and an empty `Vec` when
/// nothing matches.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Initialize the backing store (e.g., bootstrap schema / create indexes).
    async fn init(&self) -> Result<(), OAuth2Error>;

    // Catalog writes. A second resource with the same name in the same
    // category is rejected; API scope names are not constrained here.
    async fn save_identity_resource(&self, resource: &IdentityResource)
        -> Result<(), OAuth2Error>;
    async fn save_api_resource(&self, resource: &ApiResource) -> Result<(), OAuth2Error>;

    /// Identity resources whose name is one of `scope_names`.
    async fn find_identity_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<IdentityResource>, OAuth2Error>;

    /// API resources exposing at least one scope named in `scope_names`,
    /// returned with their complete scope list.
    async fn find_api_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<ApiResource>, OAuth2Error>;

    async fn get_all_identity_resources(&self) -> Result<Vec<IdentityResource>, OAuth2Error>;
    async fn get_all_api_resources(&self) -> Result<Vec<ApiResource>, OAuth2Error>;

    /// Lightweight liveness/readiness check.
    ///
    /// Implementations may override to do something cheaper than `init()`.
    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        self.init().await
    }
}

pub type DynResourceStore = Arc<dyn ResourceStore>;

#[async_trait]
impl<T: ResourceStore + ?Sized> ResourceStore for Arc<T> {
    async fn init(&self) -> Result<(), OAuth2Error> {
        (**self).init().await
    }

    async fn save_identity_resource(
        &self,
        resource: &IdentityResource,
    ) -> Result<(), OAuth2Error> {
        (**self).save_identity_resource(resource).await
    }

    async fn save_api_resource(&self, resource: &ApiResource) -> Result<(), OAuth2Error> {
        (**self).save_api_resource(resource).await
    }

    async fn find_identity_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<IdentityResource>, OAuth2Error> {
        (**self)
            .find_identity_resources_by_scope_name(scope_names)
            .await
    }

    async fn find_api_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<ApiResource>, OAuth2Error> {
        (**self).find_api_resources_by_scope_name(scope_names).await
    }

    async fn get_all_identity_resources(&self) -> Result<Vec<IdentityResource>, OAuth2Error> {
        (**self).get_all_identity_resources().await
    }

    async fn get_all_api_resources(&self) -> Result<Vec<ApiResource>, OAuth2Error> {
        (**self).get_all_api_resources().await
    }

    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        (**self).healthcheck().await
    }
}
