//! Scope resolution against a [`ResourceStore`].
//!
//! The resolver turns requested scope names into a [`Resources`] value,
//! checking the catalog for naming conflicts on the way. It holds no state
//! besides the store and never writes to it.

use std::collections::{BTreeSet, HashSet};

use oauth2_core::{
    validate_resources, ApiResource, IdentityResource, ResolveError, Resources, OFFLINE_ACCESS,
};
use oauth2_ports::ResourceStore;

pub struct ScopeResolver<S> {
    store: S,
}

impl<S: ResourceStore> ScopeResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resources matching `scope_names`, with every API resource narrowed to
    /// the requested scopes.
    ///
    /// The identity and API results are validated together before anything
    /// is returned.
    pub async fn find_resources_by_scope<I, T>(
        &self,
        scope_names: I,
    ) -> Result<Resources, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let names = distinct_names(scope_names);

        let (identity_resources, api_resources) = futures::try_join!(
            self.store.find_identity_resources_by_scope_name(&names),
            self.store.find_api_resources_by_scope_name(&names),
        )?;

        validate(&identity_resources, &api_resources)?;

        let requested: HashSet<&str> = names.iter().map(String::as_str).collect();
        let api_resources = api_resources
            .iter()
            .map(|api| {
                api.clone_with_scopes(
                    api.scopes
                        .iter()
                        .filter(|s| requested.contains(s.name.as_str()))
                        .cloned(),
                )
            })
            .collect();

        let resources = Resources {
            identity_resources,
            api_resources,
            offline_access: requested.contains(OFFLINE_ACCESS),
        };

        tracing::debug!(
            requested = names.len(),
            identity_resources = resources.identity_resources.len(),
            api_resources = resources.api_resources.len(),
            offline_access = resources.offline_access,
            "resolved resources by scope"
        );

        Ok(resources)
    }

    /// Like [`Self::find_resources_by_scope`], without disabled entries or API
    /// resources that end up with no scopes.
    pub async fn find_enabled_resources_by_scope<I, T>(
        &self,
        scope_names: I,
    ) -> Result<Resources, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Ok(self
            .find_resources_by_scope(scope_names)
            .await?
            .filter_enabled()
            .without_empty_api_resources())
    }

    /// The whole enabled catalog, scopeless API resources included. The full
    /// catalog is validated first.
    pub async fn get_all_enabled_resources(&self) -> Result<Resources, ResolveError> {
        let (identity_resources, api_resources) = self.load_catalog().await?;
        Ok(Resources::new(identity_resources, api_resources).filter_enabled())
    }

    /// Enabled identity resources matching `scope_names`.
    ///
    /// Unlike the other finders this does not validate the catalog.
    pub async fn find_enabled_identity_resources_by_scope<I, T>(
        &self,
        scope_names: I,
    ) -> Result<Vec<IdentityResource>, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let names = distinct_names(scope_names);
        let found = self
            .store
            .find_identity_resources_by_scope_name(&names)
            .await?;

        Ok(found.into_iter().filter(|r| r.enabled).collect())
    }

    /// Validate the complete catalog once, e.g. at startup.
    pub async fn validate_catalog(&self) -> Result<(), ResolveError> {
        let (identity_resources, api_resources) = self.load_catalog().await?;
        tracing::info!(
            identity_resources = identity_resources.len(),
            api_resources = api_resources.len(),
            "resource catalog is consistent"
        );
        Ok(())
    }

    async fn load_catalog(
        &self,
    ) -> Result<(Vec<IdentityResource>, Vec<ApiResource>), ResolveError> {
        let (identity_resources, api_resources) = futures::try_join!(
            self.store.get_all_identity_resources(),
            self.store.get_all_api_resources(),
        )?;

        validate(&identity_resources, &api_resources)?;
        Ok((identity_resources, api_resources))
    }
}

fn distinct_names<I, T>(scope_names: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    scope_names
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn validate(
    identity_resources: &[IdentityResource],
    api_resources: &[ApiResource],
) -> Result<(), ResolveError> {
    validate_resources(identity_resources, api_resources).map_err(|err| {
        tracing::warn!(
            kind = err.kind(),
            names = %err.names().join(","),
            "resource catalog validation failed"
        );
        ResolveError::from(err)
    })
}
