use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::resource::{ApiResource, IdentityResource, Scope};
use super::scope::{format_scope, OFFLINE_ACCESS};

/// The identity and API resources selected for a single request.
///
/// Built fresh per query; API resources carry only the scopes relevant to
/// that query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub identity_resources: Vec<IdentityResource>,
    pub api_resources: Vec<ApiResource>,
    #[serde(default)]
    pub offline_access: bool,
}

impl Resources {
    pub fn new(identity_resources: Vec<IdentityResource>, api_resources: Vec<ApiResource>) -> Self {
        Self {
            identity_resources,
            api_resources,
            offline_access: false,
        }
    }

    #[must_use]
    pub fn with_offline_access(mut self, offline_access: bool) -> Self {
        self.offline_access = offline_access;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.identity_resources.is_empty() && self.api_resources.is_empty() && !self.offline_access
    }

    /// Every scope name represented by this value, `offline_access` included
    /// when flagged.
    pub fn to_scope_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .identity_resources
            .iter()
            .map(|r| r.name.clone())
            .chain(
                self.api_resources
                    .iter()
                    .flat_map(|api| api.scope_names().map(str::to_string)),
            )
            .collect();

        if self.offline_access {
            names.insert(OFFLINE_ACCESS.to_string());
        }

        names
    }

    /// The space-delimited `scope` value granted by these resources.
    pub fn granted_scope(&self) -> String {
        format_scope(self.to_scope_names())
    }

    pub fn find_identity_resource(&self, name: &str) -> Option<&IdentityResource> {
        self.identity_resources.iter().find(|r| r.name == name)
    }

    pub fn find_api_scope(&self, name: &str) -> Option<&Scope> {
        self.api_resources
            .iter()
            .find_map(|api| api.find_scope(name))
    }

    pub fn find_api_resources_by_scope<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ApiResource> + 'a {
        self.api_resources
            .iter()
            .filter(move |api| api.find_scope(name).is_some())
    }

    /// Drop disabled identity and API resources.
    #[must_use]
    pub fn filter_enabled(self) -> Self {
        Self {
            identity_resources: self
                .identity_resources
                .into_iter()
                .filter(|r| r.enabled)
                .collect(),
            api_resources: self
                .api_resources
                .into_iter()
                .filter(|api| api.enabled)
                .collect(),
            offline_access: self.offline_access,
        }
    }

    /// Drop API resources left without any scope.
    #[must_use]
    pub fn without_empty_api_resources(mut self) -> Self {
        self.api_resources.retain(|api| !api.scopes.is_empty());
        self
    }
}
