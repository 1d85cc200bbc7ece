use std::collections::HashMap;

use oauth2_core::{ApiResource, IdentityResource, OAuth2Error, Scope};

pub(crate) const IDENTITY_COLUMNS: &str = "name, display_name, description, required, emphasize, \
     enabled, show_in_discovery_document, user_claims";

pub(crate) const API_RESOURCE_COLUMNS: &str =
    "name, display_name, description, enabled, user_claims";

pub(crate) const API_SCOPE_COLUMNS: &str = "api_resource_name, name, display_name, description, \
     required, emphasize, show_in_discovery_document, user_claims";

// Claim lists are stored as JSON arrays in TEXT columns.

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct IdentityResourceRow {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub emphasize: bool,
    pub enabled: bool,
    pub show_in_discovery_document: bool,
    pub user_claims: String,
}

impl TryFrom<IdentityResourceRow> for IdentityResource {
    type Error = OAuth2Error;

    fn try_from(row: IdentityResourceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            required: row.required,
            emphasize: row.emphasize,
            enabled: row.enabled,
            show_in_discovery_document: row.show_in_discovery_document,
            user_claims: serde_json::from_str(&row.user_claims)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ApiResourceRow {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub user_claims: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ApiScopeRow {
    pub api_resource_name: String,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub emphasize: bool,
    pub show_in_discovery_document: bool,
    pub user_claims: String,
}

impl TryFrom<ApiScopeRow> for Scope {
    type Error = OAuth2Error;

    fn try_from(row: ApiScopeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            required: row.required,
            emphasize: row.emphasize,
            show_in_discovery_document: row.show_in_discovery_document,
            user_claims: serde_json::from_str(&row.user_claims)?,
        })
    }
}

pub(crate) fn claims_json(claims: &[String]) -> Result<String, OAuth2Error> {
    Ok(serde_json::to_string(claims)?)
}

pub(crate) fn identity_resources(
    rows: Vec<IdentityResourceRow>,
) -> Result<Vec<IdentityResource>, OAuth2Error> {
    rows.into_iter().map(IdentityResource::try_from).collect()
}

/// Join resource rows with their scope rows. Scope rows must already be in
/// `position` order.
pub(crate) fn api_resources(
    resources: Vec<ApiResourceRow>,
    scopes: Vec<ApiScopeRow>,
) -> Result<Vec<ApiResource>, OAuth2Error> {
    let mut by_resource: HashMap<String, Vec<Scope>> = HashMap::new();
    for row in scopes {
        let owner = row.api_resource_name.clone();
        by_resource.entry(owner).or_default().push(row.try_into()?);
    }

    resources
        .into_iter()
        .map(|row| -> Result<ApiResource, OAuth2Error> {
            Ok(ApiResource {
                scopes: by_resource.remove(&row.name).unwrap_or_default(),
                user_claims: serde_json::from_str(&row.user_claims)?,
                name: row.name,
                display_name: row.display_name,
                description: row.description,
                enabled: row.enabled,
            })
        })
        .collect()
}
