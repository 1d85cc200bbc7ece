use serde::{Deserialize, Serialize};

use super::scope::OPENID;

fn default_true() -> bool {
    true
}

/// A named group of user-identity claims that can be released under a scope
/// of the same name (e.g. `openid`, `profile`, `email`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResource {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub emphasize: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,
    #[serde(default)]
    pub user_claims: Vec<String>,
}

impl IdentityResource {
    pub fn new<I, C>(name: impl Into<String>, user_claims: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            required: false,
            emphasize: false,
            enabled: true,
            show_in_discovery_document: true,
            user_claims: user_claims.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn emphasized(mut self, emphasize: bool) -> Self {
        self.emphasize = emphasize;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn shown_in_discovery(mut self, show: bool) -> Self {
        self.show_in_discovery_document = show;
        self
    }

    /// The `openid` scope. Always required: without it the request is not an
    /// OpenID Connect request.
    pub fn openid() -> Self {
        Self::new(OPENID, ["sub"])
            .with_display_name("Your user identifier")
            .required(true)
    }

    pub fn profile() -> Self {
        Self::new(
            "profile",
            [
                "name",
                "family_name",
                "given_name",
                "middle_name",
                "nickname",
                "preferred_username",
                "profile",
                "picture",
                "website",
                "gender",
                "birthdate",
                "zoneinfo",
                "locale",
                "updated_at",
            ],
        )
        .with_display_name("User profile")
        .with_description("Your user profile information (first name, last name, etc.)")
        .emphasized(true)
    }

    pub fn email() -> Self {
        Self::new("email", ["email", "email_verified"])
            .with_display_name("Your email address")
            .emphasized(true)
    }

    pub fn phone() -> Self {
        Self::new("phone", ["phone_number", "phone_number_verified"])
            .with_display_name("Your phone number")
            .emphasized(true)
    }

    pub fn address() -> Self {
        Self::new("address", ["address"])
            .with_display_name("Your postal address")
            .emphasized(true)
    }

    /// The five standard OpenID Connect identity resources.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::openid(),
            Self::profile(),
            Self::email(),
            Self::phone(),
            Self::address(),
        ]
    }
}

/// A requestable scope exposed by an [`ApiResource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub emphasize: bool,
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,
    #[serde(default)]
    pub user_claims: Vec<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            required: false,
            emphasize: false,
            show_in_discovery_document: true,
            user_claims: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_user_claims<I, C>(mut self, user_claims: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.user_claims = user_claims.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn emphasized(mut self, emphasize: bool) -> Self {
        self.emphasize = emphasize;
        self
    }

    #[must_use]
    pub fn shown_in_discovery(mut self, show: bool) -> Self {
        self.show_in_discovery_document = show;
        self
    }
}

/// A protected API surface and the scopes a client may request for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub user_claims: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

impl ApiResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            enabled: true,
            user_claims: Vec::new(),
            scopes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_user_claims<I, C>(mut self, user_claims: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.user_claims = user_claims.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Copy of this resource exposing exactly `scopes`.
    ///
    /// The returned value owns its own scope list; the source is untouched.
    pub fn clone_with_scopes<I>(&self, scopes: I) -> Self
    where
        I: IntoIterator<Item = Scope>,
    {
        Self {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            enabled: self.enabled,
            user_claims: self.user_claims.clone(),
            scopes: scopes.into_iter().collect(),
        }
    }

    pub fn find_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.name == name)
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_with_scopes_leaves_source_untouched() {
        let api = ApiResource::new("orders")
            .with_display_name("Orders API")
            .with_scope(Scope::new("orders.read"))
            .with_scope(Scope::new("orders.write"));

        let narrowed = api.clone_with_scopes(api.scopes.iter().skip(1).cloned());

        assert_eq!(api.scopes.len(), 2);
        assert_eq!(narrowed.scopes, vec![Scope::new("orders.write")]);
        assert_eq!(narrowed.display_name.as_deref(), Some("Orders API"));
    }

    #[test]
    fn standard_identity_resources_require_only_openid() {
        let standard = IdentityResource::standard();
        let required: Vec<&str> = standard
            .iter()
            .filter(|r| r.required)
            .map(|r| r.name.as_str())
            .collect();

        assert_eq!(standard.len(), 5);
        assert_eq!(required, vec![OPENID]);
        assert!(IdentityResource::email()
            .user_claims
            .contains(&"email_verified".to_string()));
    }

    #[test]
    fn deserialize_applies_defaults() {
        let api: ApiResource = serde_json::from_str(
            r#"{ "name": "invoices", "scopes": [{ "name": "invoices.read", "required": true }] }"#,
        )
        .unwrap();

        assert!(api.enabled);
        assert!(api.scopes[0].required);
        assert!(api.scopes[0].show_in_discovery_document);
        assert!(api.find_scope("invoices.read").is_some());
    }
}
