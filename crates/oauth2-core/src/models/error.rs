use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OAuth2Error {
    pub error: String,
    pub error_description: Option<String>,
    pub error_uri: Option<String>,
}

impl OAuth2Error {
    pub fn new(error: &str, description: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            error_description: description.map(|s| s.to_string()),
            error_uri: None,
        }
    }

    pub fn invalid_request(description: &str) -> Self {
        Self::new("invalid_request", Some(description))
    }

    pub fn server_error(description: &str) -> Self {
        Self::new("server_error", Some(description))
    }
}

impl fmt::Display for OAuth2Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {:?}", self.error, self.error_description)
    }
}

impl std::error::Error for OAuth2Error {}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for OAuth2Error {
    fn from(err: sqlx::Error) -> Self {
        // Provide a stable, non-leaky mapping for common constraint violations.
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code().unwrap_or_default();
            let msg = db_err.message();

            // Postgres unique violation: 23505
            // SQLite constraint error codes vary by extended code; also match by message.
            let is_unique = code == "23505"
                || code == "2067"
                || code == "1555"
                || msg.contains("UNIQUE constraint failed")
                || msg.contains("duplicate key");

            if is_unique {
                return Self::invalid_request("duplicate key");
            }
        }

        Self::server_error(&err.to_string())
    }
}

impl From<serde_json::Error> for OAuth2Error {
    fn from(err: serde_json::Error) -> Self {
        Self::server_error(&format!("malformed stored value: {err}"))
    }
}

/// Which half of the resource catalog a scope name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeCategory {
    Identity,
    Api,
}

impl fmt::Display for ScopeCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Api => f.write_str("API"),
        }
    }
}

/// Static misconfiguration of the resource catalog.
///
/// These are operator-facing: the message lists every offending name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error(
        "Duplicate {category} scopes found. This is an invalid configuration. \
         Use different names for {category} scopes. Scopes found: {}",
        .names.join(", ")
    )]
    DuplicateScopeNames {
        category: ScopeCategory,
        names: Vec<String>,
    },

    #[error(
        "Found identity scopes and API scopes that use the same names. \
         This is an invalid configuration. Use different names for identity scopes \
         and API scopes. Scopes found: {}",
        .names.join(", ")
    )]
    OverlappingScopeNamespace { names: Vec<String> },
}

impl CatalogError {
    pub fn names(&self) -> &[String] {
        match self {
            Self::DuplicateScopeNames { names, .. } | Self::OverlappingScopeNamespace { names } => {
                names
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateScopeNames { .. } => "duplicate_scope_names",
            Self::OverlappingScopeNamespace { .. } => "overlapping_scope_namespace",
        }
    }
}

/// Failure of a store-backed resource resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("resource store failure: {0}")]
    Store(#[from] OAuth2Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<ResolveError> for OAuth2Error {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Store(inner) => inner,
            // Catalog problems are the operator's to fix, never the client's.
            ResolveError::Catalog(inner) => Self::server_error(&inner.to_string()),
        }
    }
}
