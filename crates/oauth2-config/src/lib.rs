use hocon::HoconLoader;
use oauth2_core::{ApiResource, IdentityResource};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "memory";
const DEFAULT_SERVICE_NAME: &str = "oauth2-resources";
const MASK: &str = "***MASKED***";

/// Overrides the database URL for every loader.
pub const DATABASE_URL_ENV: &str = "OAUTH2_DATABASE_URL";
/// Overrides the telemetry service name for every loader.
pub const SERVICE_NAME_ENV: &str = "OAUTH2_SERVICE_NAME";

fn env_override(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
        }
    }
}

/// Resources declared in configuration and seeded into the store at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub include_standard_identity_resources: bool,
    #[serde(default)]
    pub identity_resources: Vec<IdentityResource>,
    #[serde(default)]
    pub api_resources: Vec<ApiResource>,
    #[serde(default = "default_true")]
    pub validate_on_startup: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            include_standard_identity_resources: false,
            identity_resources: Vec::new(),
            api_resources: Vec::new(),
            validate_on_startup: true,
        }
    }
}

impl CatalogConfig {
    /// Configured identity resources, preceded by the standard OpenID Connect
    /// ones when enabled.
    pub fn identity_resources(&self) -> Vec<IdentityResource> {
        let mut resources = if self.include_standard_identity_resources {
            IdentityResource::standard()
        } else {
            Vec::new()
        };
        resources.extend(self.identity_resources.iter().cloned());
        resources
    }
}

fn default_true() -> bool {
    true
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        // Try to load from HOCON file first, fall back to environment variables
        Self::from_hocon().unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to load HOCON config: {}. Falling back to environment variables.",
                e
            );
            Self::from_env_fallback()
        })
    }
}

impl Config {
    /// Load configuration from HOCON file with environment variable substitution
    pub fn from_hocon() -> Result<Self, String> {
        Self::from_hocon_path("application.conf")
    }

    /// Load configuration from a specific HOCON file path
    pub fn from_hocon_path<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(format!("Configuration file not found: {}", path.display()));
        }

        let mut config: Config = HoconLoader::new()
            .load_file(path)
            .map_err(|e| format!("Failed to load HOCON file: {}", e))?
            .resolve()
            .map_err(|e| format!("Failed to parse and resolve HOCON: {}", e))?;

        // The environment wins over the file.
        if let Some(url) = env_override(DATABASE_URL_ENV) {
            config.database.url = url;
        }
        if let Some(service_name) = env_override(SERVICE_NAME_ENV) {
            config.telemetry.service_name = service_name;
        }

        Ok(config)
    }

    /// Load from `OAUTH2_*` environment variables only.
    ///
    /// Nested keys use `__` (`OAUTH2_CATALOG__VALIDATE_ON_STARTUP`), but
    /// [`DATABASE_URL_ENV`] and [`SERVICE_NAME_ENV`] take precedence, as they
    /// do for the other loaders.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .add_source(
                config::Environment::with_prefix("OAUTH2")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("database.url", env_override(DATABASE_URL_ENV))?
            .set_override_option("telemetry.service_name", env_override(SERVICE_NAME_ENV))?
            .build()?;

        config.try_deserialize()
    }

    /// Fallback configuration from environment variables (no catalog).
    fn from_env_fallback() -> Self {
        Self {
            database: DatabaseConfig {
                url: env_override(DATABASE_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            telemetry: TelemetryConfig {
                service_name: env_override(SERVICE_NAME_ENV)
                    .unwrap_or_else(default_service_name),
            },
            catalog: CatalogConfig::default(),
        }
    }

    /// Reject catalog entries no request could ever name.
    ///
    /// Conflicts between names are left to catalog validation, which also
    /// covers resources stored outside this file.
    pub fn validate(&self) -> Result<(), String> {
        let identity = self.catalog.identity_resources.iter().map(|r| &r.name);
        let apis = self.catalog.api_resources.iter().map(|r| &r.name);
        let scopes = self
            .catalog
            .api_resources
            .iter()
            .flat_map(|r| r.scopes.iter().map(|s| &s.name));

        for name in identity.chain(apis).chain(scopes) {
            if name.is_empty() {
                return Err("catalog entries must have a non-empty name".to_string());
            }
            if name.chars().any(char::is_whitespace) {
                return Err(format!(
                    "catalog name '{name}' contains whitespace and can never be requested as a scope"
                ));
            }
        }

        Ok(())
    }

    /// Produce a version safe to log (secrets masked).
    pub fn sanitized(&self) -> Self {
        let mut clone = self.clone();
        clone.database.url = mask_url_password(&self.database.url);
        clone
    }
}

fn mask_url_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some(MASK)).is_ok() {
                parsed.to_string()
            } else {
                MASK.to_string()
            }
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_conf(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".conf").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_catalog_from_hocon() {
        let file = write_conf(
            r#"
            database { url = "memory" }
            catalog {
              include_standard_identity_resources = true
              identity_resources = [
                { name = "roles", user_claims = ["role"] }
              ]
              api_resources = [
                {
                  name = "orders"
                  display_name = "Orders API"
                  scopes = [
                    { name = "orders.read", required = true }
                    { name = "orders.write" }
                  ]
                }
              ]
            }
            "#,
        );

        let config = Config::from_hocon_path(file.path()).unwrap();

        assert_eq!(config.telemetry.service_name, DEFAULT_SERVICE_NAME);
        assert!(config.catalog.validate_on_startup);
        let identity = config.catalog.identity_resources();
        assert_eq!(identity.len(), 6);
        assert_eq!(identity[5].name, "roles");
        assert!(identity[5].enabled);
        let orders = &config.catalog.api_resources[0];
        assert_eq!(orders.scopes.len(), 2);
        assert!(orders.scopes[0].required);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Config::from_hocon_path("/definitely/not/here.conf").unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn whitespace_in_scope_names_is_rejected() {
        let mut config = Config::from_env_fallback();
        config
            .catalog
            .api_resources
            .push(ApiResource::new("orders").with_scope(oauth2_core::Scope::new("orders read")));

        let err = config.validate().unwrap_err();
        assert!(err.contains("orders read"));
    }

    #[test]
    fn sanitized_masks_database_password() {
        let mut config = Config::from_env_fallback();
        config.database.url = "postgres://svc:hunter2@db:5432/catalog".to_string();

        let sanitized = config.sanitized();
        assert!(!sanitized.database.url.contains("hunter2"));
        assert!(sanitized.database.url.contains(MASK));

        config.database.url = "sqlite:catalog.db".to_string();
        assert_eq!(config.sanitized().database.url, "sqlite:catalog.db");
    }
}
