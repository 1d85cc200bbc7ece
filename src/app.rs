//! Assembly: configuration -> store -> resolver.

use std::path::Path;
use thiserror::Error;

use crate::config::Config;
use crate::models::{OAuth2Error, ResolveError, Resources};
use crate::resolver::{DynScopeResolver, ScopeResolver};
use crate::storage::{create_seeded_resource_store, ResourceStoreMetrics};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to render output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("telemetry error: {0}")]
    Telemetry(String),
}

impl From<OAuth2Error> for AppError {
    fn from(err: OAuth2Error) -> Self {
        Self::Resolve(ResolveError::Store(err))
    }
}

impl AppError {
    /// Process exit code: 2 for a misconfigured catalog, 1 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Resolve(ResolveError::Catalog(_)) => 2,
            _ => 1,
        }
    }
}

/// Load the HOCON file at `path`, or the `OAUTH2_*` environment when it does
/// not exist.
///
/// Either way `OAUTH2_DATABASE_URL` and `OAUTH2_SERVICE_NAME` override the
/// loaded values.
pub fn load_config(path: &Path) -> Result<Config, AppError> {
    let config = if path.exists() {
        Config::from_hocon_path(path).map_err(AppError::Config)?
    } else {
        tracing::warn!(path = %path.display(), "config file not found; using environment");
        Config::from_env().map_err(|e| AppError::Config(e.to_string()))?
    };

    config.validate().map_err(AppError::Config)?;
    Ok(config)
}

/// Build the store described by `config`, seed its catalog and wrap it in a
/// resolver. The catalog is validated here when `validate_on_startup` is set.
pub async fn build_resolver(
    config: &Config,
    metrics: Option<ResourceStoreMetrics>,
) -> Result<DynScopeResolver, AppError> {
    let store = create_seeded_resource_store(
        &config.database.url,
        metrics,
        config.catalog.identity_resources(),
        config.catalog.api_resources.clone(),
    )
    .await?;

    let resolver = ScopeResolver::new(store);
    if config.catalog.validate_on_startup {
        resolver.validate_catalog().await?;
    }

    tracing::info!(
        database_url = %config.sanitized().database.url,
        "resource resolver ready"
    );
    Ok(resolver)
}

/// Validate the whole catalog once and return its enabled part.
pub async fn check_catalog(
    config: &Config,
    metrics: Option<ResourceStoreMetrics>,
) -> Result<Resources, AppError> {
    let mut config = config.clone();
    config.catalog.validate_on_startup = false;

    let resolver = build_resolver(&config, metrics).await?;
    Ok(resolver.get_all_enabled_resources().await?)
}
