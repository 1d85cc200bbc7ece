//! Resource store backend selection.
//!
//! This crate centralizes URL-based backend selection (memory vs SQLx) and wraps
//! the chosen implementation with `ObservedResourceStore` for tracing.

use std::sync::Arc;

use oauth2_core::{ApiResource, IdentityResource, OAuth2Error};

pub use oauth2_observability::{ObservedResourceStore, ResourceStoreMetrics};
pub use oauth2_ports::{DynResourceStore, ResourceStore};

pub mod memory {
    pub use oauth2_storage_memory::InMemoryResourceStore;
}

pub mod sqlx {
    pub use oauth2_storage_sqlx::SqlxResourceStore;
}

fn is_memory_url(database_url: &str) -> bool {
    database_url == "memory" || database_url.starts_with("memory:")
}

fn db_system(database_url: &str) -> &'static str {
    if is_memory_url(database_url) {
        "memory"
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        "postgresql"
    } else if database_url.starts_with("sqlite:") {
        "sqlite"
    } else {
        "sql"
    }
}

fn observe(
    inner: DynResourceStore,
    database_url: &str,
    metrics: Option<ResourceStoreMetrics>,
) -> DynResourceStore {
    let observed = ObservedResourceStore::new(inner, db_system(database_url).to_string());
    match metrics {
        Some(metrics) => Arc::new(observed.with_metrics(metrics)),
        None => Arc::new(observed),
    }
}

/// Create an empty (or existing, for SQL) resource store based on URL scheme.
///
/// Supported:
/// - `memory` and `memory:...` -> in-memory backend
/// - `postgres://...` and `sqlite:...` -> SQLx backend (schema bootstrapped)
pub async fn create_resource_store(
    database_url: &str,
    metrics: Option<ResourceStoreMetrics>,
) -> Result<DynResourceStore, OAuth2Error> {
    create_seeded_resource_store(database_url, metrics, Vec::new(), Vec::new()).await
}

/// Create a store and load `identity_resources` / `api_resources` into it.
///
/// The memory backend takes the catalog verbatim so that naming conflicts stay
/// visible to catalog validation. SQL backends insert each resource and keep
/// rows that already exist.
pub async fn create_seeded_resource_store(
    database_url: &str,
    metrics: Option<ResourceStoreMetrics>,
    identity_resources: Vec<IdentityResource>,
    api_resources: Vec<ApiResource>,
) -> Result<DynResourceStore, OAuth2Error> {
    if is_memory_url(database_url) {
        let inner: DynResourceStore = Arc::new(memory::InMemoryResourceStore::with_catalog(
            identity_resources,
            api_resources,
        ));
        return Ok(observe(inner, database_url, metrics));
    }

    let storage = sqlx::SqlxResourceStore::new(database_url).await?;
    let store = observe(Arc::new(storage), database_url, metrics);
    store.init().await?;

    for resource in &identity_resources {
        keep_existing(store.save_identity_resource(resource).await, &resource.name)?;
    }
    for resource in &api_resources {
        keep_existing(store.save_api_resource(resource).await, &resource.name)?;
    }

    Ok(store)
}

fn keep_existing(result: Result<(), OAuth2Error>, name: &str) -> Result<(), OAuth2Error> {
    match result {
        Err(err) if err.error == "invalid_request" => {
            tracing::debug!(resource = %name, "resource already stored; keeping existing row");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_system_follows_url_scheme() {
        assert_eq!(db_system("memory"), "memory");
        assert_eq!(db_system("memory:catalog"), "memory");
        assert_eq!(db_system("postgresql://db/catalog"), "postgresql");
        assert_eq!(db_system("sqlite:catalog.db"), "sqlite");
        assert_eq!(db_system("mysql://db"), "sql");
    }

    #[tokio::test]
    async fn memory_store_keeps_conflicting_catalog() {
        let store = create_seeded_resource_store(
            "memory",
            None,
            vec![IdentityResource::email(), IdentityResource::email()],
            Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(store.get_all_identity_resources().await.unwrap().len(), 2);
    }
}
