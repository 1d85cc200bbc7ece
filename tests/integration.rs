//! End-to-end: HOCON file -> seeded store -> resolver.

use std::collections::BTreeSet;
use std::io::Write;

use rust_oauth2_resources::app::{self, AppError};
use rust_oauth2_resources::models::{
    required_scope_names, CatalogError, DiscoveryMetadata, ResolveError,
};
use rust_oauth2_resources::resolver::DynScopeResolver;
use rust_oauth2_resources::storage::ResourceStoreMetrics;

const CATALOG: &str = r#"
catalog {
  include_standard_identity_resources = true
  identity_resources = [
    { name = "tenant", user_claims = ["tenant_id"], show_in_discovery_document = false },
    { name = "legacy", user_claims = ["legacy_id"], enabled = false }
  ]
  api_resources = [
    {
      name = "orders"
      user_claims = ["role"]
      scopes = [
        { name = "orders.read", required = true },
        { name = "orders.write" }
      ]
    },
    {
      name = "billing"
      enabled = false
      scopes = [ { name = "billing.read" } ]
    }
  ]
}
"#;

fn write_config(database_url: &str, catalog: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".conf")
        .tempfile()
        .unwrap();
    writeln!(file, "database {{ url = \"{database_url}\" }}").unwrap();
    file.write_all(catalog.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

async fn resolver_for(database_url: &str, catalog: &str) -> Result<DynScopeResolver, AppError> {
    let file = write_config(database_url, catalog);
    let config = app::load_config(file.path())?;
    app::build_resolver(&config, None).await
}

fn names<'a>(it: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    it.map(String::as_str).collect()
}

async fn check_resolution(resolver: &DynScopeResolver) {
    let resources = resolver
        .find_resources_by_scope(["openid", "orders.read", "offline_access", "nope"])
        .await
        .unwrap();

    assert_eq!(
        names(resources.identity_resources.iter().map(|r| &r.name)),
        vec!["openid"]
    );
    assert_eq!(resources.api_resources.len(), 1);
    let orders = &resources.api_resources[0];
    assert_eq!(orders.name, "orders");
    assert_eq!(orders.user_claims, vec!["role".to_string()]);
    assert_eq!(orders.scope_names().collect::<Vec<_>>(), vec!["orders.read"]);
    assert!(resources.offline_access);
    assert_eq!(resources.granted_scope(), "offline_access openid orders.read");

    // Disabled entries survive the plain finder and are dropped by the enabled one.
    let all = resolver
        .find_resources_by_scope(["legacy", "billing.read"])
        .await
        .unwrap();
    assert_eq!(all.identity_resources.len(), 1);
    assert_eq!(all.api_resources.len(), 1);
    assert!(!all.offline_access);

    let enabled = resolver
        .find_enabled_resources_by_scope(["legacy", "billing.read"])
        .await
        .unwrap();
    assert!(enabled.is_empty());

    let identity = resolver
        .find_enabled_identity_resources_by_scope(["profile", "legacy", "orders.read"])
        .await
        .unwrap();
    assert_eq!(names(identity.iter().map(|r| &r.name)), vec!["profile"]);

    let none = resolver
        .find_resources_by_scope(Vec::<String>::new())
        .await
        .unwrap();
    assert!(none.is_empty());
    assert!(!none.offline_access);
}

#[tokio::test]
async fn memory_backend_resolves_configured_catalog() {
    let resolver = resolver_for("memory", CATALOG).await.unwrap();
    check_resolution(&resolver).await;
}

#[tokio::test]
async fn sqlite_backend_resolves_configured_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    let resolver = resolver_for(&url, CATALOG).await.unwrap();
    check_resolution(&resolver).await;
}

#[tokio::test]
async fn discovery_lists_visible_enabled_scopes_and_claims() {
    let resolver = resolver_for("memory", CATALOG).await.unwrap();
    let all = resolver.get_all_enabled_resources().await.unwrap();
    let discovery = DiscoveryMetadata::from_resources(&all, true);

    for scope in ["openid", "profile", "email", "orders.read", "orders.write", "offline_access"] {
        assert!(
            discovery.scopes_supported.iter().any(|s| s == scope),
            "missing {scope}"
        );
    }
    for hidden in ["tenant", "legacy", "billing.read"] {
        assert!(!discovery.scopes_supported.iter().any(|s| s == hidden));
    }
    assert!(discovery.claims_supported.iter().any(|c| c == "sub"));
    assert!(!discovery.claims_supported.iter().any(|c| c == "tenant_id"));
    assert_eq!(discovery.scopes_supported.last().unwrap(), "offline_access");
}

#[tokio::test]
async fn required_scopes_come_from_enabled_catalog() {
    let resolver = resolver_for("memory", CATALOG).await.unwrap();
    let all = resolver.get_all_enabled_resources().await.unwrap();

    let expected: BTreeSet<String> = ["openid", "orders.read"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(required_scope_names(&all), expected);
}

#[tokio::test]
async fn catalog_check_loads_the_catalog_once() {
    let file = write_config("memory", CATALOG);
    let config = app::load_config(file.path()).unwrap();
    let metrics = ResourceStoreMetrics::new().unwrap();

    let all = app::check_catalog(&config, Some(metrics.clone()))
        .await
        .unwrap();

    assert_eq!(all.identity_resources.len(), 6);
    assert_eq!(all.api_resources.len(), 1);
    assert_eq!(metrics.query_count("get_all_identity_resources", true), 1);
    assert_eq!(metrics.query_count("get_all_api_resources", true), 1);
}

#[tokio::test]
async fn catalog_check_reports_conflicts() {
    let catalog = r#"
catalog {
  identity_resources = [ { name = "email", user_claims = ["email"] } ]
  api_resources = [ { name = "mail", scopes = [ { name = "email" } ] } ]
}
"#;
    let file = write_config("memory", catalog);
    let config = app::load_config(file.path()).unwrap();

    let err = app::check_catalog(&config, None).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn overlapping_catalog_fails_at_startup() {
    let catalog = r#"
catalog {
  identity_resources = [ { name = "email", user_claims = ["email"] } ]
  api_resources = [ { name = "mail", scopes = [ { name = "email" } ] } ]
}
"#;

    let err = resolver_for("memory", catalog).await.err().unwrap();
    assert_eq!(err.exit_code(), 2);
    match err {
        AppError::Resolve(ResolveError::Catalog(CatalogError::OverlappingScopeNamespace {
            names,
        })) => assert_eq!(names, vec!["email".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn conflicts_surface_on_request_when_startup_check_is_off() {
    let catalog = r#"
catalog {
  validate_on_startup = false
  api_resources = [
    { name = "orders", scopes = [ { name = "read" } ] },
    { name = "invoices", scopes = [ { name = "read" } ] }
  ]
}
"#;

    let resolver = resolver_for("memory", catalog).await.unwrap();
    let err = resolver.find_resources_by_scope(["read"]).await.unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Catalog(CatalogError::DuplicateScopeNames { .. })
    ));
    assert!(err.to_string().contains("Scopes found: read"));

    // Unrelated requests are still checked against what they load.
    let unrelated = resolver.find_resources_by_scope(["openid"]).await.unwrap();
    assert!(unrelated.is_empty());
}

#[tokio::test]
async fn whitespace_in_names_is_a_config_error() {
    let catalog = r#"
catalog {
  identity_resources = [ { name = "has space" } ]
}
"#;

    let err = resolver_for("memory", catalog).await.err().unwrap();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(err.exit_code(), 1);
}
