#![allow(dead_code)]

use oauth2_core::{ApiResource, IdentityResource, Scope};
use oauth2_ports::ResourceStore;

fn other(e: impl ToString) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

pub fn orders_api() -> ApiResource {
    ApiResource::new("orders")
        .with_display_name("Orders API")
        .with_user_claims(["role"])
        .with_scope(Scope::new("orders.read").required(true))
        .with_scope(
            Scope::new("orders.write")
                .with_description("Create and amend orders")
                .with_user_claims(["tenant"]),
        )
        .with_scope(Scope::new("orders.admin").shown_in_discovery(false))
}

pub fn invoices_api() -> ApiResource {
    ApiResource::new("invoices")
        .with_scope(Scope::new("invoices.read"))
        .with_scope(Scope::new("invoices.pay").emphasized(true))
}

/// A minimal contract test suite that every `ResourceStore` backend must satisfy.
///
/// This keeps backend parity honest (memory, SQLx, and any future backends).
pub async fn run_resource_store_contract(
    store: &dyn ResourceStore,
) -> Result<(), Box<dyn std::error::Error>> {
    // Empty lookups
    assert!(store
        .find_identity_resources_by_scope_name(&["openid".to_string()])
        .await
        .map_err(other)?
        .is_empty());
    assert!(store
        .find_api_resources_by_scope_name(&[])
        .await
        .map_err(other)?
        .is_empty());

    // Identity resource roundtrip
    for resource in [
        IdentityResource::openid(),
        IdentityResource::profile(),
        IdentityResource::email().enabled(false),
    ] {
        store.save_identity_resource(&resource).await.map_err(other)?;
    }

    let found = store
        .find_identity_resources_by_scope_name(&["email".to_string(), "unknown".to_string()])
        .await
        .map_err(other)?;
    assert_eq!(found, vec![IdentityResource::email().enabled(false)]);

    // Uniqueness parity: saving the same identity resource twice should fail.
    let dup = store.save_identity_resource(&IdentityResource::openid()).await;
    assert!(dup.is_err(), "saving the same identity resource twice should fail");

    // API resource roundtrip keeps every scope, in order, with metadata
    store.save_api_resource(&orders_api()).await.map_err(other)?;
    store.save_api_resource(&invoices_api()).await.map_err(other)?;

    let found = store
        .find_api_resources_by_scope_name(&["orders.write".to_string()])
        .await
        .map_err(other)?;
    assert_eq!(found, vec![orders_api()]);

    let found = store
        .find_api_resources_by_scope_name(&["orders.read".to_string(), "invoices.pay".to_string()])
        .await
        .map_err(other)?;
    let mut names: Vec<&str> = found.iter().map(|api| api.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["invoices", "orders"]);

    // An API resource name is not a scope name.
    assert!(store
        .find_api_resources_by_scope_name(&["orders".to_string()])
        .await
        .map_err(other)?
        .is_empty());

    let dup = store.save_api_resource(&ApiResource::new("orders")).await;
    assert!(dup.is_err(), "saving the same API resource twice should fail");

    // Scope names may repeat across API resources; validation reports it later.
    store
        .save_api_resource(&ApiResource::new("orders-v2").with_scope(Scope::new("orders.read")))
        .await
        .map_err(other)?;

    let all_identity = store.get_all_identity_resources().await.map_err(other)?;
    assert_eq!(all_identity.len(), 3);
    let all_api = store.get_all_api_resources().await.map_err(other)?;
    assert_eq!(all_api.len(), 3);

    store.healthcheck().await.map_err(other)?;

    Ok(())
}
