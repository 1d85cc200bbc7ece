pub use oauth2_storage_factory::{
    create_resource_store, create_seeded_resource_store, DynResourceStore,
    ObservedResourceStore, ResourceStore, ResourceStoreMetrics,
};

pub use oauth2_storage_factory::memory;
pub use oauth2_storage_factory::sqlx;
