//! SQLite/Postgres resource catalog built on SQLx.

mod rows;
mod store;

pub use store::SqlxResourceStore;
