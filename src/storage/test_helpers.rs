//! Shared test helpers for storage module tests.

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

#[cfg(test)]
use crate::models::PlaceRecord;
#[cfg(test)]
use crate::storage::SqlitePlaceStore;

/// Creates an in-memory test database pool.
/// A single connection, since every in-memory connection is its own database.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool")
}

/// Creates a store over an in-memory database with the `places` collection.
#[cfg(test)]
pub async fn create_test_store() -> SqlitePlaceStore {
    let store = SqlitePlaceStore::new(Arc::new(create_test_pool().await), "places")
        .expect("valid collection name");
    store
        .ensure_collection()
        .await
        .expect("Failed to create collection");
    store
}

#[cfg(test)]
pub fn moscow_place() -> PlaceRecord {
    PlaceRecord {
        region: Some("Central Federal District".to_string()),
        state: Some("Moscow".to_string()),
        country: "Russia".to_string(),
        country_code: "ru".to_string(),
        iso: "RU-MOW".to_string(),
        city: Some("Moscow".to_string()),
    }
}
