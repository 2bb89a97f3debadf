// storage/mod.rs
// Document store operations

mod collection;
mod persist;
pub mod pool;
pub mod test_helpers;

use std::future::Future;

use crate::models::{PlaceField, PlaceRecord};

// Re-export commonly used items
pub use collection::{connect_store, SqlitePlaceStore};
pub use persist::persist_batch;
pub use pool::init_db_pool_with_path;

/// A collection of place documents.
pub trait PlaceStore {
    /// Inserts `documents` and returns one generated identifier per stored document.
    fn insert_many(
        &self,
        documents: &[PlaceRecord],
    ) -> impl Future<Output = Result<Vec<i64>, sqlx::Error>>;

    /// First document whose `field` equals `value`, if any.
    fn find_one(
        &self,
        field: PlaceField,
        value: &str,
    ) -> impl Future<Output = Result<Option<PlaceRecord>, sqlx::Error>>;

    /// Cheap connectivity check.
    fn ping(&self) -> impl Future<Output = Result<(), sqlx::Error>>;
}
