//! SQLite-backed place collection.
//!
//! Each collection is a table of its own. Absent optional fields are stored as
//! NULL and read back as `None`.

use std::sync::Arc;

use log::info;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{init_db_pool_with_path, PlaceStore};
use crate::config::{is_identifier, StoreSettings};
use crate::error_handling::DatabaseError;
use crate::models::{PlaceField, PlaceRecord};

/// Place documents in one table of a SQLite database.
#[derive(Clone)]
pub struct SqlitePlaceStore {
    pool: Arc<SqlitePool>,
    collection: String,
}

/// Opens the database file, creating it if needed, and ensures the collection exists.
pub async fn connect_store(settings: &StoreSettings) -> Result<SqlitePlaceStore, DatabaseError> {
    let pool = init_db_pool_with_path(&settings.database).await?;
    let store = SqlitePlaceStore::new(pool, &settings.collection)?;
    store.ensure_collection().await?;
    info!(
        "Document store ready: {} (collection {})",
        settings.database.display(),
        store.collection()
    );
    Ok(store)
}

impl SqlitePlaceStore {
    /// Wraps `pool`; the collection name is interpolated into SQL and must be a
    /// plain identifier.
    pub fn new(pool: Arc<SqlitePool>, collection: &str) -> Result<Self, DatabaseError> {
        if !is_identifier(collection) {
            return Err(DatabaseError::InvalidCollection(collection.to_string()));
        }
        Ok(Self {
            pool,
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn ensure_collection(&self) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                region TEXT,
                state TEXT,
                country TEXT NOT NULL,
                country_code TEXT NOT NULL,
                iso TEXT NOT NULL,
                city TEXT
            )",
            self.collection
        ))
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS \"idx_{0}_city\" ON \"{0}\" (city)",
            self.collection
        ))
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    /// Number of documents in the collection.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", self.collection);
        sqlx::query_scalar(&sql)
            .fetch_one(self.pool.as_ref())
            .await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn place_from_row(row: &SqliteRow) -> Result<PlaceRecord, sqlx::Error> {
    Ok(PlaceRecord {
        region: row.try_get("region")?,
        state: row.try_get("state")?,
        country: row.try_get("country")?,
        country_code: row.try_get("country_code")?,
        iso: row.try_get("iso")?,
        city: row.try_get("city")?,
    })
}

impl PlaceStore for SqlitePlaceStore {
    async fn insert_many(&self, documents: &[PlaceRecord]) -> Result<Vec<i64>, sqlx::Error> {
        let sql = format!(
            "INSERT INTO \"{}\" (region, state, country, country_code, iso, city)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
            self.collection
        );

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(documents.len());
        for place in documents {
            let id: i64 = sqlx::query_scalar(&sql)
                .bind(&place.region)
                .bind(&place.state)
                .bind(&place.country)
                .bind(&place.country_code)
                .bind(&place.iso)
                .bind(&place.city)
                .fetch_one(&mut *tx)
                .await?;
            ids.push(id);
        }
        tx.commit().await?;
        Ok(ids)
    }

    async fn find_one(
        &self,
        field: PlaceField,
        value: &str,
    ) -> Result<Option<PlaceRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT region, state, country, country_code, iso, city
             FROM \"{}\" WHERE {} = ? ORDER BY id LIMIT 1",
            self.collection,
            field.as_str()
        );
        sqlx::query(&sql)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?
            .map(|row| place_from_row(&row))
            .transpose()
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
    }
}
