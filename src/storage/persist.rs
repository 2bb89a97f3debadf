use log::debug;

use super::PlaceStore;
use crate::error_handling::PersistenceError;
use crate::models::PlaceRecord;

/// Stores `documents` and checks that every one of them received an identifier.
pub async fn persist_batch<S: PlaceStore>(
    store: &S,
    documents: &[PlaceRecord],
) -> Result<Vec<i64>, PersistenceError> {
    let ids = store.insert_many(documents).await?;
    if ids.len() != documents.len() {
        return Err(PersistenceError::PartialInsert {
            expected: documents.len(),
            inserted: ids.len(),
        });
    }
    debug!("Stored {} document(s): {:?}", ids.len(), ids);
    Ok(ids)
}
