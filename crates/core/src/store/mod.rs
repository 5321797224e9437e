//! Generic record store.
//!
//! The core never talks to a particular database. It needs three verbs over tables of
//! JSON-object rows: insert a row, patch a row by id, and select rows matching a [`Query`].
//! Any persistence technology that can provide those verbs can back the ingestion pathway.
//!
//! Two implementations ship with the crate:
//! - [`MemoryStore`]: process-local tables behind an `RwLock`.
//! - [`JsonFileStore`]: one JSON file per row in a sharded directory tree.

mod json_files;
mod memory;
mod query;

pub use json_files::JsonFileStore;
pub use memory::MemoryStore;
pub use query::{Order, Query};

use crate::constants::{ID_COLUMN, MAX_TABLE_NAME_LEN};
use crate::error::{StoreError, StoreResult};
use mama_uuid::RecordId;
use std::sync::Arc;

/// A single row: a JSON object keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// The verbs the core requires of a persistence layer.
///
/// Implementations must serialise updates per row; beyond that no ordering between
/// concurrent writers is promised.
pub trait RecordStore: Send + Sync {
    /// Inserts `row` into `table` and returns it as stored.
    ///
    /// If `row` has no `id` a fresh [`RecordId`] is assigned. An `id` that is already present
    /// in the table fails with [`StoreError::Duplicate`].
    fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    /// Merges `patch` into the row identified by `id` and returns the updated row.
    ///
    /// The `id` column itself is never overwritten. Fails with [`StoreError::NotFound`] if no
    /// such row exists.
    fn update(&self, table: &str, id: &RecordId, patch: Row) -> StoreResult<Row>;

    /// Returns every row in `table` matching `query`, ordered as the query requests.
    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        (**self).insert(table, row)
    }

    fn update(&self, table: &str, id: &RecordId, patch: Row) -> StoreResult<Row> {
        (**self).update(table, id, patch)
    }

    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        (**self).select(table, query)
    }
}

/// Validates that a table name is safe to use as a directory name.
///
/// Restricts names to lowercase ASCII letters, digits and `_`, bounded in length, so a table
/// name can never traverse out of the store root.
pub(crate) fn validate_table_name(table: &str) -> StoreResult<()> {
    if table.is_empty() || table.len() > MAX_TABLE_NAME_LEN {
        return Err(StoreError::InvalidTable(format!(
            "table name must be 1-{} characters",
            MAX_TABLE_NAME_LEN
        )));
    }

    let ok = table
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'));
    if !ok {
        return Err(StoreError::InvalidTable(format!(
            "'{}' contains invalid characters (only a-z, 0-9, '_' allowed)",
            table
        )));
    }

    Ok(())
}

/// Converts a serialisable value into a row. Fails if the value is not a JSON object.
pub fn to_row<T: serde::Serialize>(value: &T) -> Result<Row, serde_json::Error> {
    serde_json::to_value(value).and_then(serde_json::from_value)
}

/// Returns the row's id, assigning a new one if the row has none.
pub(crate) fn ensure_row_id(row: &mut Row) -> StoreResult<RecordId> {
    match row.get(ID_COLUMN) {
        Some(serde_json::Value::String(s)) => Ok(RecordId::parse(s)?),
        Some(other) => Err(StoreError::InvalidRecordId(mama_uuid::RecordIdError::InvalidInput(
            format!("id must be a string, got {}", other),
        ))),
        None => {
            let id = RecordId::new();
            row.insert(ID_COLUMN.into(), serde_json::Value::String(id.to_string()));
            Ok(id)
        }
    }
}

/// Applies `patch` to `row`, leaving the `id` column untouched.
pub(crate) fn merge_patch(row: &mut Row, patch: Row) {
    for (column, value) in patch {
        if column != ID_COLUMN {
            row.insert(column, value);
        }
    }
}
