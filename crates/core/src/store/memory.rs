//! In-process record store.

use super::{ensure_row_id, merge_patch, Query, RecordStore, Row};
use crate::constants::ID_COLUMN;
use crate::error::{StoreError, StoreResult};
use mama_uuid::RecordId;
use std::collections::HashMap;
use std::sync::RwLock;

/// Tables held in memory, each a `Vec` of rows in insertion order.
///
/// Every write takes the single write lock, which gives per-row (indeed per-store) update
/// serialisation. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in `table`.
    pub fn len(&self, table: &str) -> StoreResult<usize> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.get(table).map_or(0, Vec::len))
    }
}

fn row_has_id(row: &Row, id: &str) -> bool {
    row.get(ID_COLUMN).and_then(|v| v.as_str()) == Some(id)
}

impl RecordStore for MemoryStore {
    fn insert(&self, table: &str, mut row: Row) -> StoreResult<Row> {
        let id = ensure_row_id(&mut row)?.to_string();

        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|existing| row_has_id(existing, &id)) {
            return Err(StoreError::Duplicate {
                table: table.to_string(),
                id,
            });
        }

        rows.push(row.clone());
        Ok(row)
    }

    fn update(&self, table: &str, id: &RecordId, patch: Row) -> StoreResult<Row> {
        let id = id.to_string();
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;

        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| row_has_id(row, &id)))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id,
            })?;

        merge_patch(row, patch);
        Ok(row.clone())
    }

    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.get(table).cloned().unwrap_or_default();
        Ok(query.apply(rows))
    }
}
