//! File-backed record store.
//!
//! Each row lives in its own JSON file, sharded by id:
//!
//! `<root>/<table>/<id[0..2]>/<id[2..4]>/<id>/record.json`
//!
//! Rows are written to a sibling temporary file and renamed into place, so a reader never
//! observes a half-written row.

use super::{ensure_row_id, merge_patch, validate_table_name, Query, RecordStore, Row};
use crate::constants::RECORD_FILENAME;
use crate::error::{StoreError, StoreResult};
use mama_uuid::RecordId;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Record store rooted at a directory on the local filesystem.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DirCreation`] if the root directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(StoreError::DirCreation)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_dir(&self, table: &str) -> StoreResult<PathBuf> {
        validate_table_name(table)?;
        Ok(self.root.join(table))
    }

    fn record_path(&self, table: &str, id: &RecordId) -> StoreResult<PathBuf> {
        Ok(id.sharded_dir(&self.table_dir(table)?).join(RECORD_FILENAME))
    }

    fn write_row(path: &Path, row: &Row) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::DirCreation)?;
        }

        let json = serde_json::to_string_pretty(row).map_err(StoreError::Serialization)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StoreError::FileWrite)?;
        fs::rename(&tmp, path).map_err(StoreError::FileWrite)
    }

    fn read_row(path: &Path) -> StoreResult<Row> {
        let contents = fs::read_to_string(path).map_err(StoreError::FileRead)?;
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)
    }

    /// Walks `<table>/<s1>/<s2>/<id>/record.json`. Unreadable rows are logged and skipped.
    fn read_table(table_dir: &Path) -> Vec<Row> {
        let mut rows = Vec::new();

        let s1_iter = match fs::read_dir(table_dir) {
            Ok(it) => it,
            Err(_) => return rows,
        };
        for s1 in s1_iter.flatten() {
            let s2_iter = match fs::read_dir(s1.path()) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let id_iter = match fs::read_dir(s2.path()) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(RECORD_FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }
                    match Self::read_row(&record_path) {
                        Ok(row) => rows.push(row),
                        Err(e) => tracing::warn!(
                            "skipping unreadable record {}: {}",
                            record_path.display(),
                            e
                        ),
                    }
                }
            }
        }

        rows
    }
}

impl RecordStore for JsonFileStore {
    fn insert(&self, table: &str, mut row: Row) -> StoreResult<Row> {
        let id = ensure_row_id(&mut row)?;
        let path = self.record_path(table, &id)?;

        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        if path.exists() {
            return Err(StoreError::Duplicate {
                table: table.to_string(),
                id: id.to_string(),
            });
        }

        Self::write_row(&path, &row)?;
        Ok(row)
    }

    fn update(&self, table: &str, id: &RecordId, patch: Row) -> StoreResult<Row> {
        let path = self.record_path(table, id)?;

        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        if !path.is_file() {
            return Err(StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }

        let mut row = Self::read_row(&path)?;
        merge_patch(&mut row, patch);
        Self::write_row(&path, &row)?;
        Ok(row)
    }

    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        let table_dir = self.table_dir(table)?;
        Ok(query.apply(Self::read_table(&table_dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ID_COLUMN;
    use crate::store::Order;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[test]
    fn test_insert_writes_sharded_record_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).expect("store should open");

        let stored = store
            .insert("patients", row(json!({"first_name": "Ngozi"})))
            .expect("insert should succeed");
        let id = RecordId::parse(stored[ID_COLUMN].as_str().unwrap()).unwrap();

        let expected = id
            .sharded_dir(&temp_dir.path().join("patients"))
            .join(RECORD_FILENAME);
        assert!(expected.is_file(), "record.json should exist");
        assert!(
            !expected.with_extension("json.tmp").exists(),
            "temporary file should be renamed away"
        );

        let on_disk: Row =
            serde_json::from_str(&fs::read_to_string(expected).unwrap()).unwrap();
        assert_eq!(on_disk, stored);
    }

    #[test]
    fn test_insert_keeps_supplied_id_and_rejects_duplicates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).unwrap();
        let id = "550e8400e29b41d4a716446655440000";

        let stored = store
            .insert("vitals", row(json!({"id": id, "risk_tier": "low"})))
            .unwrap();
        assert_eq!(stored[ID_COLUMN], json!(id));

        let err = store
            .insert("vitals", row(json!({"id": id, "risk_tier": "high"})))
            .expect_err("duplicate should fail");
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_update_persists_patch() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).unwrap();

        let stored = store
            .insert("patients", row(json!({"risk_level": "low", "last_name": "Bello"})))
            .unwrap();
        let id = RecordId::parse(stored[ID_COLUMN].as_str().unwrap()).unwrap();

        store
            .update("patients", &id, row(json!({"risk_level": "high"})))
            .expect("update should succeed");

        let reopened = JsonFileStore::open(temp_dir.path()).unwrap();
        let rows = reopened.select("patients", &Query::all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["risk_level"], json!("high"));
        assert_eq!(rows[0]["last_name"], json!("Bello"));
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).unwrap();

        let err = store
            .update("patients", &RecordId::new(), Row::new())
            .expect_err("update should fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_rejects_unsafe_table_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).unwrap();

        let err = store
            .insert("../escape", Row::new())
            .expect_err("unsafe table should fail");
        assert!(matches!(err, StoreError::InvalidTable(_)));
        assert!(store.select("..", &Query::all()).is_err());
    }

    #[test]
    fn test_select_filters_orders_and_skips_corrupt_rows() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).unwrap();

        store
            .insert("vitals", row(json!({"n": 1, "recorded_at": "2026-10-01T08:00:00Z"})))
            .unwrap();
        store
            .insert("vitals", row(json!({"n": 2, "recorded_at": "2026-10-02T08:00:00Z"})))
            .unwrap();

        let corrupt_dir = RecordId::new().sharded_dir(&temp_dir.path().join("vitals"));
        fs::create_dir_all(&corrupt_dir).unwrap();
        fs::write(corrupt_dir.join(RECORD_FILENAME), "{ not json").unwrap();

        let rows = store
            .select("vitals", &Query::all().order_by("recorded_at", Order::Descending))
            .unwrap();
        let order: Vec<i64> = rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_select_empty_table_returns_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(temp_dir.path()).unwrap();
        assert!(store.select("vitals", &Query::all()).unwrap().is_empty());
    }
}
