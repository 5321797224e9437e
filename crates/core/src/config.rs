//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services, so
//! request handling never reads process-wide environment variables. The `*_from_env_value`
//! helpers take the raw variable value so binaries own the `std::env` access and tests can
//! exercise parsing without mutating the environment.

use crate::constants::{DEFAULT_DATA_DIR, MAX_FLAG_UPDATE_ATTEMPTS};
use crate::error::{CoreError, CoreResult};
use crate::store::{JsonFileStore, MemoryStore, RecordStore};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Which [`RecordStore`] implementation backs the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local, lost on exit. Useful for demos and tests.
    Memory,
    /// One JSON file per row under the data directory.
    JsonFiles,
}

impl FromStr for StoreBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "json" | "json_files" => Ok(StoreBackend::JsonFiles),
            other => Err(CoreError::InvalidInput(format!(
                "unknown store backend '{}' (expected 'memory' or 'json')",
                other
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store_backend: StoreBackend,
    data_dir: PathBuf,
    flag_update_attempts: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `flag_update_attempts` is zero or above
    /// [`MAX_FLAG_UPDATE_ATTEMPTS`].
    pub fn new(
        store_backend: StoreBackend,
        data_dir: PathBuf,
        flag_update_attempts: u32,
    ) -> CoreResult<Self> {
        if flag_update_attempts == 0 || flag_update_attempts > MAX_FLAG_UPDATE_ATTEMPTS {
            return Err(CoreError::InvalidInput(format!(
                "flag_update_attempts must be between 1 and {}",
                MAX_FLAG_UPDATE_ATTEMPTS
            )));
        }

        Ok(Self {
            store_backend,
            data_dir,
            flag_update_attempts,
        })
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn flag_update_attempts(&self) -> u32 {
        self.flag_update_attempts
    }

    /// Opens the configured record store.
    pub fn open_store(&self) -> CoreResult<Arc<dyn RecordStore>> {
        Ok(match self.store_backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::JsonFiles => Arc::new(JsonFileStore::open(&self.data_dir)?),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses the store backend. Missing or blank selects the JSON file store.
pub fn store_backend_from_env_value(value: Option<String>) -> CoreResult<StoreBackend> {
    non_blank(value)
        .map(|v| v.parse())
        .transpose()
        .map(|backend| backend.unwrap_or(StoreBackend::JsonFiles))
}

/// Resolves the data directory. Missing or blank selects [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_DATA_DIR.into()))
}

/// Parses the patient-flag attempt count. Missing or blank selects a single attempt.
pub fn flag_update_attempts_from_env_value(value: Option<String>) -> CoreResult<u32> {
    match non_blank(value) {
        None => Ok(1),
        Some(v) => v.parse::<u32>().map_err(|e| {
            CoreError::InvalidInput(format!("invalid flag update attempts '{}': {}", v, e))
        }),
    }
}
