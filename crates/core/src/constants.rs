//! Constants used throughout the Mobi Mama core crate.
//!
//! Table, column and filename constants live here so the store backends, the ingestion
//! pathway and the query helpers agree on one set of names.

/// Table holding one row per vitals reading.
pub const VITALS_TABLE: &str = "vitals";

/// Table holding one row per registered patient.
pub const PATIENTS_TABLE: &str = "patients";

/// Primary-key column present on every row.
pub const ID_COLUMN: &str = "id";

/// Column on `vitals` referencing the patient row.
pub const PATIENT_ID_COLUMN: &str = "patient_id";

/// Column on `vitals` holding the computed tier.
pub const RISK_TIER_COLUMN: &str = "risk_tier";

/// Column on `vitals` holding the measurement timestamp.
pub const RECORDED_AT_COLUMN: &str = "recorded_at";

/// Column on `patients` holding the current risk level.
pub const RISK_LEVEL_COLUMN: &str = "risk_level";

/// Default directory for the JSON file store when none is configured.
pub const DEFAULT_DATA_DIR: &str = "mobimama_data";

/// Filename for a single row in the JSON file store.
pub const RECORD_FILENAME: &str = "record.json";

/// Maximum length of a table name accepted by file-backed stores.
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Upper bound on attempts for the best-effort patient risk-level update.
pub const MAX_FLAG_UPDATE_ATTEMPTS: u32 = 5;
