use mama_uuid::RecordIdError;

/// Errors raised by [`RecordStore`](crate::store::RecordStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid table name: {0}")]
    InvalidTable(String),
    #[error("invalid record id: {0}")]
    InvalidRecordId(#[from] RecordIdError),
    #[error("record {id} not found in table {table}")]
    NotFound { table: String, id: String },
    #[error("record {id} already exists in table {table}")]
    Duplicate { table: String, id: String },
    #[error("failed to create storage directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("record store lock poisoned")]
    LockPoisoned,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors returned by [`VitalsIngestion::ingest`](crate::ingestion::VitalsIngestion::ingest).
///
/// Only the primary reading write can fail an ingestion. A failed patient-flag update is
/// reported on the successful result instead.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{field} must be a finite number")]
    NonFiniteMeasurement { field: &'static str },
    #[error("failed to encode vitals reading: {0}")]
    Encode(serde_json::Error),
    #[error("failed to persist vitals reading: {0}")]
    Persistence(#[source] StoreError),
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// General errors for configuration and read paths.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
    #[error("failed to encode {table} row: {source}")]
    Encode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {table} row: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
