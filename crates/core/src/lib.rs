//! # Mobi Mama Core
//!
//! Core business logic for the Mobi Mama antenatal care service.
//!
//! This crate contains:
//! - The vitals-based obstetric risk assessment ([`risk::assess`])
//! - The ingestion pathway that stores a reading with its tier and flags the patient
//!   ([`VitalsIngestion`])
//! - Read paths over stored readings ([`VitalsHistory`])
//! - A generic [`RecordStore`] interface with in-memory and JSON-file implementations
//!
//! **No API concerns**: HTTP servers, request DTOs and CLI parsing belong in `api-rest`,
//! `api-shared` and `mobimama-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod ingestion;
pub mod patient;
pub mod risk;
pub mod store;
pub mod vitals;

pub use config::{CoreConfig, StoreBackend};
pub use error::{CoreError, CoreResult, IngestError, IngestResult, StoreError, StoreResult};
pub use history::{RiskSummary, VitalsHistory};
pub use ingestion::{Ingested, PatientFlagUpdate, VitalsIngestion};
pub use mama_uuid::RecordId;
pub use patient::{Patient, PatientService};
pub use risk::{assess, score, RiskFinding, RiskScore};
pub use store::{JsonFileStore, MemoryStore, Query, RecordStore, Row};
pub use vitals::{RiskTier, StoredReading, UrineProtein, VitalSigns, VitalsReadingInput};
