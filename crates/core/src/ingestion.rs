//! Vitals ingestion.
//!
//! Ingesting a reading is two writes against the record store, in order:
//!
//! 1. The reading, together with the tier computed by [`risk::assess`], is inserted into
//!    `vitals` as a single row. Failure here fails the whole ingestion and nothing else is
//!    written.
//! 2. If the tier is `high` or `critical`, the referenced patient's `risk_level` is patched to
//!    that tier. This write is best effort: failure is returned as
//!    [`PatientFlagUpdate::Failed`] on a successful result and the stored reading stands.
//!
//! The two writes are not transactional. Concurrent ingestions for one patient may
//! interleave and the last `risk_level` write wins. The patient flag only ever moves upward
//! through this path; lowering it is a separate clinical action.

use crate::config::CoreConfig;
use crate::constants::{PATIENTS_TABLE, VITALS_TABLE};
use crate::error::{IngestError, IngestResult, StoreError};
use crate::patient::risk_level_patch;
use crate::risk;
use crate::store::{to_row, RecordStore};
use crate::vitals::{RiskTier, StoredReading, VitalsReadingInput};
use chrono::Utc;
use mama_uuid::RecordId;
use std::sync::Arc;

/// Outcome of the secondary patient risk-level write.
#[derive(Debug)]
pub enum PatientFlagUpdate {
    /// The tier was `low` or `medium`; no write was issued.
    NotRequired,
    /// The patient's `risk_level` now holds the reading's tier.
    Applied,
    /// Every attempt failed. `error` is the last failure.
    Failed { attempts: u32, error: StoreError },
}

/// A successfully stored reading and what happened to the patient flag.
#[derive(Debug)]
pub struct Ingested {
    pub reading: StoredReading,
    pub patient_flag: PatientFlagUpdate,
}

impl Ingested {
    /// The non-fatal patient-flag error, if there was one.
    pub fn warning(&self) -> Option<&StoreError> {
        match &self.patient_flag {
            PatientFlagUpdate::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Assesses, stores and flags incoming vitals readings.
#[derive(Clone)]
pub struct VitalsIngestion {
    store: Arc<dyn RecordStore>,
    flag_update_attempts: u32,
}

impl VitalsIngestion {
    /// An ingestion pathway that tries the patient-flag write once.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            flag_update_attempts: 1,
        }
    }

    pub fn from_config(store: Arc<dyn RecordStore>, cfg: &CoreConfig) -> Self {
        Self::new(store).with_flag_update_attempts(cfg.flag_update_attempts())
    }

    /// Sets how many times the patient-flag write is tried before giving up (minimum 1).
    ///
    /// Retrying is safe because the patch is idempotent.
    pub fn with_flag_update_attempts(mut self, attempts: u32) -> Self {
        self.flag_update_attempts = attempts.max(1);
        self
    }

    /// Ingests one reading.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NonFiniteMeasurement`] before any write if a decimal
    /// measurement is `NaN` or infinite, and [`IngestError::Persistence`] if the reading itself
    /// cannot be stored. A failure to update the patient flag is *not* an error; see
    /// [`Ingested::warning`].
    pub fn ingest(&self, input: VitalsReadingInput) -> IngestResult<Ingested> {
        if let Some(field) = input.vitals.non_finite_field() {
            return Err(IngestError::NonFiniteMeasurement { field });
        }

        let tier = risk::assess(&input.vitals);
        let reading = StoredReading::from_input(input, tier, Utc::now());

        let row = to_row(&reading).map_err(IngestError::Encode)?;
        self.store
            .insert(VITALS_TABLE, row)
            .map_err(IngestError::Persistence)?;

        tracing::info!(
            "stored vitals reading {} for patient {} (tier {})",
            reading.id,
            reading.patient_id,
            tier
        );

        let patient_flag = if tier.is_elevated() {
            self.flag_patient(&reading.patient_id, tier)
        } else {
            PatientFlagUpdate::NotRequired
        };

        Ok(Ingested {
            reading,
            patient_flag,
        })
    }

    fn flag_patient(&self, patient_id: &RecordId, tier: RiskTier) -> PatientFlagUpdate {
        let mut attempt = 1;
        loop {
            match self
                .store
                .update(PATIENTS_TABLE, patient_id, risk_level_patch(tier))
            {
                Ok(_) => return PatientFlagUpdate::Applied,
                Err(error) if attempt >= self.flag_update_attempts => {
                    tracing::warn!(
                        "failed to set risk_level={} on patient {} after {} attempt(s): {}",
                        tier,
                        patient_id,
                        attempt,
                        error
                    );
                    return PatientFlagUpdate::Failed {
                        attempts: attempt,
                        error,
                    };
                }
                Err(error) => {
                    tracing::debug!(
                        "patient {} risk_level update attempt {} failed: {}",
                        patient_id,
                        attempt,
                        error
                    );
                    attempt += 1;
                }
            }
        }
    }
}
