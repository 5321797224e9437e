//! Patient rows.
//!
//! Registration screens live outside this crate. What lives here is the shape of a patient
//! row, the minimal insert needed to create one, and the `risk_level` patch written by the
//! ingestion pathway.

use crate::constants::{ID_COLUMN, PATIENTS_TABLE, RISK_LEVEL_COLUMN};
use crate::error::{CoreError, CoreResult};
use crate::store::{to_row, Query, RecordStore, Row};
use crate::vitals::RiskTier;
use chrono::{DateTime, Utc};
use mama_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A row of the `patients` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    /// Current risk level. Raised to `high`/`critical` by vitals ingestion; never lowered by
    /// it.
    pub risk_level: RiskTier,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The patch applied to a patient row when a reading reaches `tier`.
pub(crate) fn risk_level_patch(tier: RiskTier) -> Row {
    let mut patch = Row::new();
    patch.insert(
        RISK_LEVEL_COLUMN.into(),
        serde_json::Value::String(tier.as_str().into()),
    );
    patch
}

/// Patient operations over a [`RecordStore`].
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn RecordStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Inserts a new active patient with `risk_level = low`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either name is blank, or
    /// [`CoreError::Store`] if the insert fails.
    pub fn register(&self, first_name: &str, last_name: &str) -> CoreResult<Patient> {
        let (first_name, last_name) = (first_name.trim(), last_name.trim());
        if first_name.is_empty() || last_name.is_empty() {
            return Err(CoreError::InvalidInput(
                "first_name and last_name are required".into(),
            ));
        }

        let patient = Patient {
            id: RecordId::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            risk_level: RiskTier::Low,
            is_active: true,
            created_at: Utc::now(),
        };
        let row = to_row(&patient).map_err(|source| CoreError::Encode {
            table: PATIENTS_TABLE,
            source,
        })?;
        self.store.insert(PATIENTS_TABLE, row)?;

        tracing::info!("registered patient {}", patient.id);
        Ok(patient)
    }

    /// Reads one patient row, if present.
    pub fn get(&self, id: &RecordId) -> CoreResult<Option<Patient>> {
        let query = Query::all().eq(ID_COLUMN, id.to_string());
        let rows = self.store.select(PATIENTS_TABLE, &query)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        serde_json::from_value(serde_json::Value::Object(row))
            .map(Some)
            .map_err(|source| CoreError::Decode {
                table: PATIENTS_TABLE,
                source,
            })
    }
}
