//! Read paths over stored vitals readings.

use crate::constants::{PATIENT_ID_COLUMN, RECORDED_AT_COLUMN, RISK_TIER_COLUMN, VITALS_TABLE};
use crate::error::CoreResult;
use crate::store::{Order, Query, RecordStore, Row};
use crate::vitals::{RiskTier, StoredReading};
use mama_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reading counts by tier, grouped the way the vitals dashboard shows them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// `high` and `critical` readings.
    pub high: usize,
    pub medium: usize,
    /// `low` readings.
    pub normal: usize,
}

impl RiskSummary {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.normal
    }

    fn count(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::High | RiskTier::Critical => self.high += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::Low => self.normal += 1,
        }
    }
}

/// Queries over the `vitals` table. Every list is newest `recorded_at` first.
#[derive(Clone)]
pub struct VitalsHistory {
    store: Arc<dyn RecordStore>,
}

impl VitalsHistory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Every stored reading.
    pub fn all(&self) -> CoreResult<Vec<StoredReading>> {
        self.select(Query::all())
    }

    /// Readings for one patient.
    pub fn for_patient(&self, patient_id: &RecordId) -> CoreResult<Vec<StoredReading>> {
        self.select(Query::all().eq(PATIENT_ID_COLUMN, patient_id.to_string()))
    }

    /// Readings assessed `high` or `critical`.
    pub fn high_risk(&self) -> CoreResult<Vec<StoredReading>> {
        let elevated = RiskTier::ALL
            .into_iter()
            .filter(|tier| tier.is_elevated())
            .map(|tier| tier.as_str());
        self.select(Query::all().any_of(RISK_TIER_COLUMN, elevated))
    }

    /// Counts of all readings by tier group.
    pub fn summary(&self) -> CoreResult<RiskSummary> {
        let mut summary = RiskSummary::default();
        for reading in self.all()? {
            summary.count(reading.risk_tier);
        }
        Ok(summary)
    }

    fn select(&self, query: Query) -> CoreResult<Vec<StoredReading>> {
        let query = query.order_by(RECORDED_AT_COLUMN, Order::Descending);
        let rows = self.store.select(VITALS_TABLE, &query)?;
        Ok(rows.into_iter().filter_map(decode_reading).collect())
    }
}

/// Rows that do not decode are logged and skipped so one bad row cannot hide the rest of a
/// patient's history.
fn decode_reading(row: Row) -> Option<StoredReading> {
    match serde_json::from_value(serde_json::Value::Object(row)) {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::warn!("skipping undecodable vitals row: {}", e);
            None
        }
    }
}
