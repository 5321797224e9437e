//! Vitals data model.
//!
//! A vitals reading is one set of clinical measurements taken at one antenatal visit. Every
//! measurement is optional because not every signal is captured at every visit; only the
//! patient reference and the timestamp are always present.
//!
//! Callers submit a [`VitalsReadingInput`]. The ingestion pathway turns it into a
//! [`StoredReading`] by allocating an id, defaulting `recorded_at` and attaching the computed
//! [`RiskTier`]. Stored readings are immutable.

use chrono::{DateTime, Utc};
use mama_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Returned when a string does not name a known enum variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Ordered severity levels summarising a reading's clinical concern.
///
/// Ordering follows severity, so `RiskTier::Low < RiskTier::Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Medium,
        RiskTier::High,
        RiskTier::Critical,
    ];

    /// Buckets an accumulated score, highest tier first.
    pub fn from_points(points: u32) -> Self {
        match points {
            p if p >= 5 => RiskTier::Critical,
            p if p >= 3 => RiskTier::High,
            p if p >= 1 => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }

    /// True for tiers that must be propagated onto the patient's `risk_level`.
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskTier::High | RiskTier::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "risk tier",
                value: s.to_string(),
            })
    }
}

/// Dipstick result for protein in urine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrineProtein {
    Negative,
    Trace,
    Positive,
    Strong,
}

impl UrineProtein {
    /// `positive` and `strong` count as proteinuria; `trace` does not.
    pub fn is_proteinuria(self) -> bool {
        matches!(self, UrineProtein::Positive | UrineProtein::Strong)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UrineProtein::Negative => "negative",
            UrineProtein::Trace => "trace",
            UrineProtein::Positive => "positive",
            UrineProtein::Strong => "strong",
        }
    }
}

impl fmt::Display for UrineProtein {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrineProtein {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negative" => Ok(UrineProtein::Negative),
            "trace" => Ok(UrineProtein::Trace),
            "positive" => Ok(UrineProtein::Positive),
            "strong" => Ok(UrineProtein::Strong),
            other => Err(UnknownVariant {
                kind: "urine protein",
                value: other.to_string(),
            }),
        }
    }
}

/// The clinical measurements of one reading. This is all the risk assessor sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalSigns {
    /// Systolic blood pressure, mmHg.
    pub systolic_bp: Option<i32>,
    /// Diastolic blood pressure, mmHg.
    pub diastolic_bp: Option<i32>,
    pub weight_kg: Option<f64>,
    pub fetal_heart_rate_bpm: Option<i32>,
    pub temperature_c: Option<f64>,
    pub urine_protein: Option<UrineProtein>,
    /// Haemoglobin, g/dL.
    pub hemoglobin_gdl: Option<f64>,
}

impl VitalSigns {
    /// The first decimal measurement that is `NaN` or infinite, by field name.
    ///
    /// Such values cannot be stored as JSON numbers.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("weight_kg", self.weight_kg),
            ("temperature_c", self.temperature_c),
            ("hemoglobin_gdl", self.hemoglobin_gdl),
        ]
        .into_iter()
        .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
        .map(|(field, _)| field)
    }
}

/// A reading as submitted by a caller.
///
/// There is deliberately no tier field here: any `risk_tier` key in a JSON payload is ignored
/// and the tier is always computed at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsReadingInput {
    pub patient_id: RecordId,
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(flatten)]
    pub vitals: VitalSigns,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recorded_by: Option<String>,
    /// Defaults to the submission time when absent.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl VitalsReadingInput {
    /// A reading for `patient_id` with no measurements.
    pub fn new(patient_id: RecordId) -> Self {
        Self {
            patient_id,
            appointment_id: None,
            vitals: VitalSigns::default(),
            notes: None,
            recorded_by: None,
            recorded_at: None,
        }
    }

    pub fn with_vitals(mut self, vitals: VitalSigns) -> Self {
        self.vitals = vitals;
        self
    }
}

/// A persisted reading, exactly as written to the `vitals` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    pub id: RecordId,
    pub patient_id: RecordId,
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(flatten)]
    pub vitals: VitalSigns,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recorded_by: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub risk_tier: RiskTier,
}

impl StoredReading {
    /// Builds the stored form of `input` with a freshly allocated id.
    pub(crate) fn from_input(
        input: VitalsReadingInput,
        risk_tier: RiskTier,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            patient_id: input.patient_id,
            appointment_id: input.appointment_id,
            vitals: input.vitals,
            notes: input.notes,
            recorded_by: input.recorded_by,
            recorded_at: input.recorded_at.unwrap_or(now),
            risk_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tier_orders_by_severity() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
    }

    #[test]
    fn test_from_points_bucket_edges() {
        assert_eq!(RiskTier::from_points(0), RiskTier::Low);
        assert_eq!(RiskTier::from_points(1), RiskTier::Medium);
        assert_eq!(RiskTier::from_points(2), RiskTier::Medium);
        assert_eq!(RiskTier::from_points(3), RiskTier::High);
        assert_eq!(RiskTier::from_points(4), RiskTier::High);
        assert_eq!(RiskTier::from_points(5), RiskTier::Critical);
        assert_eq!(RiskTier::from_points(12), RiskTier::Critical);
    }

    #[test]
    fn test_only_high_and_critical_are_elevated() {
        assert!(!RiskTier::Low.is_elevated());
        assert!(!RiskTier::Medium.is_elevated());
        assert!(RiskTier::High.is_elevated());
        assert!(RiskTier::Critical.is_elevated());
    }

    #[test]
    fn test_non_finite_field() {
        assert_eq!(VitalSigns::default().non_finite_field(), None);

        let finite = VitalSigns {
            weight_kg: Some(72.5),
            temperature_c: Some(36.8),
            hemoglobin_gdl: Some(0.0),
            ..VitalSigns::default()
        };
        assert_eq!(finite.non_finite_field(), None);

        let fever = VitalSigns {
            temperature_c: Some(f64::NAN),
            hemoglobin_gdl: Some(f64::INFINITY),
            ..VitalSigns::default()
        };
        assert_eq!(fever.non_finite_field(), Some("temperature_c"));
    }

    #[test]
    fn test_enum_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_value(RiskTier::Critical).unwrap(),
            serde_json::json!("critical")
        );
        assert_eq!(
            serde_json::from_value::<UrineProtein>(serde_json::json!("strong")).unwrap(),
            UrineProtein::Strong
        );
        assert_eq!("medium".parse::<RiskTier>().unwrap(), RiskTier::Medium);
        assert!("severe".parse::<RiskTier>().is_err());
        assert!("++".parse::<UrineProtein>().is_err());
    }

    #[test]
    fn test_input_ignores_caller_supplied_tier() {
        let input: VitalsReadingInput = serde_json::from_value(serde_json::json!({
            "patient_id": "550e8400e29b41d4a716446655440000",
            "systolic_bp": 120,
            "diastolic_bp": 80,
            "temperature_c": 37,
            "risk_tier": "critical"
        }))
        .expect("input should deserialize");

        assert_eq!(input.vitals.systolic_bp, Some(120));
        assert_eq!(input.vitals.temperature_c, Some(37.0));
        assert_eq!(input.vitals.urine_protein, None);
        assert_eq!(input.recorded_at, None);
    }

    #[test]
    fn test_input_requires_patient_id() {
        let result = serde_json::from_value::<VitalsReadingInput>(serde_json::json!({
            "systolic_bp": 120
        }));
        assert!(result.is_err(), "patient_id is required");
    }

    #[test]
    fn test_from_input_defaults_recorded_at() {
        let now = Utc::now();
        let input = VitalsReadingInput::new(RecordId::new());
        let stored = StoredReading::from_input(input.clone(), RiskTier::Low, now);

        assert_eq!(stored.recorded_at, now);
        assert_eq!(stored.patient_id, input.patient_id);
        assert_ne!(stored.id, stored.patient_id);
    }
}
