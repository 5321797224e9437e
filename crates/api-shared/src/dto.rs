//! Request and response bodies for the REST API.
//!
//! These types mirror the core domain types with wire-friendly fields: identifiers,
//! enums and timestamps travel as strings and are parsed when converted into core types.

use chrono::{DateTime, Utc};
use mobimama_core::{
    Ingested, Patient, PatientFlagUpdate, RecordId, RiskScore, RiskSummary, StoredReading,
    UrineProtein, VitalSigns, VitalsReadingInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A request body that could not be converted into a core type.
#[derive(Debug, thiserror::Error)]
pub enum DtoError {
    #[error("invalid patient_id: {0}")]
    PatientId(String),
    #[error("invalid urine_protein: {0}")]
    UrineProtein(String),
    #[error("invalid recorded_at: {0}")]
    RecordedAt(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Clinical measurements. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AssessVitalsReq {
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub weight_kg: Option<f64>,
    pub fetal_heart_rate_bpm: Option<i32>,
    pub temperature_c: Option<f64>,
    /// One of `negative`, `trace`, `positive`, `strong`.
    pub urine_protein: Option<String>,
    pub hemoglobin_gdl: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessVitalsRes {
    pub risk_tier: String,
    pub points: u32,
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordVitalsReq {
    pub patient_id: String,
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub systolic_bp: Option<i32>,
    #[serde(default)]
    pub diastolic_bp: Option<i32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub fetal_heart_rate_bpm: Option<i32>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub urine_protein: Option<String>,
    #[serde(default)]
    pub hemoglobin_gdl: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recorded_by: Option<String>,
    /// RFC 3339 timestamp. Defaults to the time of submission.
    #[serde(default)]
    pub recorded_at: Option<String>,
}

/// A stored reading as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VitalsRecord {
    pub id: String,
    pub patient_id: String,
    pub appointment_id: Option<String>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub weight_kg: Option<f64>,
    pub fetal_heart_rate_bpm: Option<i32>,
    pub temperature_c: Option<f64>,
    pub urine_protein: Option<String>,
    pub hemoglobin_gdl: Option<f64>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
    pub recorded_at: String,
    pub risk_tier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordVitalsRes {
    pub reading: VitalsRecord,
    /// `not_required`, `applied` or `failed`.
    pub patient_flag: String,
    /// Present when the patient risk-level update failed.
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListVitalsRes {
    pub readings: Vec<VitalsRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RiskSummaryRes {
    /// Readings assessed `high` or `critical`.
    pub high: usize,
    pub medium: usize,
    /// Readings assessed `low`.
    pub normal: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub risk_level: String,
    pub is_active: bool,
    pub created_at: String,
}

fn parse_urine_protein(value: Option<String>) -> Result<Option<UrineProtein>, DtoError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            v.trim()
                .parse::<UrineProtein>()
                .map_err(|e| DtoError::UrineProtein(e.to_string()))
        })
        .transpose()
}

impl TryFrom<AssessVitalsReq> for VitalSigns {
    type Error = DtoError;

    fn try_from(req: AssessVitalsReq) -> Result<Self, Self::Error> {
        Ok(VitalSigns {
            systolic_bp: req.systolic_bp,
            diastolic_bp: req.diastolic_bp,
            weight_kg: req.weight_kg,
            fetal_heart_rate_bpm: req.fetal_heart_rate_bpm,
            temperature_c: req.temperature_c,
            urine_protein: parse_urine_protein(req.urine_protein)?,
            hemoglobin_gdl: req.hemoglobin_gdl,
        })
    }
}

impl TryFrom<RecordVitalsReq> for VitalsReadingInput {
    type Error = DtoError;

    fn try_from(req: RecordVitalsReq) -> Result<Self, Self::Error> {
        let patient_id =
            RecordId::parse(req.patient_id.trim()).map_err(|e| DtoError::PatientId(e.to_string()))?;

        let recorded_at = req
            .recorded_at
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                DateTime::parse_from_rfc3339(v.trim())
                    .map(|ts| ts.with_timezone(&Utc))
                    .map_err(|e| DtoError::RecordedAt(e.to_string()))
            })
            .transpose()?;

        Ok(VitalsReadingInput {
            patient_id,
            appointment_id: req.appointment_id,
            vitals: VitalSigns {
                systolic_bp: req.systolic_bp,
                diastolic_bp: req.diastolic_bp,
                weight_kg: req.weight_kg,
                fetal_heart_rate_bpm: req.fetal_heart_rate_bpm,
                temperature_c: req.temperature_c,
                urine_protein: parse_urine_protein(req.urine_protein)?,
                hemoglobin_gdl: req.hemoglobin_gdl,
            },
            notes: req.notes,
            recorded_by: req.recorded_by,
            recorded_at,
        })
    }
}

impl From<RiskScore> for AssessVitalsRes {
    fn from(score: RiskScore) -> Self {
        Self {
            risk_tier: score.tier().to_string(),
            points: score.points(),
            findings: score
                .findings()
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        }
    }
}

impl From<StoredReading> for VitalsRecord {
    fn from(reading: StoredReading) -> Self {
        Self {
            id: reading.id.to_string(),
            patient_id: reading.patient_id.to_string(),
            appointment_id: reading.appointment_id,
            systolic_bp: reading.vitals.systolic_bp,
            diastolic_bp: reading.vitals.diastolic_bp,
            weight_kg: reading.vitals.weight_kg,
            fetal_heart_rate_bpm: reading.vitals.fetal_heart_rate_bpm,
            temperature_c: reading.vitals.temperature_c,
            urine_protein: reading.vitals.urine_protein.map(|p| p.to_string()),
            hemoglobin_gdl: reading.vitals.hemoglobin_gdl,
            notes: reading.notes,
            recorded_by: reading.recorded_by,
            recorded_at: reading.recorded_at.to_rfc3339(),
            risk_tier: reading.risk_tier.to_string(),
        }
    }
}

impl From<Ingested> for RecordVitalsRes {
    fn from(ingested: Ingested) -> Self {
        let (patient_flag, warning) = match &ingested.patient_flag {
            PatientFlagUpdate::NotRequired => ("not_required", None),
            PatientFlagUpdate::Applied => ("applied", None),
            PatientFlagUpdate::Failed { error, .. } => ("failed", Some(error.to_string())),
        };

        Self {
            reading: ingested.reading.into(),
            patient_flag: patient_flag.to_string(),
            warning,
        }
    }
}

impl From<Vec<StoredReading>> for ListVitalsRes {
    fn from(readings: Vec<StoredReading>) -> Self {
        Self {
            readings: readings.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RiskSummary> for RiskSummaryRes {
    fn from(summary: RiskSummary) -> Self {
        Self {
            high: summary.high,
            medium: summary.medium,
            normal: summary.normal,
            total: summary.total(),
        }
    }
}

impl From<Patient> for PatientRecord {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            first_name: patient.first_name,
            last_name: patient.last_name,
            risk_level: patient.risk_level.to_string(),
            is_active: patient.is_active,
            created_at: patient.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobimama_core::RiskTier;

    fn record_req(patient_id: &str) -> RecordVitalsReq {
        serde_json::from_value(serde_json::json!({ "patient_id": patient_id }))
            .expect("minimal request should deserialize")
    }

    #[test]
    fn test_assess_req_parses_urine_protein() {
        let req = AssessVitalsReq {
            urine_protein: Some("strong".into()),
            hemoglobin_gdl: Some(9.5),
            ..AssessVitalsReq::default()
        };
        let vitals = VitalSigns::try_from(req).expect("conversion should work");

        assert_eq!(vitals.urine_protein, Some(UrineProtein::Strong));
        assert_eq!(mobimama_core::assess(&vitals), RiskTier::High);
    }

    #[test]
    fn test_blank_urine_protein_is_absent() {
        let req = AssessVitalsReq {
            urine_protein: Some("  ".into()),
            ..AssessVitalsReq::default()
        };
        assert_eq!(VitalSigns::try_from(req).unwrap().urine_protein, None);
    }

    #[test]
    fn test_unknown_urine_protein_is_rejected() {
        let req = AssessVitalsReq {
            urine_protein: Some("+++".into()),
            ..AssessVitalsReq::default()
        };
        assert!(matches!(
            VitalSigns::try_from(req),
            Err(DtoError::UrineProtein(_))
        ));
    }

    #[test]
    fn test_record_req_requires_canonical_patient_id() {
        let err = VitalsReadingInput::try_from(record_req("p1")).expect_err("should fail");
        assert!(matches!(err, DtoError::PatientId(_)));

        let ok = VitalsReadingInput::try_from(record_req("550e8400e29b41d4a716446655440000"))
            .expect("canonical id should convert");
        assert_eq!(ok.recorded_at, None);
    }

    #[test]
    fn test_record_req_parses_recorded_at() {
        let mut req = record_req("550e8400e29b41d4a716446655440000");
        req.recorded_at = Some("2026-10-18T10:30:00+01:00".into());
        let input = VitalsReadingInput::try_from(req).unwrap();
        assert_eq!(
            input.recorded_at.unwrap().to_rfc3339(),
            "2026-10-18T09:30:00+00:00"
        );

        let mut bad = record_req("550e8400e29b41d4a716446655440000");
        bad.recorded_at = Some("yesterday".into());
        assert!(matches!(
            VitalsReadingInput::try_from(bad),
            Err(DtoError::RecordedAt(_))
        ));
    }

    #[test]
    fn test_risk_score_to_response() {
        let vitals = VitalSigns {
            systolic_bp: Some(170),
            diastolic_bp: Some(120),
            temperature_c: Some(39.0),
            ..VitalSigns::default()
        };
        let res = AssessVitalsRes::from(mobimama_core::score(&vitals));

        assert_eq!(res.risk_tier, "critical");
        assert_eq!(res.points, 5);
        assert_eq!(res.findings, vec!["severe_hypertension", "high_fever"]);
    }

    #[test]
    fn test_summary_response_includes_total() {
        let res = RiskSummaryRes::from(RiskSummary {
            high: 2,
            medium: 3,
            normal: 5,
        });
        assert_eq!(res.total, 10);
    }
}
