//! Obstetric risk assessment.
//!
//! [`assess`] maps the measurements of a single reading to a [`RiskTier`] with an additive
//! point score over independent signals:
//!
//! | Signal            | Condition                                    | Points |
//! |-------------------|----------------------------------------------|--------|
//! | Blood pressure    | systolic ≥ 160 or diastolic ≥ 110            | 3      |
//! |                   | else systolic ≥ 140 or diastolic ≥ 90        | 2      |
//! |                   | else systolic < 90 or diastolic < 60         | 2      |
//! | Temperature       | ≥ 38.5 °C                                    | 2      |
//! |                   | else ≥ 37.5 °C                               | 1      |
//! | Fetal heart rate  | < 110 or > 160 bpm                           | 2      |
//! | Urine protein     | positive or strong                           | 2      |
//! | Haemoglobin       | < 11 g/dL                                    | 1      |
//!
//! A zero counts as not measured, the way an empty form field is submitted. Blood pressure is
//! only scored when both values are measured. The total is bucketed by
//! [`RiskTier::from_points`]. No single signal reaches `critical` on its own.
//!
//! The assessor only ever sees the current reading. It has no access to a patient's earlier
//! readings, so a worsening trend that stays under every threshold is not flagged.

use crate::vitals::{RiskTier, VitalSigns};
use serde::{Deserialize, Serialize};

const SEVERE_SYSTOLIC: i32 = 160;
const SEVERE_DIASTOLIC: i32 = 110;
const HYPERTENSIVE_SYSTOLIC: i32 = 140;
const HYPERTENSIVE_DIASTOLIC: i32 = 90;
const HYPOTENSIVE_SYSTOLIC: i32 = 90;
const HYPOTENSIVE_DIASTOLIC: i32 = 60;

const HIGH_FEVER_C: f64 = 38.5;
const MILD_FEVER_C: f64 = 37.5;

const FHR_MIN_BPM: i32 = 110;
const FHR_MAX_BPM: i32 = 160;

const ANAEMIA_HB_GDL: f64 = 11.0;

/// A scoring rule that fired for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFinding {
    SevereHypertension,
    Hypertension,
    Hypotension,
    HighFever,
    MildFever,
    AbnormalFetalHeartRate,
    Proteinuria,
    Anaemia,
}

impl RiskFinding {
    pub fn points(self) -> u32 {
        match self {
            RiskFinding::SevereHypertension => 3,
            RiskFinding::Hypertension
            | RiskFinding::Hypotension
            | RiskFinding::HighFever
            | RiskFinding::AbnormalFetalHeartRate
            | RiskFinding::Proteinuria => 2,
            RiskFinding::MildFever | RiskFinding::Anaemia => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskFinding::SevereHypertension => "severe_hypertension",
            RiskFinding::Hypertension => "hypertension",
            RiskFinding::Hypotension => "hypotension",
            RiskFinding::HighFever => "high_fever",
            RiskFinding::MildFever => "mild_fever",
            RiskFinding::AbnormalFetalHeartRate => "abnormal_fetal_heart_rate",
            RiskFinding::Proteinuria => "proteinuria",
            RiskFinding::Anaemia => "anaemia",
        }
    }
}

/// The findings for one reading and their total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    findings: Vec<RiskFinding>,
}

impl RiskScore {
    pub fn findings(&self) -> &[RiskFinding] {
        &self.findings
    }

    pub fn points(&self) -> u32 {
        self.findings.iter().map(|f| f.points()).sum()
    }

    pub fn tier(&self) -> RiskTier {
        RiskTier::from_points(self.points())
    }
}

/// Scores every signal of `vitals`. Absent or zero measurements contribute nothing.
pub fn score(vitals: &VitalSigns) -> RiskScore {
    let findings = [
        blood_pressure_finding(
            measured(vitals.systolic_bp),
            measured(vitals.diastolic_bp),
        ),
        temperature_finding(measured(vitals.temperature_c)),
        measured(vitals.fetal_heart_rate_bpm)
            .filter(|bpm| *bpm < FHR_MIN_BPM || *bpm > FHR_MAX_BPM)
            .map(|_| RiskFinding::AbnormalFetalHeartRate),
        vitals
            .urine_protein
            .filter(|protein| protein.is_proteinuria())
            .map(|_| RiskFinding::Proteinuria),
        measured(vitals.hemoglobin_gdl)
            .filter(|hb| *hb < ANAEMIA_HB_GDL)
            .map(|_| RiskFinding::Anaemia),
    ]
    .into_iter()
    .flatten()
    .collect();

    RiskScore { findings }
}

/// Computes the risk tier for one reading. Total and side-effect free.
pub fn assess(vitals: &VitalSigns) -> RiskTier {
    score(vitals).tier()
}

fn measured<T: Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

fn blood_pressure_finding(systolic: Option<i32>, diastolic: Option<i32>) -> Option<RiskFinding> {
    let (systolic, diastolic) = (systolic?, diastolic?);

    if systolic >= SEVERE_SYSTOLIC || diastolic >= SEVERE_DIASTOLIC {
        Some(RiskFinding::SevereHypertension)
    } else if systolic >= HYPERTENSIVE_SYSTOLIC || diastolic >= HYPERTENSIVE_DIASTOLIC {
        Some(RiskFinding::Hypertension)
    } else if systolic < HYPOTENSIVE_SYSTOLIC || diastolic < HYPOTENSIVE_DIASTOLIC {
        Some(RiskFinding::Hypotension)
    } else {
        None
    }
}

fn temperature_finding(temperature_c: Option<f64>) -> Option<RiskFinding> {
    let temperature_c = temperature_c?;

    if temperature_c >= HIGH_FEVER_C {
        Some(RiskFinding::HighFever)
    } else if temperature_c >= MILD_FEVER_C {
        Some(RiskFinding::MildFever)
    } else {
        None
    }
}
