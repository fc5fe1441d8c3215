//! Dashboard statistics over a patient snapshot.
//!
//! Every function here is pure and recomputes from the full snapshot it is
//! given. Callers re-run them whenever the record store reports a change;
//! nothing is cached between calls.

mod aggregation;
mod alerts;

pub use aggregation::*;
pub use alerts::*;

use serde::{Deserialize, Serialize};

use crate::models::{Patient, Specialty};

/// Everything the dashboard displays, computed in one pass over a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct DashboardSummary {
    pub total_patients: u32,
    /// Size of the specialty catalogue (not the number in use)
    pub total_specialties: u32,
    pub averages: Averages,
    pub by_specialty: Vec<SpecialtyShare>,
    pub by_age_band: Vec<AgeBandCount>,
    pub by_bmi_band: Vec<BmiBandCount>,
    pub top_medications: Vec<MedicationCount>,
    pub alerts: Alerts,
}

impl DashboardSummary {
    pub fn compute(patients: &[Patient], specialties: &[Specialty], top_n: usize) -> Self {
        Self {
            total_patients: patients.len() as u32,
            total_specialties: specialties.len() as u32,
            averages: compute_averages(patients),
            by_specialty: summarize_by_specialty(patients),
            by_age_band: summarize_by_age_band(patients),
            by_bmi_band: summarize_by_bmi_band(patients),
            top_medications: top_medications(patients, top_n),
            alerts: compute_alerts(patients),
        }
    }

    /// Serialize to pretty JSON for download.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
