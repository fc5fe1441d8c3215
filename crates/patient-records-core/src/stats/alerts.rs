//! Dashboard alert counters and averages.

use serde::{Deserialize, Serialize};

use crate::metrics::round_to;
use crate::models::Patient;

/// Patients strictly above this BMI count as obese for alerting.
pub const OBESITY_ALERT_BMI: f64 = 30.0;

/// Patients strictly older than this count as elderly for alerting.
pub const ELDERLY_ALERT_AGE: u32 = 65;

/// Counters behind the dashboard's alert panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct Alerts {
    pub obesity_count: u32,
    pub elderly_count: u32,
    pub unassigned_specialty_count: u32,
}

impl Alerts {
    pub fn is_empty(&self) -> bool {
        self.obesity_count == 0 && self.elderly_count == 0 && self.unassigned_specialty_count == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct Averages {
    /// Rounded mean age, 0 for an empty snapshot
    pub average_age: u32,
    /// Mean over positive BMIs, 1 decimal; `None` when no patient has one
    pub average_bmi: Option<f64>,
    /// `average_bmi` formatted to 1 decimal, or "0" when absent
    pub average_bmi_label: String,
}

pub fn compute_alerts(patients: &[Patient]) -> Alerts {
    let mut alerts = Alerts::default();
    for patient in patients {
        if patient.bmi.is_some_and(|bmi| bmi > OBESITY_ALERT_BMI) {
            alerts.obesity_count += 1;
        }
        if patient.age > ELDERLY_ALERT_AGE {
            alerts.elderly_count += 1;
        }
        if patient.primary_specialty_label().is_none() {
            alerts.unassigned_specialty_count += 1;
        }
    }
    alerts
}

pub fn compute_averages(patients: &[Patient]) -> Averages {
    let average_age = if patients.is_empty() {
        0
    } else {
        let total: u64 = patients.iter().map(|p| u64::from(p.age)).sum();
        (total as f64 / patients.len() as f64).round() as u32
    };

    let bmis: Vec<f64> = patients.iter().filter_map(Patient::positive_bmi).collect();
    let average_bmi = if bmis.is_empty() {
        None
    } else {
        Some(round_to(bmis.iter().sum::<f64>() / bmis.len() as f64, 1))
    };

    Averages {
        average_age,
        average_bmi,
        average_bmi_label: average_bmi
            .map(|bmi| format!("{bmi:.1}"))
            .unwrap_or_else(|| "0".to_string()),
    }
}
