//! Patient and specialty models.

use serde::{Deserialize, Serialize};

use crate::metrics::compute_bmi;

/// A patient record as held in the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// UUID - generated on creation
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Age in whole years
    pub age: u32,
    /// Blood glucose reading, as entered
    pub blood_glucose: Option<String>,
    /// Blood pressure reading, conventionally "systolic/diastolic"
    pub blood_pressure: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    /// Derived from height and weight, see [`Patient::refresh_bmi`]
    pub bmi: Option<f64>,
    /// Denormalized primary specialty name (separate from `specialties`)
    pub primary_specialty: Option<String>,
    /// Comma-separated medication names
    pub medications: Option<String>,
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
    /// Assigned specialties, resolved by the store on fetch
    #[serde(default)]
    pub specialties: Vec<Specialty>,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(first_name: String, last_name: String, age: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            age,
            blood_glucose: None,
            blood_pressure: None,
            height_cm: None,
            weight_kg: None,
            bmi: None,
            primary_specialty: None,
            medications: None,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
            specialties: Vec::new(),
        }
    }

    /// "First Last" for display.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Recompute the BMI from the current height and weight.
    pub fn refresh_bmi(&mut self) {
        self.bmi = compute_bmi(self.weight_kg, self.height_cm);
    }

    /// BMI if present and strictly positive.
    pub fn positive_bmi(&self) -> Option<f64> {
        self.bmi.filter(|bmi| *bmi > 0.0)
    }

    /// Primary specialty, or `None` when absent or blank.
    pub fn primary_specialty_label(&self) -> Option<&str> {
        self.primary_specialty
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Check if the given specialty is linked to this patient.
    pub fn has_specialty(&self, specialty_id: &str) -> bool {
        self.specialties.iter().any(|s| s.id == specialty_id)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// A named medical specialty, unique by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Specialty {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl Specialty {
    /// Create a new specialty; the name is trimmed.
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Join row linking a patient to one assigned specialty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSpecialty {
    pub id: String,
    pub patient_id: String,
    pub specialty_id: String,
    pub created_at: String,
}

impl PatientSpecialty {
    pub fn new(patient_id: &str, specialty_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            specialty_id: specialty_id.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient() {
        let patient = Patient::new("Amina".into(), "Diallo".into(), 42);
        assert_eq!(patient.full_name(), "Amina Diallo");
        assert_eq!(patient.age, 42);
        assert!(patient.bmi.is_none());
        assert_eq!(patient.id.len(), 36); // UUID format
    }

    #[test]
    fn test_refresh_bmi() {
        let mut patient = Patient::new("Amina".into(), "Diallo".into(), 42);
        patient.height_cm = Some(170.0);
        patient.weight_kg = Some(70.0);
        patient.refresh_bmi();
        assert_eq!(patient.bmi, Some(24.22));

        patient.weight_kg = None;
        patient.refresh_bmi();
        assert!(patient.bmi.is_none());
    }

    #[test]
    fn test_primary_specialty_label() {
        let mut patient = Patient::new("Amina".into(), "Diallo".into(), 42);
        assert_eq!(patient.primary_specialty_label(), None);

        patient.primary_specialty = Some("   ".into());
        assert_eq!(patient.primary_specialty_label(), None);

        patient.primary_specialty = Some(" Cardiologie ".into());
        assert_eq!(patient.primary_specialty_label(), Some("Cardiologie"));
    }

    #[test]
    fn test_specialty_name_trimmed() {
        let specialty = Specialty::new("  Pédiatrie ");
        assert_eq!(specialty.name, "Pédiatrie");
    }
}
