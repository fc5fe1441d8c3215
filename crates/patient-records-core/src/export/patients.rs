//! Patient roster export.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::metrics::{AgeBand, BmiBand};
use crate::models::Patient;

/// One roster row per patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterRow {
    pub patient_id: String,
    pub last_name: String,
    pub first_name: String,
    pub age: u32,
    pub age_band: String,
    pub bmi: Option<f64>,
    /// Absent when the patient has no usable BMI
    pub bmi_band: Option<String>,
    pub blood_pressure: Option<String>,
    pub blood_glucose: Option<String>,
    pub primary_specialty: Option<String>,
    /// Names of assigned specialties
    pub specialties: Vec<String>,
    pub medications: Option<String>,
}

impl RosterRow {
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            patient_id: patient.id.clone(),
            last_name: patient.last_name.clone(),
            first_name: patient.first_name.clone(),
            age: patient.age,
            age_band: AgeBand::classify(patient.age).label().to_string(),
            bmi: patient.bmi,
            bmi_band: patient
                .positive_bmi()
                .and_then(BmiBand::classify)
                .map(|band| band.label().to_string()),
            blood_pressure: patient.blood_pressure.clone(),
            blood_glucose: patient.blood_glucose.clone(),
            primary_specialty: patient.primary_specialty_label().map(str::to_string),
            specialties: patient.specialties.iter().map(|s| s.name.clone()).collect(),
            medications: patient.medications.clone(),
        }
    }
}

/// Patient roster export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRosterExport {
    /// Export timestamp
    pub exported_at: String,
    pub patients: Vec<RosterRow>,
}

impl PatientRosterExport {
    /// Build a roster in the order `patients` is given.
    pub fn from_patients(patients: &[Patient]) -> Self {
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            patients: patients.iter().map(RosterRow::from_patient).collect(),
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("patient_id,last_name,first_name,age,age_band,bmi,bmi_band,blood_pressure,blood_glucose,primary_specialty,specialties,medications\n");

        for row in &self.patients {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&row.patient_id),
                escape_csv(&row.last_name),
                escape_csv(&row.first_name),
                row.age,
                escape_csv(&row.age_band),
                row.bmi.map(|b| b.to_string()).unwrap_or_default(),
                row.bmi_band.as_deref().unwrap_or(""),
                escape_csv(row.blood_pressure.as_deref().unwrap_or("")),
                escape_csv(row.blood_glucose.as_deref().unwrap_or("")),
                escape_csv(row.primary_specialty.as_deref().unwrap_or("")),
                escape_csv(&row.specialties.join("; ")),
                escape_csv(row.medications.as_deref().unwrap_or("")),
            ));
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Specialty;

    fn make_patient() -> Patient {
        let mut patient = Patient::new("Awa".into(), "Traoré".into(), 67);
        patient.height_cm = Some(160.0);
        patient.weight_kg = Some(80.0);
        patient.refresh_bmi();
        patient.medications = Some("Metformine, Amlodipine".into());
        patient.specialties = vec![Specialty::new("Cardiologie"), Specialty::new("Endocrinologie")];
        patient
    }

    #[test]
    fn test_roster_row() {
        let row = RosterRow::from_patient(&make_patient());
        assert_eq!(row.age_band, "65+");
        assert_eq!(row.bmi, Some(31.25));
        assert_eq!(row.bmi_band.as_deref(), Some("Obese"));
        assert_eq!(row.specialties, vec!["Cardiologie", "Endocrinologie"]);
    }

    #[test]
    fn test_roster_without_bmi() {
        let patient = Patient::new("Ali".into(), "Ba".into(), 10);
        let row = RosterRow::from_patient(&patient);
        assert!(row.bmi_band.is_none());
        assert_eq!(row.age_band, "0-17");
    }

    #[test]
    fn test_roster_csv() {
        let export = PatientRosterExport::from_patients(&[make_patient()]);
        let csv = export.to_csv();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("patient_id,"));
        assert!(lines[1].contains("Traoré,Awa,67,65+,31.25,Obese"));
        assert!(lines[1].contains("Cardiologie; Endocrinologie"));
        // Comma-separated medications are quoted
        assert!(lines[1].ends_with("\"Metformine, Amlodipine\""));
    }

    #[test]
    fn test_roster_json() {
        let export = PatientRosterExport::from_patients(&[make_patient()]);
        let json = export.to_json().unwrap();
        assert!(json.contains("\"bmi_band\": \"Obese\""));
        assert!(json.contains("\"exported_at\""));
    }
}
