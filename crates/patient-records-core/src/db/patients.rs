//! Patient database operations.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension, Row};

use super::{constraint_error, Database, DbResult};
use crate::changes::{ChangeAction, ChangeKind};
use crate::metrics::compute_bmi;
use crate::models::{Patient, Specialty};

const PATIENT_COLUMNS: &str = r#"
    id, first_name, last_name, age, blood_glucose, blood_pressure,
    height_cm, weight_kg, bmi, primary_specialty, medications, notes,
    created_at, updated_at
"#;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        age: row.get(3)?,
        blood_glucose: row.get(4)?,
        blood_pressure: row.get(5)?,
        height_cm: row.get(6)?,
        weight_kg: row.get(7)?,
        bmi: row.get(8)?,
        primary_specialty: row.get(9)?,
        medications: row.get(10)?,
        notes: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        specialties: Vec::new(),
    })
}

impl Database {
    /// Insert a new patient.
    ///
    /// The stored BMI is recomputed from height and weight; `patient.bmi` is ignored.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let bmi = compute_bmi(patient.weight_kg, patient.height_cm);
        self.conn
            .execute(
                r#"
                INSERT INTO patients (
                    id, first_name, last_name, age, blood_glucose, blood_pressure,
                    height_cm, weight_kg, bmi, primary_specialty, medications, notes,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    patient.id,
                    patient.first_name,
                    patient.last_name,
                    patient.age,
                    patient.blood_glucose,
                    patient.blood_pressure,
                    patient.height_cm,
                    patient.weight_kg,
                    bmi,
                    patient.primary_specialty,
                    patient.medications,
                    patient.notes,
                    patient.created_at,
                    patient.updated_at,
                ],
            )
            .map_err(|e| constraint_error(e, || format!("cannot insert patient {}", patient.id)))?;

        tracing::info!(patient_id = %patient.id, "inserted patient");
        self.notify(ChangeKind::Patients, ChangeAction::Inserted, Some(&patient.id));
        Ok(())
    }

    /// Update an existing patient. Returns `false` if no such patient exists.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let bmi = compute_bmi(patient.weight_kg, patient.height_cm);
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE patients SET
                    first_name = ?2,
                    last_name = ?3,
                    age = ?4,
                    blood_glucose = ?5,
                    blood_pressure = ?6,
                    height_cm = ?7,
                    weight_kg = ?8,
                    bmi = ?9,
                    primary_specialty = ?10,
                    medications = ?11,
                    notes = ?12,
                    updated_at = ?13
                WHERE id = ?1
                "#,
                params![
                    patient.id,
                    patient.first_name,
                    patient.last_name,
                    patient.age,
                    patient.blood_glucose,
                    patient.blood_pressure,
                    patient.height_cm,
                    patient.weight_kg,
                    bmi,
                    patient.primary_specialty,
                    patient.medications,
                    patient.notes,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| constraint_error(e, || format!("cannot update patient {}", patient.id)))?;

        if rows_affected > 0 {
            tracing::debug!(patient_id = %patient.id, "updated patient");
            self.notify(ChangeKind::Patients, ChangeAction::Updated, Some(&patient.id));
        }
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID, with assigned specialties resolved.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        let patient = self
            .conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                patient_from_row,
            )
            .optional()?;

        match patient {
            Some(mut patient) => {
                patient.specialties = self.specialties_for_patient(&patient.id)?;
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }

    /// List all patients, newest first, with assigned specialties resolved.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], patient_from_row)?;
        let mut patients = rows.collect::<Result<Vec<_>, _>>()?;

        let mut assigned = self.specialty_assignments()?;
        for patient in &mut patients {
            patient.specialties = assigned.remove(&patient.id).unwrap_or_default();
        }
        Ok(patients)
    }

    /// Delete a patient and its specialty links.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(patient_id = %id, "deleted patient");
            self.notify(ChangeKind::Patients, ChangeAction::Deleted, Some(id));
        }
        Ok(rows_affected > 0)
    }

    /// Every patient's assigned specialties, keyed by patient ID, sorted by name.
    fn specialty_assignments(&self) -> DbResult<HashMap<String, Vec<Specialty>>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT ps.patient_id, s.id, s.name, s.created_at
            FROM patient_specialties ps
            JOIN specialties s ON s.id = ps.specialty_id
            ORDER BY s.name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                Specialty {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                },
            ))
        })?;

        let mut assigned: HashMap<String, Vec<Specialty>> = HashMap::new();
        for row in rows {
            let (patient_id, specialty) = row?;
            assigned.entry(patient_id).or_default().push(specialty);
        }
        Ok(assigned)
    }
}
