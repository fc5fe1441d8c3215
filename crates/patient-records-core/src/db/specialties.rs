//! Specialty catalogue and patient assignment operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{constraint_error, Database, DbError, DbResult};
use crate::changes::{ChangeAction, ChangeKind};
use crate::models::{PatientSpecialty, Specialty};

fn specialty_from_row(row: &Row<'_>) -> rusqlite::Result<Specialty> {
    Ok(Specialty {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn insert_link(conn: &Connection, link: &PatientSpecialty) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO patient_specialties (id, patient_id, specialty_id, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![link.id, link.patient_id, link.specialty_id, link.created_at],
    )
    .map_err(|e| {
        constraint_error(e, || {
            format!(
                "cannot assign specialty {} to patient {}: already assigned or unknown",
                link.specialty_id, link.patient_id
            )
        })
    })?;
    Ok(())
}

impl Database {
    /// Add a specialty to the catalogue. The name is trimmed and must be unique.
    pub fn insert_specialty(&self, name: &str) -> DbResult<Specialty> {
        let specialty = Specialty::new(name);
        if specialty.name.is_empty() {
            return Err(DbError::Constraint("specialty name must not be blank".into()));
        }

        self.conn
            .execute(
                "INSERT INTO specialties (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![specialty.id, specialty.name, specialty.created_at],
            )
            .map_err(|e| {
                constraint_error(e, || format!("specialty already exists: {}", specialty.name))
            })?;

        tracing::info!(specialty = %specialty.name, "inserted specialty");
        self.notify(ChangeKind::Specialties, ChangeAction::Inserted, Some(&specialty.id));
        Ok(specialty)
    }

    pub fn get_specialty(&self, id: &str) -> DbResult<Option<Specialty>> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM specialties WHERE id = ?",
                [id],
                specialty_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List the catalogue, ordered by name.
    pub fn list_specialties(&self) -> DbResult<Vec<Specialty>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM specialties ORDER BY name")?;
        let rows = stmt.query_map([], specialty_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Remove a specialty from the catalogue, unassigning it from every patient.
    pub fn delete_specialty(&self, id: &str) -> DbResult<bool> {
        let linked: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM patient_specialties WHERE specialty_id = ?",
            [id],
            |row| row.get(0),
        )?;
        let rows_affected = self.conn.execute("DELETE FROM specialties WHERE id = ?", [id])?;
        if rows_affected == 0 {
            return Ok(false);
        }

        tracing::info!(specialty_id = %id, unassigned = linked, "deleted specialty");
        self.notify(ChangeKind::Specialties, ChangeAction::Deleted, Some(id));
        if linked > 0 {
            self.notify(ChangeKind::Patients, ChangeAction::Updated, None);
        }
        Ok(true)
    }

    /// Assign one specialty to a patient.
    pub fn attach_specialty(&self, patient_id: &str, specialty_id: &str) -> DbResult<PatientSpecialty> {
        let link = PatientSpecialty::new(patient_id, specialty_id);
        insert_link(&self.conn, &link)?;

        tracing::debug!(patient_id, specialty_id, "assigned specialty");
        self.notify(ChangeKind::Patients, ChangeAction::Updated, Some(patient_id));
        Ok(link)
    }

    /// Assign several specialties to a patient. Either all are assigned or none.
    pub fn attach_specialties(
        &mut self,
        patient_id: &str,
        specialty_ids: &[String],
    ) -> DbResult<Vec<PatientSpecialty>> {
        if specialty_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tx = self.transaction()?;
        let mut links = Vec::with_capacity(specialty_ids.len());
        for specialty_id in specialty_ids {
            let link = PatientSpecialty::new(patient_id, specialty_id);
            insert_link(&tx, &link)?;
            links.push(link);
        }
        tx.commit()?;

        tracing::debug!(patient_id, count = links.len(), "assigned specialties");
        self.notify(ChangeKind::Patients, ChangeAction::Updated, Some(patient_id));
        Ok(links)
    }

    /// Unassign a specialty from a patient. Returns `false` if it was not assigned.
    pub fn detach_specialty(&self, patient_id: &str, specialty_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM patient_specialties WHERE patient_id = ?1 AND specialty_id = ?2",
            params![patient_id, specialty_id],
        )?;
        if rows_affected > 0 {
            tracing::debug!(patient_id, specialty_id, "unassigned specialty");
            self.notify(ChangeKind::Patients, ChangeAction::Updated, Some(patient_id));
        }
        Ok(rows_affected > 0)
    }

    /// Specialties assigned to a patient, ordered by name.
    pub fn specialties_for_patient(&self, patient_id: &str) -> DbResult<Vec<Specialty>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.name, s.created_at
            FROM patient_specialties ps
            JOIN specialties s ON s.id = ps.specialty_id
            WHERE ps.patient_id = ?
            ORDER BY s.name
            "#,
        )?;
        let rows = stmt.query_map([patient_id], specialty_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
