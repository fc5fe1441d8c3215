//! Medication family and inventory operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{constraint_error, Database, DbError, DbResult};
use crate::changes::{ChangeAction, ChangeKind};
use crate::inventory::{apply_dispensation, PrescriptionOutcome};
use crate::models::{Medication, MedicationFamily, PrescriptionLine};

const MEDICATION_SELECT: &str = r#"
    SELECT m.id, m.name, m.family_id, m.dosage, m.form, m.stock, m.min_stock,
           m.unit_price, m.description, m.created_at, m.updated_at,
           f.id, f.name, f.description, f.created_at
    FROM medications m
    LEFT JOIN medication_families f ON f.id = m.family_id
"#;

fn family_from_row(row: &Row<'_>) -> rusqlite::Result<MedicationFamily> {
    Ok(MedicationFamily {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
    let family = match row.get::<_, Option<String>>(11)? {
        Some(id) => Some(MedicationFamily {
            id,
            name: row.get(12)?,
            description: row.get(13)?,
            created_at: row.get(14)?,
        }),
        None => None,
    };

    Ok(Medication {
        id: row.get(0)?,
        name: row.get(1)?,
        family_id: row.get(2)?,
        dosage: row.get(3)?,
        form: row.get(4)?,
        stock: row.get(5)?,
        min_stock: row.get(6)?,
        unit_price: row.get(7)?,
        description: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        family,
    })
}

fn read_medication(conn: &Connection, id: &str) -> DbResult<Option<Medication>> {
    conn.query_row(
        &format!("{MEDICATION_SELECT} WHERE m.id = ?"),
        [id],
        medication_from_row,
    )
    .optional()
    .map_err(Into::into)
}

impl Database {
    // ========================================================================
    // Families
    // ========================================================================

    /// Add a medication family. The name is trimmed and must be unique.
    pub fn insert_medication_family(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<MedicationFamily> {
        let family = MedicationFamily::new(name, description);
        if family.name.is_empty() {
            return Err(DbError::Constraint("family name must not be blank".into()));
        }

        self.conn
            .execute(
                r#"
                INSERT INTO medication_families (id, name, description, created_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![family.id, family.name, family.description, family.created_at],
            )
            .map_err(|e| {
                constraint_error(e, || format!("medication family already exists: {}", family.name))
            })?;

        tracing::info!(family = %family.name, "inserted medication family");
        self.notify(ChangeKind::MedicationFamilies, ChangeAction::Inserted, Some(&family.id));
        Ok(family)
    }

    pub fn get_medication_family(&self, id: &str) -> DbResult<Option<MedicationFamily>> {
        self.conn
            .query_row(
                "SELECT id, name, description, created_at FROM medication_families WHERE id = ?",
                [id],
                family_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List families, ordered by name.
    pub fn list_medication_families(&self) -> DbResult<Vec<MedicationFamily>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM medication_families ORDER BY name",
        )?;
        let rows = stmt.query_map([], family_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ========================================================================
    // Medications
    // ========================================================================

    /// Insert a new medication. Its family must exist.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO medications (
                    id, name, family_id, dosage, form, stock, min_stock,
                    unit_price, description, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    medication.id,
                    medication.name,
                    medication.family_id,
                    medication.dosage,
                    medication.form,
                    medication.stock,
                    medication.min_stock,
                    medication.unit_price,
                    medication.description,
                    medication.created_at,
                    medication.updated_at,
                ],
            )
            .map_err(|e| {
                constraint_error(e, || {
                    format!(
                        "cannot insert medication {}: unknown family {} or invalid values",
                        medication.name, medication.family_id
                    )
                })
            })?;

        tracing::info!(medication = %medication.name, stock = medication.stock, "inserted medication");
        self.notify(ChangeKind::Medications, ChangeAction::Inserted, Some(&medication.id));
        Ok(())
    }

    /// Update an existing medication. Returns `false` if no such medication exists.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE medications SET
                    name = ?2,
                    family_id = ?3,
                    dosage = ?4,
                    form = ?5,
                    stock = ?6,
                    min_stock = ?7,
                    unit_price = ?8,
                    description = ?9,
                    updated_at = ?10
                WHERE id = ?1
                "#,
                params![
                    medication.id,
                    medication.name,
                    medication.family_id,
                    medication.dosage,
                    medication.form,
                    medication.stock,
                    medication.min_stock,
                    medication.unit_price,
                    medication.description,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| {
                constraint_error(e, || format!("cannot update medication {}", medication.id))
            })?;

        if rows_affected > 0 {
            tracing::debug!(medication_id = %medication.id, "updated medication");
            self.notify(ChangeKind::Medications, ChangeAction::Updated, Some(&medication.id));
        }
        Ok(rows_affected > 0)
    }

    /// Set the stock level of a medication.
    pub fn update_medication_stock(&self, id: &str, stock: u32) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE medications SET stock = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, stock, chrono::Utc::now().to_rfc3339()],
        )?;
        if rows_affected > 0 {
            tracing::debug!(medication_id = %id, stock, "updated stock");
            self.notify(ChangeKind::Medications, ChangeAction::Updated, Some(id));
        }
        Ok(rows_affected > 0)
    }

    pub fn delete_medication(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM medications WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(medication_id = %id, "deleted medication");
            self.notify(ChangeKind::Medications, ChangeAction::Deleted, Some(id));
        }
        Ok(rows_affected > 0)
    }

    /// Get a medication by ID, with its family resolved.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<Medication>> {
        read_medication(&self.conn, id)
    }

    /// List medications ordered by name, with families resolved.
    pub fn list_medications(&self) -> DbResult<Vec<Medication>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEDICATION_SELECT} ORDER BY m.name"))?;
        let rows = stmt.query_map([], medication_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ========================================================================
    // Dispensation
    // ========================================================================

    /// Dispense every line of a prescription in one transaction.
    ///
    /// Stock is re-read inside the transaction, so lines naming the same
    /// medication see each other's decrements. Rejected lines leave stock
    /// untouched and do not block the others. An unknown medication aborts
    /// the whole prescription with [`DbError::NotFound`].
    pub fn dispense_prescription(&mut self, lines: &[PrescriptionLine]) -> DbResult<PrescriptionOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.transaction()?;
        let mut outcome = PrescriptionOutcome::default();

        for line in lines {
            let medication = read_medication(&tx, &line.medication_id)?
                .ok_or_else(|| DbError::NotFound(format!("medication {}", line.medication_id)))?;

            let result = apply_dispensation(&medication, line.quantity);
            match &result {
                Ok(dispensation) => {
                    tx.execute(
                        "UPDATE medications SET stock = ?2, updated_at = ?3 WHERE id = ?1",
                        params![dispensation.medication_id, dispensation.new_stock, now],
                    )?;
                }
                Err(reason) => {
                    tracing::warn!(
                        medication = %medication.name,
                        quantity = line.quantity,
                        %reason,
                        "dispensation rejected"
                    );
                }
            }
            outcome.record(&line.medication_id, line.quantity, result);
        }
        tx.commit()?;

        tracing::info!(
            dispensed = outcome.dispensed.len(),
            rejected = outcome.rejected.len(),
            "dispensed prescription"
        );
        let mut notified: Vec<&str> = Vec::new();
        for dispensation in &outcome.dispensed {
            if !notified.contains(&dispensation.medication_id.as_str()) {
                notified.push(&dispensation.medication_id);
                self.notify(
                    ChangeKind::Medications,
                    ChangeAction::Updated,
                    Some(&dispensation.medication_id),
                );
            }
        }
        Ok(outcome)
    }
}
