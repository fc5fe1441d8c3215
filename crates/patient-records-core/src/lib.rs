//! Patient Records Core Library
//!
//! Local-first patient records, pharmacy stock and dashboard statistics for a
//! small practice.
//!
//! # Architecture
//!
//! ```text
//!        Host UI (Swift / Kotlin)
//!                 │
//!        PatientRecordsCore (FFI)
//!                 │
//!     ┌───────────┼─────────────────────────┐
//!     │           │                         │
//!     ▼           ▼                         ▼
//!  Record     Change Feed ──► listeners   Engines (pure)
//!  Store      (re-fetch on change)        metrics / stats /
//!  (SQLite)                               inventory / search
//!     │                                     │
//!     └────────── snapshots ────────────────┘
//!                     │
//!                     ▼
//!                  Exports (CSV / JSON)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite record store
//! - [`models`]: Domain types (Patient, Specialty, Medication, ...)
//! - [`metrics`]: BMI, age/BMI bands, stock status
//! - [`stats`]: Dashboard aggregation
//! - [`inventory`]: Stock classification and dispensation
//! - [`search`]: Snapshot filters
//! - [`changes`]: Change notifications
//! - [`export`]: Roster and restock exports
//! - [`config`], [`logging`]: Environment configuration and tracing setup

pub mod changes;
pub mod config;
pub mod db;
pub mod export;
pub mod inventory;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod search;
pub mod stats;

// Re-export commonly used types
pub use changes::{ChangeAction, ChangeEvent, ChangeFeed, ChangeKind};
pub use config::{Config, ConfigError};
pub use db::{Database, DbError};
pub use inventory::{InventoryCounts, PrescriptionOutcome};
pub use metrics::{AgeBand, BmiBand, StockStatus};
pub use models::{Medication, MedicationFamily, Patient, PrescriptionLine, Specialty};
pub use stats::DashboardSummary;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use changes::SubscriberId;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum PatientRecordsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for PatientRecordsError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => PatientRecordsError::NotFound(what),
            db::DbError::Constraint(what) => PatientRecordsError::Constraint(what),
            db::DbError::Sqlite(_) => PatientRecordsError::DatabaseError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for PatientRecordsError {
    fn from(e: serde_json::Error) -> Self {
        PatientRecordsError::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for PatientRecordsError {
    fn from(e: config::ConfigError) -> Self {
        PatientRecordsError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientRecordsError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path, with default settings.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PatientRecordsCore>, PatientRecordsError> {
    let config = Config {
        database_path: path.into(),
        ..Config::default()
    };
    PatientRecordsCore::open(config)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PatientRecordsCore>, PatientRecordsError> {
    let db = Database::open_in_memory()?;
    Ok(PatientRecordsCore::with_database(db, Config::default()))
}

/// Open the database named by the environment (see [`Config::from_env`]).
///
/// Also installs the tracing subscriber with the configured log filter,
/// unless one is already set.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<PatientRecordsCore>, PatientRecordsError> {
    let config = Config::from_env()?;
    logging::init_logging(&config.log_filter);
    PatientRecordsCore::open(config)
}

/// Install the global tracing subscriber. Returns `false` if one was already set.
///
/// Without an explicit `filter`, `PATIENT_RECORDS_LOG` is used.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> Result<bool, PatientRecordsError> {
    let filter = match filter {
        Some(filter) => filter,
        None => Config::from_env()?.log_filter,
    };
    Ok(logging::init_logging(&filter))
}

/// BMI from weight (kg) and height (cm), 2 decimals; `None` when not computable.
#[uniffi::export]
pub fn compute_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    metrics::compute_bmi(weight_kg, height_cm)
}

// =========================================================================
// Change Listener
// =========================================================================

/// Implemented by the host to hear about committed changes.
///
/// Called from a dedicated thread; calling back into the core is allowed.
#[uniffi::export(callback_interface)]
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: ChangeEvent);
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PatientRecordsCore {
    db: Arc<Mutex<Database>>,
    config: Config,
}

impl PatientRecordsCore {
    fn open(config: Config) -> Result<Arc<Self>, PatientRecordsError> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(db, config))
    }

    fn with_database(db: Database, config: Config) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }
}

#[uniffi::export]
impl PatientRecordsCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a new patient. BMI is derived from height and weight.
    pub fn create_patient(&self, input: FfiPatientInput) -> Result<FfiPatient, PatientRecordsError> {
        input.validate()?;
        let mut patient = Patient::new(input.first_name.clone(), input.last_name.clone(), input.age);
        input.apply_to(&mut patient);

        let db = self.db.lock()?;
        db.insert_patient(&patient)?;
        Ok(patient.into())
    }

    /// Replace a patient's fields. Returns `false` if no such patient exists.
    pub fn update_patient(
        &self,
        id: String,
        input: FfiPatientInput,
    ) -> Result<bool, PatientRecordsError> {
        input.validate()?;
        let db = self.db.lock()?;
        let Some(mut patient) = db.get_patient(&id)? else {
            return Ok(false);
        };
        input.apply_to(&mut patient);
        patient.touch();
        Ok(db.update_patient(&patient)?)
    }

    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, PatientRecordsError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// All patients, newest first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, PatientRecordsError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    pub fn delete_patient(&self, id: String) -> Result<bool, PatientRecordsError> {
        let db = self.db.lock()?;
        Ok(db.delete_patient(&id)?)
    }

    /// Patients whose name or primary specialty contains `term`.
    pub fn search_patients(&self, term: String) -> Result<Vec<FfiPatient>, PatientRecordsError> {
        let patients = self.db.lock()?.list_patients()?;
        Ok(search::filter_patients(&patients, &term)
            .into_iter()
            .cloned()
            .map(|p| p.into())
            .collect())
    }

    // =========================================================================
    // Specialty Operations
    // =========================================================================

    pub fn create_specialty(&self, name: String) -> Result<FfiSpecialty, PatientRecordsError> {
        let db = self.db.lock()?;
        Ok(db.insert_specialty(&name)?.into())
    }

    pub fn list_specialties(&self) -> Result<Vec<FfiSpecialty>, PatientRecordsError> {
        let db = self.db.lock()?;
        let specialties = db.list_specialties()?;
        Ok(specialties.into_iter().map(|s| s.into()).collect())
    }

    /// Delete a specialty and unassign it from every patient.
    pub fn delete_specialty(&self, id: String) -> Result<bool, PatientRecordsError> {
        let db = self.db.lock()?;
        Ok(db.delete_specialty(&id)?)
    }

    /// Assign specialties to a patient, all or none. Returns the number assigned.
    pub fn assign_specialties(
        &self,
        patient_id: String,
        specialty_ids: Vec<String>,
    ) -> Result<u32, PatientRecordsError> {
        let mut db = self.db.lock()?;
        let links = db.attach_specialties(&patient_id, &specialty_ids)?;
        Ok(links.len() as u32)
    }

    pub fn unassign_specialty(
        &self,
        patient_id: String,
        specialty_id: String,
    ) -> Result<bool, PatientRecordsError> {
        let db = self.db.lock()?;
        Ok(db.detach_specialty(&patient_id, &specialty_id)?)
    }

    /// Catalogue specialties the patient does not have yet.
    pub fn unassigned_specialties(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiSpecialty>, PatientRecordsError> {
        let db = self.db.lock()?;
        let patient = db
            .get_patient(&patient_id)?
            .ok_or_else(|| PatientRecordsError::NotFound(format!("patient {}", patient_id)))?;
        let catalogue = db.list_specialties()?;
        Ok(search::unassigned_specialties(&catalogue, &patient)
            .into_iter()
            .cloned()
            .map(|s| s.into())
            .collect())
    }

    // =========================================================================
    // Pharmacy Operations
    // =========================================================================

    pub fn create_medication_family(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<FfiMedicationFamily, PatientRecordsError> {
        let db = self.db.lock()?;
        let family = db.insert_medication_family(&name, description.as_deref())?;
        Ok(family.into())
    }

    pub fn list_medication_families(&self) -> Result<Vec<FfiMedicationFamily>, PatientRecordsError> {
        let db = self.db.lock()?;
        let families = db.list_medication_families()?;
        Ok(families.into_iter().map(|f| f.into()).collect())
    }

    /// Add a medication. A missing `min_stock` takes the configured default.
    pub fn create_medication(
        &self,
        input: FfiMedicationInput,
    ) -> Result<FfiMedication, PatientRecordsError> {
        input.validate()?;
        let mut medication = Medication::new(
            input.name.clone(),
            input.family_id.clone(),
            input.dosage.clone(),
            input.form.clone(),
        );
        medication.min_stock = self.config.default_min_stock;
        input.apply_to(&mut medication);

        let db = self.db.lock()?;
        db.insert_medication(&medication)?;
        let stored = db
            .get_medication(&medication.id)?
            .ok_or_else(|| PatientRecordsError::NotFound(format!("medication {}", medication.id)))?;
        Ok(stored.into())
    }

    /// Replace a medication's fields. Returns `false` if no such medication exists.
    pub fn update_medication(
        &self,
        id: String,
        input: FfiMedicationInput,
    ) -> Result<bool, PatientRecordsError> {
        input.validate()?;
        let db = self.db.lock()?;
        let Some(mut medication) = db.get_medication(&id)? else {
            return Ok(false);
        };
        input.apply_to(&mut medication);
        Ok(db.update_medication(&medication)?)
    }

    pub fn update_medication_stock(&self, id: String, stock: u32) -> Result<bool, PatientRecordsError> {
        let db = self.db.lock()?;
        Ok(db.update_medication_stock(&id, stock)?)
    }

    pub fn delete_medication(&self, id: String) -> Result<bool, PatientRecordsError> {
        let db = self.db.lock()?;
        Ok(db.delete_medication(&id)?)
    }

    pub fn get_medication(&self, id: String) -> Result<Option<FfiMedication>, PatientRecordsError> {
        let db = self.db.lock()?;
        let medication = db.get_medication(&id)?;
        Ok(medication.map(|m| m.into()))
    }

    /// Every medication with its stock status, ordered by name.
    pub fn list_medications(&self) -> Result<Vec<FfiMedication>, PatientRecordsError> {
        let db = self.db.lock()?;
        let medications = db.list_medications()?;
        Ok(medications.into_iter().map(|m| m.into()).collect())
    }

    /// Medications whose name or family contains `term`, optionally in one family.
    pub fn search_medications(
        &self,
        term: String,
        family_id: Option<String>,
    ) -> Result<Vec<FfiMedication>, PatientRecordsError> {
        let medications = self.db.lock()?.list_medications()?;
        Ok(search::filter_medications(&medications, &term, family_id.as_deref())
            .into_iter()
            .cloned()
            .map(|m| m.into())
            .collect())
    }

    /// Medications grouped under their families; empty families are left out.
    pub fn medications_by_family(&self) -> Result<Vec<FfiFamilyGroup>, PatientRecordsError> {
        let db = self.db.lock()?;
        let families = db.list_medication_families()?;
        let medications = db.list_medications()?;
        Ok(search::group_by_family(&families, &medications)
            .into_iter()
            .map(|g| g.into())
            .collect())
    }

    /// Every medication with its stock status, in store order.
    pub fn inventory(&self) -> Result<Vec<FfiMedication>, PatientRecordsError> {
        let medications = self.db.lock()?.list_medications()?;
        Ok(inventory::classify_inventory(&medications)
            .into_iter()
            .map(|entry| entry.medication.into())
            .collect())
    }

    /// Items that are out of stock or low, most urgent first.
    pub fn restock_alerts(&self) -> Result<Vec<FfiMedication>, PatientRecordsError> {
        let medications = self.db.lock()?.list_medications()?;
        Ok(inventory::restock_alerts(&medications)
            .into_iter()
            .map(|entry| entry.medication.into())
            .collect())
    }

    pub fn inventory_counts(&self) -> Result<InventoryCounts, PatientRecordsError> {
        let medications = self.db.lock()?.list_medications()?;
        Ok(inventory::inventory_counts(&medications))
    }

    /// Dispense a prescription. Lines that exceed stock are rejected individually.
    pub fn dispense(
        &self,
        lines: Vec<FfiPrescriptionLine>,
    ) -> Result<FfiPrescriptionOutcome, PatientRecordsError> {
        let lines: Vec<PrescriptionLine> = lines.into_iter().map(|l| l.into()).collect();
        let mut db = self.db.lock()?;
        let outcome = db.dispense_prescription(&lines)?;
        Ok(outcome.into())
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub fn dashboard(&self) -> Result<DashboardSummary, PatientRecordsError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        let specialties = db.list_specialties()?;
        Ok(DashboardSummary::compute(
            &patients,
            &specialties,
            self.config.top_medications,
        ))
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    pub fn export_patients_csv(&self) -> Result<String, PatientRecordsError> {
        let patients = self.db.lock()?.list_patients()?;
        Ok(export::PatientRosterExport::from_patients(&patients).to_csv())
    }

    pub fn export_patients_json(&self) -> Result<String, PatientRecordsError> {
        let patients = self.db.lock()?.list_patients()?;
        Ok(export::PatientRosterExport::from_patients(&patients).to_json()?)
    }

    pub fn export_restock_csv(&self) -> Result<String, PatientRecordsError> {
        let medications = self.db.lock()?.list_medications()?;
        Ok(export::RestockExport::from_medications(&medications).to_csv())
    }

    pub fn export_restock_json(&self) -> Result<String, PatientRecordsError> {
        let medications = self.db.lock()?.list_medications()?;
        Ok(export::RestockExport::from_medications(&medications).to_json()?)
    }

    pub fn export_dashboard_json(&self) -> Result<String, PatientRecordsError> {
        Ok(self.dashboard()?.to_json()?)
    }

    // =========================================================================
    // Change Notifications
    // =========================================================================

    /// Deliver every subsequent change to `listener` on a background thread,
    /// until the returned subscription is cancelled.
    pub fn register_change_listener(
        &self,
        listener: Box<dyn ChangeListener>,
    ) -> Result<Arc<ChangeSubscription>, PatientRecordsError> {
        let (id, events) = self.db.lock()?.subscribe_with_id();
        let active = Arc::new(AtomicBool::new(true));
        let still_active = Arc::clone(&active);

        let spawned = std::thread::Builder::new()
            .name("patient-records-changes".into())
            .spawn(move || {
                // Ends once the sender is unsubscribed or the database is dropped.
                for event in events {
                    if !still_active.load(Ordering::SeqCst) {
                        break;
                    }
                    listener.on_change(event);
                }
                tracing::debug!(subscriber = id, "change listener stopped");
            });
        if let Err(e) = spawned {
            self.db.lock()?.unsubscribe(id);
            return Err(PatientRecordsError::DatabaseError(format!("listener thread: {}", e)));
        }

        tracing::debug!(subscriber = id, "registered change listener");
        Ok(Arc::new(ChangeSubscription {
            db: Arc::downgrade(&self.db),
            id,
            active,
        }))
    }
}

/// Handle to a registered [`ChangeListener`].
///
/// Dropping the handle does not stop delivery; call [`ChangeSubscription::cancel`].
#[derive(uniffi::Object)]
pub struct ChangeSubscription {
    db: Weak<Mutex<Database>>,
    id: SubscriberId,
    active: Arc<AtomicBool>,
}

#[uniffi::export]
impl ChangeSubscription {
    /// Stop delivering changes and let the listener thread exit.
    ///
    /// No event reaches the listener after this returns, except one already
    /// being delivered. Cancelling twice is a no-op.
    pub fn cancel(&self) -> Result<(), PatientRecordsError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(db) = self.db.upgrade() {
            db.lock()?.unsubscribe(self.id);
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe specialty.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSpecialty {
    pub id: String,
    pub name: String,
}

impl From<Specialty> for FfiSpecialty {
    fn from(specialty: Specialty) -> Self {
        Self {
            id: specialty.id,
            name: specialty.name,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub blood_glucose: Option<String>,
    pub blood_pressure: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub bmi_band: Option<BmiBand>,
    pub age_band: AgeBand,
    pub primary_specialty: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
    pub specialties: Vec<FfiSpecialty>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            bmi_band: patient.positive_bmi().and_then(BmiBand::classify),
            age_band: AgeBand::classify(patient.age),
            id: patient.id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            age: patient.age,
            blood_glucose: patient.blood_glucose,
            blood_pressure: patient.blood_pressure,
            height_cm: patient.height_cm,
            weight_kg: patient.weight_kg,
            bmi: patient.bmi,
            primary_specialty: patient.primary_specialty,
            medications: patient.medications,
            notes: patient.notes,
            specialties: patient.specialties.into_iter().map(|s| s.into()).collect(),
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// Patient fields supplied by the host on create and update.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientInput {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub blood_glucose: Option<String>,
    pub blood_pressure: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub primary_specialty: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
}

impl FfiPatientInput {
    fn validate(&self) -> Result<(), PatientRecordsError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(PatientRecordsError::InvalidInput(
                "first and last name are required".into(),
            ));
        }
        for (field, value) in [("height_cm", self.height_cm), ("weight_kg", self.weight_kg)] {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(PatientRecordsError::InvalidInput(format!(
                    "{} must be a non-negative number",
                    field
                )));
            }
        }
        Ok(())
    }

    fn apply_to(self, patient: &mut Patient) {
        patient.first_name = self.first_name.trim().to_string();
        patient.last_name = self.last_name.trim().to_string();
        patient.age = self.age;
        patient.blood_glucose = self.blood_glucose;
        patient.blood_pressure = self.blood_pressure;
        patient.height_cm = self.height_cm;
        patient.weight_kg = self.weight_kg;
        patient.primary_specialty = self.primary_specialty;
        patient.medications = self.medications;
        patient.notes = self.notes;
        patient.refresh_bmi();
    }
}

/// FFI-safe medication family.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedicationFamily {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<MedicationFamily> for FfiMedicationFamily {
    fn from(family: MedicationFamily) -> Self {
        Self {
            id: family.id,
            name: family.name,
            description: family.description,
        }
    }
}

/// FFI-safe medication, with its stock status.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub name: String,
    pub family_id: String,
    pub family_name: Option<String>,
    pub dosage: String,
    pub form: String,
    pub stock: u32,
    pub min_stock: u32,
    pub unit_price: f64,
    pub description: Option<String>,
    pub status: StockStatus,
}

impl From<Medication> for FfiMedication {
    fn from(medication: Medication) -> Self {
        Self {
            status: inventory::stock_status(&medication),
            family_name: medication.family_name().map(str::to_string),
            id: medication.id,
            name: medication.name,
            family_id: medication.family_id,
            dosage: medication.dosage,
            form: medication.form,
            stock: medication.stock,
            min_stock: medication.min_stock,
            unit_price: medication.unit_price,
            description: medication.description,
        }
    }
}

/// Medication fields supplied by the host on create and update.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationInput {
    pub name: String,
    pub family_id: String,
    pub dosage: String,
    pub form: String,
    pub stock: u32,
    /// Restock threshold; unchanged (or the configured default) when absent
    pub min_stock: Option<u32>,
    pub unit_price: f64,
    pub description: Option<String>,
}

impl FfiMedicationInput {
    fn validate(&self) -> Result<(), PatientRecordsError> {
        if self.name.trim().is_empty() {
            return Err(PatientRecordsError::InvalidInput("medication name is required".into()));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(PatientRecordsError::InvalidInput(
                "unit_price must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    fn apply_to(self, medication: &mut Medication) {
        medication.name = self.name.trim().to_string();
        if medication.family_id != self.family_id {
            medication.family = None;
        }
        medication.family_id = self.family_id;
        medication.dosage = self.dosage;
        medication.form = self.form;
        medication.stock = self.stock;
        if let Some(min_stock) = self.min_stock {
            medication.min_stock = min_stock;
        }
        medication.unit_price = self.unit_price;
        medication.description = self.description;
    }
}

/// A family with its medications.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFamilyGroup {
    pub family: FfiMedicationFamily,
    pub medications: Vec<FfiMedication>,
}

impl From<search::FamilyGroup> for FfiFamilyGroup {
    fn from(group: search::FamilyGroup) -> Self {
        Self {
            family: group.family.into(),
            medications: group.medications.into_iter().map(|m| m.into()).collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescriptionLine {
    pub medication_id: String,
    pub quantity: u32,
}

impl From<FfiPrescriptionLine> for PrescriptionLine {
    fn from(line: FfiPrescriptionLine) -> Self {
        PrescriptionLine {
            medication_id: line.medication_id,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDispensation {
    pub medication_id: String,
    pub quantity: u32,
    pub previous_stock: u32,
    pub new_stock: u32,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRejectedLine {
    pub medication_id: String,
    pub quantity: u32,
    /// Human-readable rejection reason
    pub reason: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescriptionOutcome {
    pub dispensed: Vec<FfiDispensation>,
    pub rejected: Vec<FfiRejectedLine>,
}

impl From<PrescriptionOutcome> for FfiPrescriptionOutcome {
    fn from(outcome: PrescriptionOutcome) -> Self {
        Self {
            dispensed: outcome
                .dispensed
                .into_iter()
                .map(|d| FfiDispensation {
                    medication_id: d.medication_id,
                    quantity: d.quantity,
                    previous_stock: d.previous_stock,
                    new_stock: d.new_stock,
                })
                .collect(),
            rejected: outcome
                .rejected
                .into_iter()
                .map(|r| FfiRejectedLine {
                    reason: r.reason.to_string(),
                    medication_id: r.medication_id,
                    quantity: r.quantity,
                })
                .collect(),
        }
    }
}
