//! Pharmacy inventory models.

use serde::{Deserialize, Serialize};

/// Minimum stock threshold applied when none is given.
pub const DEFAULT_MIN_STOCK: u32 = 10;

/// A named category of medications (e.g. "Antibiotiques").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationFamily {
    pub id: String,
    /// Unique family name
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl MedicationFamily {
    /// Create a new family; name and description are trimmed.
    pub fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A single item in the pharmacy inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub name: String,
    /// Owning family ID
    pub family_id: String,
    /// Dosage (e.g. "500mg")
    pub dosage: String,
    /// Galenic form (e.g. "comprimé", "sirop")
    pub form: String,
    /// Units currently in stock
    pub stock: u32,
    /// Threshold at or below which the item needs restocking
    pub min_stock: u32,
    pub unit_price: f64,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Owning family, resolved by the store on fetch
    #[serde(default)]
    pub family: Option<MedicationFamily>,
}

impl Medication {
    /// Create a new medication with required fields and an empty stock.
    pub fn new(name: String, family_id: String, dosage: String, form: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            family_id,
            dosage,
            form,
            stock: 0,
            min_stock: DEFAULT_MIN_STOCK,
            unit_price: 0.0,
            description: None,
            created_at: now.clone(),
            updated_at: now,
            family: None,
        }
    }

    /// Name of the resolved family, if any.
    pub fn family_name(&self) -> Option<&str> {
        self.family.as_ref().map(|f| f.name.as_str())
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// One line of a prescription: a medication and the quantity to dispense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionLine {
    pub medication_id: String,
    pub quantity: u32,
}

impl PrescriptionLine {
    /// A line with the default quantity of one unit.
    pub fn single(medication_id: impl Into<String>) -> Self {
        Self {
            medication_id: medication_id.into(),
            quantity: 1,
        }
    }
}
