//! Restock report export.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::inventory::restock_alerts;
use crate::metrics::StockStatus;
use crate::models::Medication;

/// One medication needing a restock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestockRow {
    pub medication_id: String,
    pub name: String,
    /// Family name, empty when the family was not resolved
    pub family: String,
    pub dosage: String,
    pub form: String,
    pub stock: u32,
    pub min_stock: u32,
    pub status: StockStatus,
}

/// Restock report, most urgent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockExport {
    /// Export timestamp
    pub exported_at: String,
    pub items: Vec<RestockRow>,
}

impl RestockExport {
    pub fn from_medications(medications: &[Medication]) -> Self {
        let items = restock_alerts(medications)
            .into_iter()
            .map(|entry| RestockRow {
                family: entry.medication.family_name().unwrap_or_default().to_string(),
                medication_id: entry.medication.id,
                name: entry.medication.name,
                dosage: entry.medication.dosage,
                form: entry.medication.form,
                stock: entry.medication.stock,
                min_stock: entry.medication.min_stock,
                status: entry.status,
            })
            .collect();

        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            items,
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
        csv.push_str("medication_id,name,family,dosage,form,stock,min_stock,status\n");

        for item in &self.items {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                escape_csv(&item.medication_id),
                escape_csv(&item.name),
                escape_csv(&item.family),
                escape_csv(&item.dosage),
                escape_csv(&item.form),
                item.stock,
                item.min_stock,
                item.status.label(),
            ));
        }

        csv
    }
}
