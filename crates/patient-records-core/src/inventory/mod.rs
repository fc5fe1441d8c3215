//! Pharmacy stock classification and restock alerts.

mod dispensation;

pub use dispensation::*;

use serde::{Deserialize, Serialize};

use crate::metrics::StockStatus;
use crate::models::Medication;

/// A medication paired with its current stock status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryEntry {
    pub medication: Medication,
    pub status: StockStatus,
}

/// Item counts per stock status, for the pharmacy panel header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct InventoryCounts {
    pub total: u32,
    pub out_of_stock: u32,
    pub low: u32,
    pub available: u32,
    /// Out of stock plus low
    pub restock_needed: u32,
}

pub fn stock_status(medication: &Medication) -> StockStatus {
    StockStatus::classify(medication.stock, medication.min_stock)
}

/// Classify every medication, preserving input order.
pub fn classify_inventory(medications: &[Medication]) -> Vec<InventoryEntry> {
    medications
        .iter()
        .map(|medication| InventoryEntry {
            medication: medication.clone(),
            status: stock_status(medication),
        })
        .collect()
}

/// Medications that are out of stock or low.
///
/// Out-of-stock items come first; within a status, input order is kept.
pub fn restock_alerts(medications: &[Medication]) -> Vec<InventoryEntry> {
    let mut alerts: Vec<InventoryEntry> = classify_inventory(medications)
        .into_iter()
        .filter(|entry| entry.status.needs_restock())
        .collect();
    alerts.sort_by_key(|entry| entry.status);
    alerts
}

pub fn inventory_counts(medications: &[Medication]) -> InventoryCounts {
    let mut counts = InventoryCounts {
        total: medications.len() as u32,
        ..Default::default()
    };
    for medication in medications {
        match stock_status(medication) {
            StockStatus::OutOfStock => counts.out_of_stock += 1,
            StockStatus::Low => counts.low += 1,
            StockStatus::Available => counts.available += 1,
        }
    }
    counts.restock_needed = counts.out_of_stock + counts.low;
    counts
}
