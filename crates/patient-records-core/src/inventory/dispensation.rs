//! Dispensation preconditions.
//!
//! A dispensation takes `quantity` units out of a medication's stock. The
//! engine only validates and computes the new stock; persisting it is the
//! record store's job (see `Database::dispense_prescription`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Medication;

/// An accepted dispensation, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dispensation {
    pub medication_id: String,
    pub quantity: u32,
    pub previous_stock: u32,
    pub new_stock: u32,
}

/// Why a dispensation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispensationRejected {
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    #[error("Requested {requested} units but only {available} in stock")]
    InsufficientStock { requested: u32, available: u32 },
}

/// Validate taking `quantity` units from `medication` and compute the new stock.
///
/// Accepted quantities lie in `[1, medication.stock]`.
pub fn apply_dispensation(
    medication: &Medication,
    quantity: u32,
) -> Result<Dispensation, DispensationRejected> {
    if quantity == 0 {
        return Err(DispensationRejected::ZeroQuantity);
    }
    if quantity > medication.stock {
        return Err(DispensationRejected::InsufficientStock {
            requested: quantity,
            available: medication.stock,
        });
    }

    Ok(Dispensation {
        medication_id: medication.id.clone(),
        quantity,
        previous_stock: medication.stock,
        new_stock: medication.stock - quantity,
    })
}

/// A prescription line that was not dispensed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedLine {
    pub medication_id: String,
    pub quantity: u32,
    pub reason: DispensationRejected,
}

/// Result of dispensing a whole prescription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionOutcome {
    pub dispensed: Vec<Dispensation>,
    pub rejected: Vec<RejectedLine>,
}

impl PrescriptionOutcome {
    /// File one line's result under dispensed or rejected.
    pub fn record(
        &mut self,
        medication_id: &str,
        quantity: u32,
        result: Result<Dispensation, DispensationRejected>,
    ) {
        match result {
            Ok(dispensation) => self.dispensed.push(dispensation),
            Err(reason) => self.rejected.push(RejectedLine {
                medication_id: medication_id.to_string(),
                quantity,
                reason,
            }),
        }
    }

    pub fn is_fully_dispensed(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medication_with_stock(stock: u32) -> Medication {
        let mut med = Medication::new(
            "Amoxicilline".into(),
            "fam-1".into(),
            "500mg".into(),
            "gélule".into(),
        );
        med.stock = stock;
        med
    }

    #[test]
    fn test_rejects_more_than_stock() {
        let med = medication_with_stock(5);
        assert_eq!(
            apply_dispensation(&med, 6),
            Err(DispensationRejected::InsufficientStock {
                requested: 6,
                available: 5
            })
        );
    }

    #[test]
    fn test_whole_stock_leaves_zero() {
        let med = medication_with_stock(5);
        let dispensation = apply_dispensation(&med, 5).unwrap();
        assert_eq!(dispensation.new_stock, 0);
        assert_eq!(dispensation.previous_stock, 5);
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let med = medication_with_stock(5);
        assert_eq!(apply_dispensation(&med, 0), Err(DispensationRejected::ZeroQuantity));
    }

    #[test]
    fn test_empty_stock_rejects_everything() {
        let med = medication_with_stock(0);
        assert!(apply_dispensation(&med, 1).is_err());
    }

    #[test]
    fn test_outcome_records_lines() {
        let med = medication_with_stock(2);
        let mut outcome = PrescriptionOutcome::default();
        outcome.record(&med.id, 1, apply_dispensation(&med, 1));
        outcome.record(&med.id, 4, apply_dispensation(&med, 4));

        assert_eq!(outcome.dispensed.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].quantity, 4);
        assert!(!outcome.is_fully_dispensed());
    }
}
