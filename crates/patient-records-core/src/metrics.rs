//! Derived metrics computed from a single record.
//!
//! Everything here is a pure function of its inputs. Absence is modelled with
//! `Option` rather than sentinel zeros: a patient without a usable height or
//! weight has no BMI, and is left out of BMI-based aggregation.

use serde::{Deserialize, Serialize};

/// Round `value` to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Body-mass index from weight (kg) and height (cm), rounded to 2 decimals.
///
/// Returns `None` unless both measurements are present, finite and strictly
/// positive.
pub fn compute_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let weight = weight_kg.filter(|w| w.is_finite() && *w > 0.0)?;
    let height_m = height_cm.filter(|h| h.is_finite() && *h > 0.0)? / 100.0;
    Some(round_to(weight / (height_m * height_m), 2))
}

/// BMI category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, uniffi::Enum)]
pub enum BmiBand {
    /// bmi < 18.5
    Underweight,
    /// 18.5 <= bmi < 25
    Normal,
    /// 25 <= bmi < 30
    Overweight,
    /// bmi >= 30
    Obese,
}

impl BmiBand {
    /// All bands, lightest first.
    pub const ALL: [BmiBand; 4] = [
        BmiBand::Underweight,
        BmiBand::Normal,
        BmiBand::Overweight,
        BmiBand::Obese,
    ];

    /// Classify a BMI value. Absent, zero or negative values have no band.
    pub fn classify(bmi: f64) -> Option<Self> {
        if !bmi.is_finite() || bmi <= 0.0 {
            return None;
        }
        let band = if bmi < 18.5 {
            BmiBand::Underweight
        } else if bmi < 25.0 {
            BmiBand::Normal
        } else if bmi < 30.0 {
            BmiBand::Overweight
        } else {
            BmiBand::Obese
        };
        Some(band)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiBand::Underweight => "Underweight",
            BmiBand::Normal => "Normal",
            BmiBand::Overweight => "Overweight",
            BmiBand::Obese => "Obese",
        }
    }
}

/// Age band used on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, uniffi::Enum)]
pub enum AgeBand {
    /// 0-17
    Minor,
    /// 18-29
    YoungAdult,
    /// 30-49
    Adult,
    /// 50-64
    MiddleAged,
    /// 65+
    Senior,
}

impl AgeBand {
    /// All bands, youngest first.
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Minor,
        AgeBand::YoungAdult,
        AgeBand::Adult,
        AgeBand::MiddleAged,
        AgeBand::Senior,
    ];

    pub fn classify(age: u32) -> Self {
        match age {
            0..=17 => AgeBand::Minor,
            18..=29 => AgeBand::YoungAdult,
            30..=49 => AgeBand::Adult,
            50..=64 => AgeBand::MiddleAged,
            _ => AgeBand::Senior,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Minor => "0-17",
            AgeBand::YoungAdult => "18-29",
            AgeBand::Adult => "30-49",
            AgeBand::MiddleAged => "50-64",
            AgeBand::Senior => "65+",
        }
    }
}

/// Stock level of an inventory item relative to its minimum threshold.
///
/// Variants are ordered by urgency, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, uniffi::Enum)]
pub enum StockStatus {
    OutOfStock,
    Low,
    Available,
}

impl StockStatus {
    pub fn classify(current: u32, minimum: u32) -> Self {
        if current == 0 {
            StockStatus::OutOfStock
        } else if current <= minimum {
            StockStatus::Low
        } else {
            StockStatus::Available
        }
    }

    /// Whether this status should raise a restock alert.
    pub fn needs_restock(&self) -> bool {
        !matches!(self, StockStatus::Available)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of stock",
            StockStatus::Low => "Low stock",
            StockStatus::Available => "Available",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_bmi() {
        assert_eq!(compute_bmi(Some(70.0), Some(175.0)), Some(22.86));
        assert_eq!(compute_bmi(Some(95.0), Some(170.0)), Some(32.87));
    }

    #[test]
    fn test_compute_bmi_absent() {
        assert_eq!(compute_bmi(None, Some(175.0)), None);
        assert_eq!(compute_bmi(Some(70.0), None), None);
        assert_eq!(compute_bmi(Some(0.0), Some(175.0)), None);
        assert_eq!(compute_bmi(Some(70.0), Some(0.0)), None);
        assert_eq!(compute_bmi(Some(-70.0), Some(175.0)), None);
        assert_eq!(compute_bmi(Some(f64::NAN), Some(175.0)), None);
    }

    #[test]
    fn test_bmi_band_boundaries() {
        assert_eq!(BmiBand::classify(18.49), Some(BmiBand::Underweight));
        assert_eq!(BmiBand::classify(18.5), Some(BmiBand::Normal));
        assert_eq!(BmiBand::classify(24.999), Some(BmiBand::Normal));
        assert_eq!(BmiBand::classify(25.0), Some(BmiBand::Overweight));
        assert_eq!(BmiBand::classify(29.99), Some(BmiBand::Overweight));
        assert_eq!(BmiBand::classify(30.0), Some(BmiBand::Obese));
        assert_eq!(BmiBand::classify(0.0), None);
        assert_eq!(BmiBand::classify(-1.0), None);
    }

    #[test]
    fn test_age_band_boundaries() {
        assert_eq!(AgeBand::classify(0), AgeBand::Minor);
        assert_eq!(AgeBand::classify(17).label(), "0-17");
        assert_eq!(AgeBand::classify(18).label(), "18-29");
        assert_eq!(AgeBand::classify(29).label(), "18-29");
        assert_eq!(AgeBand::classify(30).label(), "30-49");
        assert_eq!(AgeBand::classify(49).label(), "30-49");
        assert_eq!(AgeBand::classify(50).label(), "50-64");
        assert_eq!(AgeBand::classify(64).label(), "50-64");
        assert_eq!(AgeBand::classify(65).label(), "65+");
        assert_eq!(AgeBand::classify(101), AgeBand::Senior);
    }

    #[test]
    fn test_stock_status() {
        assert_eq!(StockStatus::classify(0, 10), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(5, 10), StockStatus::Low);
        assert_eq!(StockStatus::classify(10, 10), StockStatus::Low);
        assert_eq!(StockStatus::classify(11, 10), StockStatus::Available);
        assert_eq!(StockStatus::classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(1, 0), StockStatus::Available);
    }

    #[test]
    fn test_stock_status_ordering() {
        assert!(StockStatus::OutOfStock < StockStatus::Low);
        assert!(StockStatus::Low < StockStatus::Available);
        assert!(StockStatus::Low.needs_restock());
        assert!(!StockStatus::Available.needs_restock());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(22.857, 2), 22.86);
        assert_eq!(round_to(27.46, 1), 27.5);
        assert_eq!(round_to(12.0, 0), 12.0);
    }
}
