//! Domain models for the patient-records system.

mod patient;
mod pharmacy;

pub use patient::*;
pub use pharmacy::*;
