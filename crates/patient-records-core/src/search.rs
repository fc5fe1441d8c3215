//! In-memory filters over record snapshots.
//!
//! Matching is case-insensitive substring matching; a blank search term
//! matches everything.

use serde::{Deserialize, Serialize};

use crate::models::{Medication, MedicationFamily, Patient, Specialty};

fn normalize_term(term: &str) -> Option<String> {
    let term = term.trim();
    (!term.is_empty()).then(|| term.to_lowercase())
}

fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

/// Patients whose last name, first name or primary specialty contains `term`.
pub fn filter_patients<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    let Some(term) = normalize_term(term) else {
        return patients.iter().collect();
    };

    patients
        .iter()
        .filter(|p| {
            contains_term(&p.last_name, &term)
                || contains_term(&p.first_name, &term)
                || p.primary_specialty
                    .as_deref()
                    .is_some_and(|s| contains_term(s, &term))
        })
        .collect()
}

/// Medications whose name or family name contains `term`, optionally
/// restricted to one family.
pub fn filter_medications<'a>(
    medications: &'a [Medication],
    term: &str,
    family_id: Option<&str>,
) -> Vec<&'a Medication> {
    let term = normalize_term(term);

    medications
        .iter()
        .filter(|m| family_id.map_or(true, |id| m.family_id == id))
        .filter(|m| match &term {
            None => true,
            Some(term) => {
                contains_term(&m.name, term)
                    || m.family_name().is_some_and(|name| contains_term(name, term))
            }
        })
        .collect()
}

/// A family together with its medications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyGroup {
    pub family: MedicationFamily,
    pub medications: Vec<Medication>,
}

/// Group medications under their families, in the order `families` is given.
///
/// Families with no medication in `medications` are left out.
pub fn group_by_family(families: &[MedicationFamily], medications: &[Medication]) -> Vec<FamilyGroup> {
    families
        .iter()
        .filter_map(|family| {
            let members: Vec<Medication> = medications
                .iter()
                .filter(|m| m.family_id == family.id)
                .cloned()
                .collect();
            (!members.is_empty()).then(|| FamilyGroup {
                family: family.clone(),
                medications: members,
            })
        })
        .collect()
}

/// Specialties from the catalogue not yet assigned to `patient`.
pub fn unassigned_specialties<'a>(specialties: &'a [Specialty], patient: &Patient) -> Vec<&'a Specialty> {
    specialties
        .iter()
        .filter(|s| !patient.has_specialty(&s.id))
        .collect()
}
