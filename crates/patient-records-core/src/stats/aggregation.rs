//! Distribution summaries over a patient snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::metrics::{AgeBand, BmiBand};
use crate::models::Patient;

/// Label used for patients without a primary specialty.
pub const UNSPECIFIED_SPECIALTY: &str = "Unspecified";

/// Default number of entries returned by [`top_medications`].
pub const DEFAULT_TOP_MEDICATIONS: usize = 10;

/// Tokens this short are treated as noise (stray punctuation, initials).
const MIN_MEDICATION_TOKEN_LEN: usize = 3;

/// Patients grouped under one primary specialty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct SpecialtyShare {
    pub name: String,
    pub count: u32,
    /// Rounded share of all patients, 0-100
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct AgeBandCount {
    pub band: AgeBand,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct BmiBandCount {
    pub band: BmiBand,
    pub label: String,
    pub count: u32,
}

/// How many patients list a given medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct MedicationCount {
    /// Display name, first character capitalized
    pub name: String,
    pub count: u32,
}

/// Count occurrences of `keys`, keeping the order in which each key first appears.
fn count_in_first_seen_order<I>(keys: I) -> Vec<(String, u32)>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u32)> = Vec::new();

    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

/// Group patients by primary specialty, in order of first occurrence.
///
/// Absent or blank specialties are grouped under [`UNSPECIFIED_SPECIALTY`].
pub fn summarize_by_specialty(patients: &[Patient]) -> Vec<SpecialtyShare> {
    let total = patients.len();
    let names = patients.iter().map(|p| {
        p.primary_specialty_label()
            .unwrap_or(UNSPECIFIED_SPECIALTY)
            .to_string()
    });

    count_in_first_seen_order(names)
        .into_iter()
        .map(|(name, count)| SpecialtyShare {
            name,
            count,
            percentage: percentage_of(count, total),
        })
        .collect()
}

fn percentage_of(count: u32, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

/// Count patients per age band. Only bands with at least one patient are
/// returned, youngest first.
pub fn summarize_by_age_band(patients: &[Patient]) -> Vec<AgeBandCount> {
    let mut counts: HashMap<AgeBand, u32> = HashMap::new();
    for patient in patients {
        *counts.entry(AgeBand::classify(patient.age)).or_default() += 1;
    }

    AgeBand::ALL
        .iter()
        .filter_map(|band| {
            counts.get(band).map(|&count| AgeBandCount {
                band: *band,
                label: band.label().to_string(),
                count,
            })
        })
        .collect()
}

/// Count patients per BMI band, over patients with a positive BMI only.
pub fn summarize_by_bmi_band(patients: &[Patient]) -> Vec<BmiBandCount> {
    let mut counts: HashMap<BmiBand, u32> = HashMap::new();
    for band in patients
        .iter()
        .filter_map(|p| p.positive_bmi())
        .filter_map(BmiBand::classify)
    {
        *counts.entry(band).or_default() += 1;
    }

    BmiBand::ALL
        .iter()
        .filter_map(|band| {
            counts.get(band).map(|&count| BmiBandCount {
                band: *band,
                label: band.label().to_string(),
                count,
            })
        })
        .collect()
}

/// Split a free-text medication list into normalized tokens.
///
/// Tokens are comma-separated, trimmed and lower-cased; tokens of two
/// characters or fewer are dropped.
pub fn medication_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| token.chars().count() >= MIN_MEDICATION_TOKEN_LEN)
}

/// The `limit` most frequently listed medications across all patients.
///
/// Sorted by count, descending; equal counts keep first-occurrence order.
pub fn top_medications(patients: &[Patient], limit: usize) -> Vec<MedicationCount> {
    let tokens = patients
        .iter()
        .filter_map(|p| p.medications.as_deref())
        .flat_map(medication_tokens);

    let mut counts = count_in_first_seen_order(tokens);
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);

    counts
        .into_iter()
        .map(|(name, count)| MedicationCount {
            name: capitalize_first(&name),
            count,
        })
        .collect()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(age: u32, specialty: Option<&str>) -> Patient {
        let mut p = Patient::new("Test".into(), "Patient".into(), age);
        p.primary_specialty = specialty.map(String::from);
        p
    }

    fn with_medications(text: &str) -> Patient {
        let mut p = patient(40, None);
        p.medications = Some(text.to_string());
        p
    }

    #[test]
    fn test_specialty_first_occurrence_order() {
        let patients = vec![
            patient(30, Some("Cardiologie")),
            patient(30, None),
            patient(30, Some("Pédiatrie")),
            patient(30, Some("Cardiologie")),
        ];

        let shares = summarize_by_specialty(&patients);
        let names: Vec<_> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Cardiologie", UNSPECIFIED_SPECIALTY, "Pédiatrie"]);
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[0].percentage, 50);
        assert_eq!(shares[1].percentage, 25);
    }

    #[test]
    fn test_specialty_blank_is_unspecified() {
        let patients = vec![patient(30, Some("  ")), patient(30, Some(""))];
        let shares = summarize_by_specialty(&patients);
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].name, UNSPECIFIED_SPECIALTY);
        assert_eq!(shares[0].percentage, 100);
    }

    #[test]
    fn test_specialty_empty() {
        assert!(summarize_by_specialty(&[]).is_empty());
    }

    #[test]
    fn test_age_bands() {
        let patients = vec![patient(70, None), patient(5, None), patient(17, None), patient(45, None)];
        let bands = summarize_by_age_band(&patients);

        let labels: Vec<_> = bands.iter().map(|b| (b.label.as_str(), b.count)).collect();
        assert_eq!(labels, vec![("0-17", 2), ("30-49", 1), ("65+", 1)]);
    }

    #[test]
    fn test_bmi_bands_skip_missing() {
        let mut lean = patient(30, None);
        lean.bmi = Some(17.0);
        let mut obese = patient(30, None);
        obese.bmi = Some(31.2);
        let mut zero = patient(30, None);
        zero.bmi = Some(0.0);
        let missing = patient(30, None);

        let bands = summarize_by_bmi_band(&[lean, obese, zero, missing]);
        let total: u32 = bands.iter().map(|b| b.count).sum();
        assert_eq!(total, 2);
        assert_eq!(bands[0].band, BmiBand::Underweight);
        assert_eq!(bands[1].band, BmiBand::Obese);
    }

    #[test]
    fn test_top_medications_case_and_whitespace() {
        let patients = vec![with_medications("Doliprane, doliprane , Advil")];
        let top = top_medications(&patients, DEFAULT_TOP_MEDICATIONS);

        assert_eq!(
            top,
            vec![
                MedicationCount { name: "Doliprane".into(), count: 2 },
                MedicationCount { name: "Advil".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_top_medications_drops_short_tokens() {
        let patients = vec![with_medications("ab, x, , Spasfon,  ok ")];
        let top = top_medications(&patients, DEFAULT_TOP_MEDICATIONS);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Spasfon");
    }

    #[test]
    fn test_top_medications_ties_keep_first_seen() {
        let patients = vec![
            with_medications("Ventoline, Augmentin"),
            with_medications("Augmentin, Kardegic"),
            with_medications("Kardegic"),
        ];
        let top = top_medications(&patients, 2);
        let names: Vec<_> = top.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Augmentin", "Kardegic"]);
    }

    #[test]
    fn test_top_medications_limit() {
        let text = (0..15).map(|i| format!("medicament{i}")).collect::<Vec<_>>().join(",");
        let top = top_medications(&[with_medications(&text)], DEFAULT_TOP_MEDICATIONS);
        assert_eq!(top.len(), DEFAULT_TOP_MEDICATIONS);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("éfferalgan"), "Éfferalgan");
        assert_eq!(capitalize_first(""), "");
    }
}
