//! Dashboard statistics computed over snapshots read back from the store.

use patient_records_core::metrics::{AgeBand, BmiBand};
use patient_records_core::stats::{compute_alerts, top_medications, DashboardSummary};
use patient_records_core::{Database, Patient};

fn measured(first: &str, age: u32, height_cm: f64, weight_kg: f64) -> Patient {
    let mut patient = Patient::new(first.into(), "Test".into(), age);
    patient.height_cm = Some(height_cm);
    patient.weight_kg = Some(weight_kg);
    patient
}

#[test]
fn test_alerts_from_mixed_snapshot() {
    let db = Database::open_in_memory().unwrap();
    // No measurements: no BMI
    db.insert_patient(&Patient::new("Child".into(), "Test".into(), 10)).unwrap();
    // 32 kg at 1 m gives BMI 32
    db.insert_patient(&measured("Heavy", 40, 100.0, 32.0)).unwrap();
    db.insert_patient(&measured("Elder", 70, 100.0, 22.0)).unwrap();

    let patients = db.list_patients().unwrap();
    let alerts = compute_alerts(&patients);

    assert_eq!(alerts.obesity_count, 1);
    assert_eq!(alerts.elderly_count, 1);
    assert_eq!(alerts.unassigned_specialty_count, 3);
}

#[test]
fn test_alerts_with_zero_bmi() {
    let mut child = Patient::new("Child".into(), "Test".into(), 10);
    child.bmi = Some(0.0);
    let mut heavy = Patient::new("Heavy".into(), "Test".into(), 40);
    heavy.bmi = Some(32.0);
    let mut elder = Patient::new("Elder".into(), "Test".into(), 70);
    elder.bmi = Some(22.0);

    let alerts = compute_alerts(&[child, heavy, elder]);
    assert_eq!(alerts.obesity_count, 1);
    assert_eq!(alerts.elderly_count, 1);
    assert_eq!(alerts.unassigned_specialty_count, 3);
}

#[test]
fn test_medication_tokens_are_normalized() {
    let mut patient = Patient::new("Awa".into(), "Traoré".into(), 50);
    patient.medications = Some("Doliprane, doliprane , Advil".into());

    let top = top_medications(&[patient], 10);
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].name.as_str(), top[0].count), ("Doliprane", 2));
    assert_eq!((top[1].name.as_str(), top[1].count), ("Advil", 1));
}

#[test]
fn test_full_dashboard_from_store() {
    let db = Database::open_in_memory().unwrap();
    db.insert_specialty("Cardiologie").unwrap();
    db.insert_specialty("Pédiatrie").unwrap();
    db.insert_specialty("Neurologie").unwrap();

    let mut a = measured("A", 10, 100.0, 17.0);
    a.primary_specialty = Some("Pédiatrie".into());
    let mut b = measured("B", 45, 100.0, 27.0);
    b.primary_specialty = Some("Cardiologie".into());
    b.medications = Some("Amlodipine, Aspirine".into());
    let mut c = measured("C", 68, 100.0, 31.0);
    c.primary_specialty = Some("Cardiologie".into());
    c.medications = Some("aspirine".into());
    let d = Patient::new("D".into(), "Test".into(), 25);

    for patient in [&a, &b, &c, &d] {
        db.insert_patient(patient).unwrap();
    }

    let patients = db.list_patients().unwrap();
    let specialties = db.list_specialties().unwrap();
    let summary = DashboardSummary::compute(&patients, &specialties, 10);

    assert_eq!(summary.total_patients, 4);
    assert_eq!(summary.total_specialties, 3);
    // (10 + 45 + 68 + 25) / 4 = 37
    assert_eq!(summary.averages.average_age, 37);
    // (17 + 27 + 31) / 3 = 25
    assert_eq!(summary.averages.average_bmi, Some(25.0));
    assert_eq!(summary.averages.average_bmi_label, "25.0");

    let share_total: u32 = summary.by_specialty.iter().map(|s| s.count).sum();
    assert_eq!(share_total, 4);
    let cardio = summary
        .by_specialty
        .iter()
        .find(|s| s.name == "Cardiologie")
        .unwrap();
    assert_eq!((cardio.count, cardio.percentage), (2, 50));
    assert!(summary.by_specialty.iter().any(|s| s.name == "Unspecified"));

    let bands: Vec<AgeBand> = summary.by_age_band.iter().map(|b| b.band).collect();
    assert_eq!(
        bands,
        vec![AgeBand::Minor, AgeBand::YoungAdult, AgeBand::Adult, AgeBand::Senior]
    );

    let bmi_bands: Vec<BmiBand> = summary.by_bmi_band.iter().map(|b| b.band).collect();
    assert_eq!(
        bmi_bands,
        vec![BmiBand::Underweight, BmiBand::Overweight, BmiBand::Obese]
    );

    assert_eq!(summary.top_medications[0].name, "Aspirine");
    assert_eq!(summary.top_medications[0].count, 2);
    assert_eq!(summary.alerts.obesity_count, 1);
    assert_eq!(summary.alerts.elderly_count, 1);
    assert_eq!(summary.alerts.unassigned_specialty_count, 1);
}

#[test]
fn test_empty_store_dashboard() {
    let db = Database::open_in_memory().unwrap();
    let summary = DashboardSummary::compute(&db.list_patients().unwrap(), &[], 10);

    assert_eq!(summary.averages.average_age, 0);
    assert_eq!(summary.averages.average_bmi, None);
    assert_eq!(summary.averages.average_bmi_label, "0");
    assert!(summary.top_medications.is_empty());
    assert!(summary.alerts.is_empty());
}

#[test]
fn test_dashboard_follows_updates() {
    let db = Database::open_in_memory().unwrap();
    let mut patient = measured("A", 40, 100.0, 22.0);
    db.insert_patient(&patient).unwrap();
    let rx = db.subscribe();

    patient.weight_kg = Some(35.0);
    db.update_patient(&patient).unwrap();
    assert!(rx.try_recv().is_ok());

    let summary = DashboardSummary::compute(&db.list_patients().unwrap(), &[], 10);
    assert_eq!(summary.alerts.obesity_count, 1);
    assert_eq!(summary.by_bmi_band[0].band, BmiBand::Obese);
}
