//! Inventory classification and dispensation through the record store.

use patient_records_core::inventory::{inventory_counts, restock_alerts, DispensationRejected};
use patient_records_core::{
    ChangeAction, ChangeKind, Database, DbError, Medication, MedicationFamily, PrescriptionLine,
    StockStatus,
};

fn setup() -> (Database, MedicationFamily) {
    let db = Database::open_in_memory().unwrap();
    let family = db.insert_medication_family("Antalgiques", None).unwrap();
    (db, family)
}

fn add(db: &Database, family: &MedicationFamily, name: &str, stock: u32, min_stock: u32) -> Medication {
    let mut med = Medication::new(name.into(), family.id.clone(), "500mg".into(), "comprimé".into());
    med.stock = stock;
    med.min_stock = min_stock;
    db.insert_medication(&med).unwrap();
    med
}

#[test]
fn test_restock_alerts_from_store() {
    let (db, family) = setup();
    add(&db, &family, "Paracetamol", 0, 10);
    add(&db, &family, "Ibuprofene", 3, 10);
    add(&db, &family, "Aspirine", 50, 10);

    let medications = db.list_medications().unwrap();
    let alerts = restock_alerts(&medications);

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].medication.name, "Paracetamol");
    assert_eq!(alerts[0].status, StockStatus::OutOfStock);
    assert_eq!(alerts[1].medication.name, "Ibuprofene");
    assert_eq!(alerts[1].status, StockStatus::Low);
    assert_eq!(alerts[1].medication.family_name(), Some("Antalgiques"));

    let counts = inventory_counts(&medications);
    assert_eq!((counts.out_of_stock, counts.low, counts.available), (1, 1, 1));
}

#[test]
fn test_dispensing_moves_item_into_alerts() {
    let (mut db, family) = setup();
    let med = add(&db, &family, "Paracetamol", 12, 10);
    assert!(restock_alerts(&db.list_medications().unwrap()).is_empty());

    let outcome = db
        .dispense_prescription(&[PrescriptionLine {
            medication_id: med.id.clone(),
            quantity: 5,
        }])
        .unwrap();
    assert!(outcome.is_fully_dispensed());
    assert_eq!(outcome.dispensed[0].previous_stock, 12);
    assert_eq!(outcome.dispensed[0].new_stock, 7);

    let alerts = restock_alerts(&db.list_medications().unwrap());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].status, StockStatus::Low);
}

#[test]
fn test_dispensing_whole_stock_then_nothing() {
    let (mut db, family) = setup();
    let med = add(&db, &family, "Paracetamol", 3, 10);

    let outcome = db
        .dispense_prescription(&[PrescriptionLine {
            medication_id: med.id.clone(),
            quantity: 3,
        }])
        .unwrap();
    assert_eq!(outcome.dispensed[0].new_stock, 0);

    let outcome = db.dispense_prescription(&[PrescriptionLine::single(&med.id)]).unwrap();
    assert_eq!(
        outcome.rejected[0].reason,
        DispensationRejected::InsufficientStock {
            requested: 1,
            available: 0
        }
    );
    assert_eq!(db.get_medication(&med.id).unwrap().unwrap().stock, 0);
}

#[test]
fn test_zero_quantity_rejected() {
    let (mut db, family) = setup();
    let med = add(&db, &family, "Paracetamol", 3, 10);

    let outcome = db
        .dispense_prescription(&[PrescriptionLine {
            medication_id: med.id.clone(),
            quantity: 0,
        }])
        .unwrap();
    assert_eq!(outcome.rejected[0].reason, DispensationRejected::ZeroQuantity);
    assert!(outcome.dispensed.is_empty());
}

#[test]
fn test_dispensation_publishes_medication_change() {
    let (mut db, family) = setup();
    let med = add(&db, &family, "Paracetamol", 10, 5);
    let rx = db.subscribe();

    db.dispense_prescription(&[
        PrescriptionLine::single(&med.id),
        PrescriptionLine::single(&med.id),
    ])
    .unwrap();

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Medications);
    assert_eq!(events[0].action, ChangeAction::Updated);
    assert_eq!(db.get_medication(&med.id).unwrap().unwrap().stock, 8);
}

#[test]
fn test_family_and_stock_writes_publish_one_event_each() {
    let (db, family) = setup();
    let med = add(&db, &family, "Paracetamol", 10, 5);
    let rx = db.subscribe();

    let antibiotics = db.insert_medication_family("Antibiotiques", None).unwrap();
    assert!(db.insert_medication_family("Antibiotiques", None).is_err());
    assert!(db.update_medication_stock(&med.id, 40).unwrap());
    assert!(!db.update_medication_stock("missing", 1).unwrap());

    let events: Vec<_> = rx
        .try_iter()
        .map(|e| (e.kind, e.action, e.record_id))
        .collect();
    assert_eq!(
        events,
        vec![
            (ChangeKind::MedicationFamilies, ChangeAction::Inserted, Some(antibiotics.id)),
            (ChangeKind::Medications, ChangeAction::Updated, Some(med.id)),
        ]
    );
}

#[test]
fn test_duplicate_family_name() {
    let (db, _) = setup();
    let result = db.insert_medication_family(" Antalgiques ", Some("doublon"));
    assert!(matches!(result, Err(DbError::Constraint(_))));
}
