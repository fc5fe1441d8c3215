//! SQLite schema definition.

/// Complete database schema for patient-records.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Specialties
-- ============================================================================

CREATE TABLE IF NOT EXISTS specialties (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    blood_glucose TEXT,
    blood_pressure TEXT,                         -- "systolic/diastolic"
    height_cm REAL CHECK (height_cm IS NULL OR height_cm >= 0),
    weight_kg REAL CHECK (weight_kg IS NULL OR weight_kg >= 0),
    bmi REAL,                                    -- derived from height/weight on write
    primary_specialty TEXT,                      -- denormalized, free text
    medications TEXT,                            -- comma-separated names
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(last_name, first_name);

-- Many-to-many assignment of specialties
CREATE TABLE IF NOT EXISTS patient_specialties (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    specialty_id TEXT NOT NULL REFERENCES specialties(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (patient_id, specialty_id)
);

CREATE INDEX IF NOT EXISTS idx_patient_specialties_specialty ON patient_specialties(specialty_id);

-- ============================================================================
-- Pharmacy
-- ============================================================================

CREATE TABLE IF NOT EXISTS medication_families (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    family_id TEXT NOT NULL REFERENCES medication_families(id),
    dosage TEXT NOT NULL,
    form TEXT NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    min_stock INTEGER NOT NULL DEFAULT 10 CHECK (min_stock >= 0),
    unit_price REAL NOT NULL DEFAULT 0 CHECK (unit_price >= 0),
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_family ON medications(family_id);
CREATE INDEX IF NOT EXISTS idx_medications_name ON medications(name);
"#;
