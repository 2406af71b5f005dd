//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Highest applied migration, 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Whether the schema is at the version this build expects
pub fn is_current(conn: &Connection) -> DbResult<bool> {
    Ok(get_schema_version(conn)? == SCHEMA_VERSION)
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Authenticated accounts (admins, doctors, pharmacists, ...)
        -- ============================================
        CREATE TABLE users (
            id TEXT PRIMARY KEY,
            role TEXT NOT NULL CHECK(role IN ('superadmin', 'admin', 'doctor', 'pharmacist', 'pathologist', 'reception')),
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL UNIQUE,           -- stored lowercase
            phone TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            metadata TEXT NOT NULL DEFAULT '{}',  -- JSON object (specialization, qualification, ...)
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_users_role ON users(role);

        -- ============================================
        -- STAFF
        -- Staff profiles, keyed independently of users
        -- ============================================
        CREATE TABLE staff (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            designation TEXT NOT NULL DEFAULT '',
            department TEXT NOT NULL DEFAULT '',
            contact TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',       -- stored lowercase
            roles TEXT NOT NULL DEFAULT '[]',     -- JSON array
            qualifications TEXT NOT NULL DEFAULT '[]', -- JSON array
            status TEXT NOT NULL DEFAULT 'Available',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_staff_email ON staff(email);

        -- ============================================
        -- PATIENTS
        -- Canonical patient records; nested documents kept as JSON
        -- ============================================
        CREATE TABLE patients (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL DEFAULT '',
            date_of_birth TEXT,                   -- YYYY-MM-DD
            age INTEGER,
            gender TEXT CHECK(gender IN ('Male', 'Female', 'Other')),
            blood_group TEXT,
            phone TEXT,
            email TEXT,
            address TEXT,                         -- JSON object
            vitals TEXT,                          -- JSON object
            medical_history TEXT NOT NULL DEFAULT '[]',
            allergies TEXT NOT NULL DEFAULT '[]',
            doctor_id TEXT,                       -- users.id
            status TEXT,
            notes TEXT NOT NULL DEFAULT '',
            deleted_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_patients_doctor ON patients(doctor_id);
        CREATE INDEX idx_patients_name ON patients(first_name);

        -- ============================================
        -- APPOINTMENTS
        -- ============================================
        CREATE TABLE appointments (
            id TEXT PRIMARY KEY,
            appointment_code TEXT UNIQUE,
            patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
            doctor_id TEXT NOT NULL,              -- users.id
            appointment_type TEXT NOT NULL DEFAULT 'Consultation',
            start_at TEXT NOT NULL,
            end_at TEXT,
            location TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'Scheduled',
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_appointments_patient ON appointments(patient_id, start_at);
        CREATE INDEX idx_appointments_doctor ON appointments(doctor_id, start_at);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(is_current(&conn).unwrap());
    }
}
