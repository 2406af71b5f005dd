//! Patient model
//!
//! Canonical patient records. Address, vitals and the free-text history lists
//! are nested documents stored as JSON columns.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{json_column, optional_json_column};
use crate::db::DbResult;

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub house_no: Option<String>,
    pub street: Option<String>,
    pub line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Non-empty parts in display order (country is not printed)
    pub fn display_parts(&self) -> Vec<&str> {
        [
            &self.house_no,
            &self.street,
            &self.line1,
            &self.city,
            &self.state,
            &self.pincode,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
    }
}

/// Latest recorded vital signs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientVitals {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub bp: Option<String>,
    /// Degrees Fahrenheit
    pub temp: Option<f64>,
    pub pulse: Option<f64>,
    pub spo2: Option<f64>,
}

impl PatientVitals {
    pub fn is_empty(&self) -> bool {
        self.height_cm.is_none()
            && self.weight_kg.is_none()
            && self.bmi.is_none()
            && self.bp.as_deref().map_or(true, str::is_empty)
            && self.temp.is_none()
            && self.pulse.is_none()
            && self.spo2.is_none()
    }
}

/// A patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub vitals: Option<PatientVitals>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
    pub notes: String,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientCreate {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub vitals: Option<PatientVitals>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl Patient {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            date_of_birth: row.get("date_of_birth")?,
            age: row.get("age")?,
            gender: row.get("gender")?,
            blood_group: row.get("blood_group")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            address: optional_json_column(row, "address")?,
            vitals: optional_json_column(row, "vitals")?,
            medical_history: json_column(row, "medical_history")?,
            allergies: json_column(row, "allergies")?,
            doctor_id: row.get("doctor_id")?,
            status: row.get("status")?,
            notes: row.get("notes")?,
            deleted_at: row.get("deleted_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// "First Last", without a trailing space when the last name is empty
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Create a new patient
    pub fn create(conn: &Connection, data: &PatientCreate) -> DbResult<Self> {
        let address = data.address.as_ref().map(serde_json::to_string).transpose()?;
        let vitals = data.vitals.as_ref().map(serde_json::to_string).transpose()?;
        let medical_history = serde_json::to_string(&data.medical_history)?;
        let allergies = serde_json::to_string(&data.allergies)?;

        conn.execute(
            r#"
            INSERT INTO patients (
                id, first_name, last_name, date_of_birth, age, gender, blood_group,
                phone, email, address, vitals, medical_history, allergies,
                doctor_id, status, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                data.id,
                data.first_name,
                data.last_name,
                data.date_of_birth,
                data.age,
                data.gender,
                data.blood_group,
                data.phone,
                data.email,
                address,
                vitals,
                medical_history,
                allergies,
                data.doctor_id,
                data.status,
                data.notes.clone().unwrap_or_default(),
            ],
        )?;

        Self::get_by_id(conn, &data.id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a patient by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM patients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List the non-deleted patients assigned to a doctor (users.id)
    pub fn list_by_doctor(conn: &Connection, doctor_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM patients
             WHERE doctor_id = ?1 AND deleted_at IS NULL
             ORDER BY first_name, last_name, id",
        )?;
        let patients = stmt
            .query_map([doctor_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(patients)
    }
}
