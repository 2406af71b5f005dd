//! Appointment model
//!
//! Appointments link a patient to a doctor (keyed by the user-table id) at a
//! point in time.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Appointment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "No-Show")]
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::NoShow => "No-Show",
            AppointmentStatus::Rescheduled => "Rescheduled",
        }
    }

    /// Case-insensitive parse; legacy rows carry lowercase statuses
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Some(AppointmentStatus::Cancelled),
            "no-show" | "noshow" => Some(AppointmentStatus::NoShow),
            "rescheduled" => Some(AppointmentStatus::Rescheduled),
            _ => None,
        }
    }
}

/// An appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub appointment_code: Option<String>,
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_type: String,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub location: String,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new appointment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentCreate {
    pub id: String,
    pub appointment_code: Option<String>,
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_type: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Appointment {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;
        let status = AppointmentStatus::from_str(&status_str).unwrap_or_default();

        Ok(Self {
            id: row.get("id")?,
            appointment_code: row.get("appointment_code")?,
            patient_id: row.get("patient_id")?,
            doctor_id: row.get("doctor_id")?,
            appointment_type: row.get("appointment_type")?,
            start_at: row.get("start_at")?,
            end_at: row.get("end_at")?,
            location: row.get("location")?,
            status,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new appointment
    pub fn create(conn: &Connection, data: &AppointmentCreate) -> DbResult<Self> {
        let appointment_type = data
            .appointment_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Consultation".to_string());

        conn.execute(
            r#"
            INSERT INTO appointments (
                id, appointment_code, patient_id, doctor_id, appointment_type,
                start_at, end_at, location, status, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                data.id,
                data.appointment_code,
                data.patient_id,
                data.doctor_id,
                appointment_type,
                data.start_at,
                data.end_at,
                data.location.clone().unwrap_or_default(),
                data.status.as_str(),
                data.notes.clone().unwrap_or_default(),
            ],
        )?;

        Self::get_by_id(conn, &data.id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an appointment by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM appointments WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(appointment) => Ok(Some(appointment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A patient's appointments, newest first
    pub fn list_by_patient(
        conn: &Connection,
        patient_id: &str,
        limit: Option<i64>,
    ) -> DbResult<Vec<Self>> {
        let sql = match limit {
            Some(n) => format!(
                "SELECT * FROM appointments WHERE patient_id = ?1 ORDER BY start_at DESC, id LIMIT {}",
                n
            ),
            None => "SELECT * FROM appointments WHERE patient_id = ?1 ORDER BY start_at DESC, id"
                .to_string(),
        };

        let mut stmt = conn.prepare(&sql)?;
        let appointments = stmt
            .query_map([patient_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(appointments)
    }

    /// All of a doctor's appointments, oldest first
    pub fn list_by_doctor(conn: &Connection, doctor_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM appointments WHERE doctor_id = ?1 ORDER BY start_at, id",
        )?;
        let appointments = stmt
            .query_map([doctor_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Patient, PatientCreate};
    use chrono::TimeZone;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        Patient::create(
            &conn,
            &PatientCreate {
                id: "pat-1".into(),
                first_name: "Ravi".into(),
                ..Default::default()
            },
        )
        .unwrap();
        conn
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!(AppointmentStatus::from_str("completed"), Some(AppointmentStatus::Completed));
        assert_eq!(AppointmentStatus::from_str("CANCELLED"), Some(AppointmentStatus::Cancelled));
        assert_eq!(AppointmentStatus::from_str("No-Show"), Some(AppointmentStatus::NoShow));
        assert_eq!(AppointmentStatus::from_str("no_show"), Some(AppointmentStatus::NoShow));
        assert_eq!(AppointmentStatus::from_str("pending"), None);
    }

    #[test]
    fn test_create_defaults_type_to_consultation() {
        let conn = setup_db();
        let appt = Appointment::create(
            &conn,
            &AppointmentCreate {
                id: "apt-1".into(),
                patient_id: "pat-1".into(),
                doctor_id: "doc-1".into(),
                start_at: at(10, 9),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(appt.appointment_type, "Consultation");
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.start_at, at(10, 9));
    }

    #[test]
    fn test_list_by_patient_newest_first_with_limit() {
        let conn = setup_db();
        for (i, day) in [3, 9, 6].into_iter().enumerate() {
            Appointment::create(
                &conn,
                &AppointmentCreate {
                    id: format!("apt-{}", i),
                    patient_id: "pat-1".into(),
                    doctor_id: "doc-1".into(),
                    start_at: at(day, 10),
                    ..Default::default()
                },
            )
            .unwrap();
        }

        let listed = Appointment::list_by_patient(&conn, "pat-1", Some(2)).unwrap();
        let days: Vec<DateTime<Utc>> = listed.iter().map(|a| a.start_at).collect();
        assert_eq!(days, vec![at(9, 10), at(6, 10)]);

        let by_doctor = Appointment::list_by_doctor(&conn, "doc-1").unwrap();
        assert_eq!(by_doctor.len(), 3);
        assert_eq!(by_doctor[0].start_at, at(3, 10));
    }
}
