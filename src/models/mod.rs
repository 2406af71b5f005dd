//! Data models
//!
//! Rust structs representing database entities.

mod appointment;
mod patient;
mod staff;
mod user;

pub use appointment::{Appointment, AppointmentCreate, AppointmentStatus};
pub use patient::{Address, Patient, PatientCreate, PatientVitals};
pub use staff::{Staff, StaffCreate};
pub use user::{User, UserCreate, UserRole};

use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

/// Decode a TEXT column holding a JSON document
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row, name: &str) -> rusqlite::Result<T> {
    let idx = row.as_ref().column_index(name)?;
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Like [`json_column`] for nullable columns; NULL and empty text are `None`
pub(crate) fn optional_json_column<T: DeserializeOwned>(
    row: &Row,
    name: &str,
) -> rusqlite::Result<Option<T>> {
    let idx = row.as_ref().column_index(name)?;
    let raw: Option<String> = row.get(idx)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}
