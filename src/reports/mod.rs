//! Report generation
//!
//! Assemblers fetch a snapshot from the store, compute statistics, and lay the
//! report out on buffered pages with the section builders. The finished page
//! descriptors are serialized to PDF bytes last, so page numbers ("Page i of
//! N") are known before anything is written.

pub mod doctor;
pub mod format;
pub mod layout;
pub mod metrics;
pub mod patient;
pub mod pdf;
pub mod sections;
pub mod staff;
pub mod stats;

use thiserror::Error;

use crate::db::DbError;

pub use doctor::{generate_doctor_report, resolve_doctor, DoctorProfile, DoctorReportInput, ResolvedDoctor};
pub use layout::{RenderState, RenderedDocument};
pub use patient::{generate_patient_report, PatientReportInput};
pub use staff::generate_staff_report;

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// The subject of the report does not exist; carries the display message
    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// A serialized report
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub filename: String,
    pub title: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}
