//! Report generation tools
//!
//! Render patient, doctor and staff PDF reports and write them to the report
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::db::Database;
use crate::reports::{self, GeneratedReport, ReportResult};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub filename: String,
    pub page_count: usize,
    pub size_bytes: usize,
    pub message: String,
}

// ============================================================================
// File Output
// ============================================================================

/// Write a generated report into `output_dir`, creating it if needed
pub fn write_report(report: &GeneratedReport, output_dir: &Path) -> ReportResult<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&report.filename);
    fs::write(&path, &report.bytes)?;
    Ok(path)
}

fn respond(report: ReportResult<GeneratedReport>, output_dir: &Path, kind: &str) -> Result<GenerateReportResponse, String> {
    let report = report.map_err(|e| e.to_string())?;
    let path = write_report(&report, output_dir).map_err(|e| {
        error!(error = %e, dir = %output_dir.display(), "Failed to write report");
        e.to_string()
    })?;

    Ok(GenerateReportResponse {
        success: true,
        file_path: path.display().to_string(),
        filename: report.filename.clone(),
        page_count: report.page_count,
        size_bytes: report.bytes.len(),
        message: format!(
            "{} report generated successfully ({} page{})",
            kind,
            report.page_count,
            if report.page_count == 1 { "" } else { "s" }
        ),
    })
}

// ============================================================================
// Tools
// ============================================================================

/// Generate a patient medical report
pub fn generate_patient_report(
    db: &Database,
    patient_id: &str,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> Result<GenerateReportResponse, String> {
    respond(reports::generate_patient_report(db, patient_id, now), output_dir, "Patient")
}

/// Generate a doctor performance report
pub fn generate_doctor_report(
    db: &Database,
    doctor_id: &str,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> Result<GenerateReportResponse, String> {
    respond(reports::generate_doctor_report(db, doctor_id, now), output_dir, "Doctor")
}

/// Generate a staff information report
pub fn generate_staff_report(
    db: &Database,
    staff_id: &str,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> Result<GenerateReportResponse, String> {
    respond(reports::generate_staff_report(db, staff_id, now), output_dir, "Staff")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Patient, PatientCreate, Staff, StaffCreate, User, UserCreate, UserRole};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn setup_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            User::create(
                conn,
                &UserCreate {
                    id: "doc-1".into(),
                    role: UserRole::Doctor,
                    first_name: "Anand".into(),
                    last_name: "Kumar".into(),
                    email: "anand@kgf.in".into(),
                    phone: None,
                    metadata: json!({}),
                },
            )?;
            Patient::create(
                conn,
                &PatientCreate {
                    id: "pat-1".into(),
                    first_name: "Ravi".into(),
                    last_name: "Shankar".into(),
                    doctor_id: Some("doc-1".into()),
                    ..Default::default()
                },
            )?;
            Staff::create(
                conn,
                &StaffCreate {
                    id: "stf-1".into(),
                    name: "Lakshmi R".into(),
                    designation: "Head Nurse".into(),
                    ..Default::default()
                },
            )?;
            Ok(())
        })
        .unwrap();
        db
    }

    #[test]
    fn test_patient_report_written_to_output_dir() {
        let db = setup_db();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let response = generate_patient_report(&db, "pat-1", &out, now()).unwrap();
        assert!(response.success);
        assert!(response.filename.starts_with("Ravi_Shankar_Report_"));

        let bytes = fs::read(&response.file_path).unwrap();
        assert_eq!(bytes.len(), response.size_bytes);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_doctor_report_written_to_output_dir() {
        let db = setup_db();
        let dir = tempfile::tempdir().unwrap();

        let response = generate_doctor_report(&db, "doc-1", dir.path(), now()).unwrap();
        assert!(Path::new(&response.file_path).exists());
        assert!(response.page_count >= 1);
    }

    #[test]
    fn test_staff_report_written_to_output_dir() {
        let db = setup_db();
        let dir = tempfile::tempdir().unwrap();

        let response = generate_staff_report(&db, "stf-1", dir.path(), now()).unwrap();
        assert!(response.filename.starts_with("Lakshmi_R_Staff_Report_"));
        assert_eq!(response.message, "Staff report generated successfully (1 page)");
        assert!(Path::new(&response.file_path).exists());
    }

    #[test]
    fn test_missing_subjects_return_messages() {
        let db = setup_db();
        let dir = tempfile::tempdir().unwrap();

        let err = generate_patient_report(&db, "nope", dir.path(), now()).unwrap_err();
        assert_eq!(err, "Patient not found");
        let err = generate_doctor_report(&db, "nope", dir.path(), now()).unwrap_err();
        assert_eq!(err, "Doctor not found");
        let err = generate_staff_report(&db, "nope", dir.path(), now()).unwrap_err();
        assert_eq!(err, "Staff member not found");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
