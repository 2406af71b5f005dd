//! Staff report assembler
//!
//! A one-profile information sheet for any staff member: personal details,
//! roles and qualifications.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use super::format::{format_stored_date, non_empty, report_filename};
use super::layout::{PageGeometry, RenderState, RenderedDocument, COLOR_TEXT};
use super::pdf::write_pdf;
use super::sections::*;
use super::{GeneratedReport, ReportError, ReportResult};
use crate::db::Database;
use crate::models::Staff;

pub const REPORT_TITLE: &str = "Staff Information Report";

pub fn fetch_staff(conn: &Connection, staff_id: &str) -> ReportResult<Staff> {
    Staff::get_by_id(conn, staff_id)?.ok_or_else(|| {
        warn!(staff_id, "Staff member not found");
        ReportError::NotFound("Staff member not found".to_string())
    })
}

/// `doctor` -> `Doctor`
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn add_numbered(state: &mut RenderState, items: &[&str], empty: &str) {
    if items.is_empty() {
        add_message(state, empty);
        return;
    }
    for (i, item) in items.iter().enumerate() {
        add_list_item(state, i + 1, item, COLOR_TEXT);
    }
}

/// Lay out the staff report
pub fn render_staff_report(staff: &Staff, now: DateTime<Utc>) -> RenderedDocument {
    let mut state = RenderState::new(PageGeometry::A4);

    add_header(&mut state, REPORT_TITLE, now);

    add_section_header(&mut state, "Personal Information", SectionIcon::Doctor);
    let joined = format_stored_date(&staff.created_at);
    add_info_row(&mut state, "Staff ID", Some(&staff.id));
    add_info_row(&mut state, "Name", Some(&staff.name));
    add_info_row(&mut state, "Designation", Some(&staff.designation));
    add_info_row(&mut state, "Department", Some(&staff.department));
    add_info_row(&mut state, "Email", Some(&staff.email));
    add_info_row(&mut state, "Phone", Some(&staff.contact));
    add_info_row(&mut state, "Status", Some(non_empty(Some(&staff.status)).unwrap_or("Active")));
    add_info_row(&mut state, "Joined Date", Some(&joined));
    add_spacing(&mut state, 10.0);

    let roles: Vec<String> = staff
        .roles
        .iter()
        .filter_map(|r| non_empty(Some(r)))
        .map(capitalize)
        .collect();
    let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
    add_section_header(&mut state, "Roles", SectionIcon::Metrics);
    add_numbered(&mut state, &roles, "No roles assigned");
    add_spacing(&mut state, 10.0);

    let qualifications: Vec<&str> = staff.qualifications.iter().filter_map(|q| non_empty(Some(q))).collect();
    add_section_header(&mut state, "Qualifications", SectionIcon::History);
    add_numbered(&mut state, &qualifications, "No qualifications recorded");

    finalize(state)
}

/// Fetch, lay out and serialize one staff report
pub fn generate_staff_report(db: &Database, staff_id: &str, now: DateTime<Utc>) -> ReportResult<GeneratedReport> {
    info!(staff_id, "Generating staff report");

    let staff = {
        let conn = db.get_conn()?;
        fetch_staff(&conn, staff_id)?
    };

    let document = render_staff_report(&staff, now);
    let name = non_empty(Some(&staff.name)).unwrap_or("Unknown");
    let title = format!("{} - {}", REPORT_TITLE, name);
    let bytes = write_pdf(&document, &title)?;

    let report = GeneratedReport {
        filename: report_filename(&format!("{} Staff", name), now),
        title,
        page_count: document.page_count(),
        bytes,
    };

    info!(
        staff_id,
        pages = report.page_count,
        bytes = report.bytes.len(),
        "Staff report generated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::StaffCreate;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn setup_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            Staff::create(
                conn,
                &StaffCreate {
                    id: "stf-1".into(),
                    name: "Dr. Priya Nair".into(),
                    designation: "Cardiologist".into(),
                    department: "Cardiology".into(),
                    contact: "9000000002".into(),
                    email: "priya@kgf.in".into(),
                    roles: vec!["doctor".into(), "admin".into()],
                    qualifications: vec!["MBBS".into(), "MD".into()],
                },
            )?;
            Staff::create(
                conn,
                &StaffCreate {
                    id: "stf-2".into(),
                    name: "Suresh".into(),
                    ..Default::default()
                },
            )?;
            Ok(())
        })
        .unwrap();
        db
    }

    fn fetch(db: &Database, id: &str) -> ReportResult<Staff> {
        let conn = db.get_conn()?;
        fetch_staff(&conn, id)
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("doctor"), "Doctor");
        assert_eq!(capitalize("Admin"), "Admin");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_unknown_staff_is_not_found() {
        let db = setup_db();
        match fetch(&db, "nobody") {
            Err(ReportError::NotFound(msg)) => assert_eq!(msg, "Staff member not found"),
            other => panic!("expected NotFound, got {:?}", other.map(|s| s.id)),
        }
    }

    #[test]
    fn test_staff_report_sections() {
        let db = setup_db();
        let doc = render_staff_report(&fetch(&db, "stf-1").unwrap(), now());

        for needle in [
            "Staff Information Report",
            "Personal Information",
            "Dr. Priya Nair",
            "Cardiology",
            "priya@kgf.in",
            "1. Doctor",
            "2. Admin",
            "2. MD",
        ] {
            assert!(doc.contains_text(needle), "missing {:?}", needle);
        }

        let texts = doc.texts();
        let status = texts.iter().position(|t| *t == "Status:").unwrap();
        assert_eq!(texts[status + 1], "Available");
    }

    #[test]
    fn test_sparse_profile_uses_placeholders() {
        let db = setup_db();
        let doc = render_staff_report(&fetch(&db, "stf-2").unwrap(), now());

        assert!(doc.contains_text("No roles assigned"));
        assert!(doc.contains_text("No qualifications recorded"));
        let texts = doc.texts();
        // designation, department, email and phone
        assert_eq!(texts.iter().filter(|t| **t == "N/A").count(), 4);
    }

    #[test]
    fn test_generate_staff_report_pdf() {
        let db = setup_db();
        let report = generate_staff_report(&db, "stf-1", now()).unwrap();

        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.page_count, 1);
        assert_eq!(report.filename, format!("Dr._Priya_Nair_Staff_Report_{}.pdf", now().timestamp_millis()));
        assert!(matches!(
            generate_staff_report(&db, "nobody", now()),
            Err(ReportError::NotFound(_))
        ));
    }
}
