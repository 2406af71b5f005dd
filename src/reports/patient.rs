//! Patient report assembler
//!
//! Patient details, assigned doctor, latest vitals, history, allergies and the
//! recent appointment history with a visit summary.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use super::format::{
    format_date, format_number, format_stored_date, format_time, non_empty, report_filename, truncate_chars,
};
use super::layout::{PageGeometry, RenderState, RenderedDocument, COLOR_DANGER, COLOR_TEXT};
use super::pdf::write_pdf;
use super::sections::*;
use super::stats::summarize_visits;
use super::{GeneratedReport, ReportError, ReportResult};
use crate::db::Database;
use crate::models::{Appointment, Patient, PatientVitals, User};

pub const REPORT_TITLE: &str = "Patient Medical Report";

/// Appointments fetched for the history section
pub const APPOINTMENT_HISTORY_LIMIT: i64 = 20;
/// Rows shown in the history table
const APPOINTMENT_TABLE_ROWS: usize = 15;
const REASON_MAX_CHARS: usize = 30;

/// Everything the patient report reads, fetched once
#[derive(Debug, Clone)]
pub struct PatientReportInput {
    pub patient: Patient,
    /// Newest first, at most [`APPOINTMENT_HISTORY_LIMIT`]
    pub appointments: Vec<Appointment>,
    pub doctor: Option<User>,
}

impl PatientReportInput {
    pub fn fetch(conn: &Connection, patient_id: &str) -> ReportResult<Self> {
        let patient = Patient::get_by_id(conn, patient_id)?.ok_or_else(|| {
            warn!(patient_id, "Patient not found");
            ReportError::NotFound("Patient not found".to_string())
        })?;

        let appointments = Appointment::list_by_patient(conn, &patient.id, Some(APPOINTMENT_HISTORY_LIMIT))?;

        let doctor = match non_empty(patient.doctor_id.as_deref()) {
            Some(doctor_id) => User::get_by_id(conn, doctor_id)?,
            None => None,
        };

        Ok(Self { patient, appointments, doctor })
    }
}

/// Reason column: notes, else the appointment type, else a generic label
fn appointment_reason(appt: &Appointment) -> String {
    let reason = non_empty(Some(&appt.notes))
        .or_else(|| non_empty(Some(&appt.appointment_type)))
        .unwrap_or("General checkup");
    truncate_chars(reason, REASON_MAX_CHARS)
}

fn vitals_rows(vitals: &PatientVitals) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(v) = vitals.height_cm {
        rows.push(("Height", format!("{} cm", format_number(v))));
    }
    if let Some(v) = vitals.weight_kg {
        rows.push(("Weight", format!("{} kg", format_number(v))));
    }
    if let Some(v) = vitals.bmi {
        rows.push(("BMI", format_number(v)));
    }
    if let Some(v) = non_empty(vitals.bp.as_deref()) {
        rows.push(("Blood Pressure", v.to_string()));
    }
    if let Some(v) = vitals.temp {
        rows.push(("Temperature", format!("{} F", format_number(v))));
    }
    if let Some(v) = vitals.pulse {
        rows.push(("Pulse", format!("{} bpm", format_number(v))));
    }
    if let Some(v) = vitals.spo2 {
        rows.push(("SpO2", format!("{}%", format_number(v))));
    }
    rows
}

/// Lay out the patient report
pub fn render_patient_report(input: &PatientReportInput, now: DateTime<Utc>) -> RenderedDocument {
    let patient = &input.patient;
    let mut state = RenderState::new(PageGeometry::A4);

    add_header(&mut state, REPORT_TITLE, now);

    // Patient information
    add_section_header(&mut state, "Patient Information", SectionIcon::Patient);
    let age = patient.age.map(|a| a.to_string());
    let address = patient
        .address
        .as_ref()
        .map(|a| a.display_parts())
        .filter(|parts| !parts.is_empty())
        .map(|parts| parts.join(", "));
    let registered = format_stored_date(&patient.created_at);

    add_info_row(&mut state, "Patient ID", Some(&patient.id));
    add_info_row(&mut state, "Full Name", Some(&patient.full_name()));
    add_info_row(&mut state, "Age", age.as_deref());
    add_info_row(&mut state, "Gender", patient.gender.as_deref());
    add_info_row(&mut state, "Blood Group", patient.blood_group.as_deref());
    add_info_row(&mut state, "Phone", patient.phone.as_deref());
    add_info_row(&mut state, "Email", patient.email.as_deref());
    if let Some(address) = &address {
        add_info_row(&mut state, "Address", Some(address));
    }
    add_info_row(&mut state, "Registration Date", Some(&registered));
    add_spacing(&mut state, 10.0);

    // Assigned doctor
    if let Some(doctor) = &input.doctor {
        add_section_header(&mut state, "Assigned Doctor", SectionIcon::Doctor);
        let contact = non_empty(Some(&doctor.email)).or_else(|| non_empty(doctor.phone.as_deref()));
        add_info_row(&mut state, "Doctor Name", Some(&format!("Dr. {}", doctor.full_name())));
        add_info_row(&mut state, "Specialization", doctor.specialization());
        add_info_row(&mut state, "Contact", contact);
        add_spacing(&mut state, 10.0);
    }

    // Vitals
    if let Some(vitals) = patient.vitals.as_ref().filter(|v| !v.is_empty()) {
        add_section_header(&mut state, "Vital Signs", SectionIcon::Vitals);
        for (label, value) in vitals_rows(vitals) {
            add_info_row(&mut state, label, Some(&value));
        }
        add_spacing(&mut state, 10.0);
    }

    // Medical history
    let history: Vec<&str> = patient.medical_history.iter().filter_map(|h| non_empty(Some(h))).collect();
    if !history.is_empty() {
        add_section_header(&mut state, "Medical History", SectionIcon::History);
        for (i, item) in history.iter().enumerate() {
            add_list_item(&mut state, i + 1, item, COLOR_TEXT);
        }
        add_spacing(&mut state, 10.0);
    }

    // Allergies
    let allergies: Vec<&str> = patient.allergies.iter().filter_map(|a| non_empty(Some(a))).collect();
    if !allergies.is_empty() {
        add_section_header(&mut state, "Known Allergies", SectionIcon::Allergy);
        for (i, item) in allergies.iter().enumerate() {
            add_list_item(&mut state, i + 1, item, COLOR_DANGER);
        }
        add_spacing(&mut state, 10.0);
    }

    // Appointment history
    let summary = summarize_visits(&input.appointments, now);
    if !input.appointments.is_empty() {
        state.check_page_break(150.0);
        add_section_header(&mut state, "Appointment History", SectionIcon::Calendar);
        add_stats_cards(
            &mut state,
            &[
                StatCard::new("Total", summary.total),
                StatCard::new("Completed", summary.completed),
                StatCard::new("Upcoming", summary.upcoming),
                StatCard::new("Cancelled", summary.cancelled),
            ],
        );

        let rows: Vec<Vec<String>> = input
            .appointments
            .iter()
            .take(APPOINTMENT_TABLE_ROWS)
            .map(|appt| {
                vec![
                    format_date(appt.start_at),
                    format_time(appt.start_at),
                    appointment_reason(appt),
                    appt.status.as_str().to_string(),
                ]
            })
            .collect();

        add_table(
            &mut state,
            &["Date", "Time", "Reason", "Status"],
            &rows,
            &TableOptions {
                column_widths: Some(vec![120.0, 80.0, 230.0, 100.0]),
                row_height: None,
            },
        );
    }

    // Summary
    let last_visit = input
        .appointments
        .first()
        .map(|a| format_date(a.start_at))
        .unwrap_or_else(|| "No visits recorded".to_string());

    add_section_header(&mut state, "Summary", SectionIcon::Summary);
    add_info_row(&mut state, "Last Visit", Some(&last_visit));
    add_info_row(&mut state, "Total Visits", Some(&summary.total.to_string()));
    add_info_row(&mut state, "Patient Status", Some(non_empty(patient.status.as_deref()).unwrap_or("Active")));

    finalize(state)
}

/// File name stem: `First_Last`, or `First_Report` without a last name
fn filename_stem(patient: &Patient) -> String {
    let last = non_empty(Some(&patient.last_name)).unwrap_or("Report");
    format!("{}_{}", patient.first_name.trim(), last)
}

/// Fetch, lay out and serialize one patient report
pub fn generate_patient_report(db: &Database, patient_id: &str, now: DateTime<Utc>) -> ReportResult<GeneratedReport> {
    info!(patient_id, "Generating patient report");

    let input = {
        let conn = db.get_conn()?;
        PatientReportInput::fetch(&conn, patient_id)?
    };

    let document = render_patient_report(&input, now);
    let title = format!("{} - {}", REPORT_TITLE, input.patient.full_name());
    let bytes = write_pdf(&document, &title)?;

    let report = GeneratedReport {
        filename: report_filename(&filename_stem(&input.patient), now),
        title,
        page_count: document.page_count(),
        bytes,
    };

    info!(
        patient_id,
        pages = report.page_count,
        bytes = report.bytes.len(),
        "Patient report generated"
    );
    Ok(report)
}
