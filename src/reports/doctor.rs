//! Doctor report assembler
//!
//! A doctor may be addressed by a user id or by a staff profile id. Staff ids
//! are resolved to the matching doctor account by email, since appointments
//! and patient assignments reference user ids.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::format::{
    format_date, format_day, format_time, format_weekday, non_empty, report_filename,
    truncate_chars,
};
use super::layout::{PageGeometry, RenderState, RenderedDocument};
use super::pdf::write_pdf;
use super::sections::*;
use super::stats::{top_patients, DoctorStats, ReportWindow};
use super::{GeneratedReport, ReportError, ReportResult};
use crate::db::Database;
use crate::models::{Appointment, Patient, Staff, User, UserRole};

pub const REPORT_TITLE: &str = "Doctor Performance Report";

const TOP_PATIENT_LIMIT: usize = 10;
const PATIENT_NAME_MAX_CHARS: usize = 20;
const TOP_PATIENT_NAME_MAX_CHARS: usize = 30;
const REASON_MAX_CHARS: usize = 25;

/// Where the doctor's identity was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorSource {
    User,
    Staff,
}

/// Display fields for the Doctor Information section
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorProfile {
    /// The id the report was requested for
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub qualification: Option<String>,
}

/// A doctor profile plus the one id used for every appointment/patient query
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDoctor {
    pub profile: DoctorProfile,
    pub source: DoctorSource,
    pub query_id: String,
}

/// Resolve a doctor id against users first, then staff profiles
pub fn resolve_doctor(conn: &Connection, doctor_id: &str) -> ReportResult<ResolvedDoctor> {
    if let Some(user) = User::get_by_id(conn, doctor_id)? {
        debug!(doctor_id, "Doctor resolved from user account");
        return Ok(ResolvedDoctor {
            profile: DoctorProfile {
                id: doctor_id.to_string(),
                name: user.full_name(),
                email: non_empty(Some(&user.email)).map(String::from),
                phone: non_empty(user.phone.as_deref()).map(String::from),
                specialization: user.specialization().map(String::from),
                qualification: user.qualification().map(String::from),
            },
            source: DoctorSource::User,
            query_id: user.id,
        });
    }

    let staff = Staff::get_by_id(conn, doctor_id)?.ok_or_else(|| {
        warn!(doctor_id, "Doctor not found");
        ReportError::NotFound("Doctor not found".to_string())
    })?;

    let query_id = match non_empty(Some(&staff.email)) {
        Some(email) => match User::find_by_email_and_role(conn, email, UserRole::Doctor)? {
            Some(user) => {
                debug!(doctor_id, user_id = %user.id, "Staff profile linked to doctor account");
                user.id
            }
            None => doctor_id.to_string(),
        },
        None => doctor_id.to_string(),
    };

    let qualification = staff.qualifications.join(", ");
    Ok(ResolvedDoctor {
        profile: DoctorProfile {
            id: doctor_id.to_string(),
            name: staff.name.clone(),
            email: non_empty(Some(&staff.email)).map(String::from),
            phone: non_empty(Some(&staff.contact)).map(String::from),
            specialization: non_empty(Some(&staff.designation)).map(String::from),
            qualification: non_empty(Some(&qualification)).map(String::from),
        },
        source: DoctorSource::Staff,
        query_id,
    })
}

/// Everything the doctor report reads, fetched once
#[derive(Debug, Clone)]
pub struct DoctorReportInput {
    pub doctor: ResolvedDoctor,
    pub patients: Vec<Patient>,
    /// All of the doctor's appointments, oldest first
    pub appointments: Vec<Appointment>,
}

impl DoctorReportInput {
    pub fn fetch(conn: &Connection, doctor_id: &str) -> ReportResult<Self> {
        let doctor = resolve_doctor(conn, doctor_id)?;
        let patients = Patient::list_by_doctor(conn, &doctor.query_id)?;
        let appointments = Appointment::list_by_doctor(conn, &doctor.query_id)?;

        Ok(Self { doctor, patients, appointments })
    }

    fn patient_name(&self, patient_id: &str) -> String {
        self.patients
            .iter()
            .find(|p| p.id == patient_id)
            .map(Patient::full_name)
            .unwrap_or_else(|| "Unknown Patient".to_string())
    }
}

/// "Dr. Name" without doubling an existing prefix
fn display_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("Dr.") || name.starts_with("Dr ") {
        name.to_string()
    } else {
        format!("Dr. {}", name)
    }
}

/// Lay out the doctor report
pub fn render_doctor_report(input: &DoctorReportInput, now: DateTime<Utc>) -> RenderedDocument {
    let profile = &input.doctor.profile;
    let window = ReportWindow::trailing_week(now);
    let stats = DoctorStats::compute(&window, &input.patients, &input.appointments, now);
    let mut state = RenderState::new(PageGeometry::A4);

    add_header(&mut state, REPORT_TITLE, now);

    // Doctor information
    add_section_header(&mut state, "Doctor Information", SectionIcon::Doctor);
    add_info_row(&mut state, "Doctor ID", Some(&profile.id));
    add_info_row(&mut state, "Name", Some(&display_name(&profile.name)));
    add_info_row(&mut state, "Specialization", profile.specialization.as_deref());
    add_info_row(&mut state, "Email", profile.email.as_deref());
    add_info_row(&mut state, "Phone", profile.phone.as_deref());
    add_info_row(&mut state, "Qualification", profile.qualification.as_deref());
    add_spacing(&mut state, 10.0);

    // Report period
    add_section_header(&mut state, "Report Period", SectionIcon::Calendar);
    add_info_row(&mut state, "From", Some(&format_date(window.start)));
    add_info_row(&mut state, "To", Some(&format_date(window.end)));
    add_info_row(&mut state, "Duration", Some("7 Days (Current Week)"));
    add_spacing(&mut state, 10.0);

    // Overall statistics
    state.check_page_break(120.0);
    add_section_header(&mut state, "Overall Statistics", SectionIcon::Statistics);
    add_stats_cards(
        &mut state,
        &[
            StatCard::new("Total Patients", stats.total_patients),
            StatCard::new("This Week", stats.week_appointments),
            StatCard::new("Completed", stats.completed_this_week),
            StatCard::new("Upcoming", stats.upcoming_this_week),
        ],
    );

    // Performance metrics
    let metrics = InfoRowLayout { label_x: 60.0, value_x: 290.0 };
    add_section_header(&mut state, "Performance Metrics", SectionIcon::Metrics);
    add_info_row_with(&mut state, "Total Appointments (All Time)", Some(&stats.total_appointments.to_string()), metrics);
    add_info_row_with(&mut state, "Total Completed (All Time)", Some(&stats.total_completed.to_string()), metrics);
    add_info_row_with(&mut state, "Completion Rate", Some(&format!("{}%", stats.completion_rate())), metrics);
    add_info_row_with(&mut state, "Average Patients/Day (This Week)", Some(&stats.average_per_day()), metrics);
    add_info_row_with(&mut state, "Active Patients", Some(&stats.total_patients.to_string()), metrics);
    add_spacing(&mut state, 10.0);

    // This week's appointments
    state.check_page_break(100.0);
    add_section_header(&mut state, "This Week's Appointments", SectionIcon::Calendar);

    let week: Vec<&Appointment> = input.appointments.iter().filter(|a| window.contains(a.start_at)).collect();
    if week.is_empty() {
        add_message(&mut state, "No appointments scheduled for this week.");
        add_spacing(&mut state, 10.0);
    } else {
        let rows: Vec<Vec<String>> = week
            .iter()
            .map(|appt| {
                let reason = non_empty(Some(&appt.appointment_type)).unwrap_or("Consultation");
                vec![
                    format_date(appt.start_at),
                    format_time(appt.start_at),
                    truncate_chars(&input.patient_name(&appt.patient_id), PATIENT_NAME_MAX_CHARS),
                    truncate_chars(reason, REASON_MAX_CHARS),
                    appt.status.as_str().to_string(),
                ]
            })
            .collect();

        add_table(
            &mut state,
            &["Date", "Time", "Patient", "Reason", "Status"],
            &rows,
            &TableOptions {
                column_widths: Some(vec![100.0, 70.0, 110.0, 130.0, 85.0]),
                row_height: Some(25.0),
            },
        );
    }

    // Daily breakdown
    state.check_page_break(100.0);
    add_section_header(&mut state, "Daily Breakdown (This Week)", SectionIcon::Metrics);
    let daily_rows: Vec<Vec<String>> = stats
        .daily
        .iter()
        .map(|day| {
            vec![
                format!("{} ({})", format_weekday(day.date), format_day(day.date)),
                day.total.to_string(),
                day.completed.to_string(),
                day.scheduled.to_string(),
                day.cancelled.to_string(),
            ]
        })
        .collect();
    add_table(
        &mut state,
        &["Day", "Total", "Completed", "Scheduled", "Cancelled"],
        &daily_rows,
        &TableOptions {
            column_widths: Some(vec![150.0, 85.0, 95.0, 95.0, 95.0]),
            row_height: Some(25.0),
        },
    );

    // Patients
    if !input.patients.is_empty() {
        state.check_page_break(100.0);
        add_section_header(&mut state, "Active Patients (Sample)", SectionIcon::Patients);
        let rows: Vec<Vec<String>> = top_patients(&input.patients, &input.appointments, TOP_PATIENT_LIMIT)
            .iter()
            .map(|entry| {
                vec![
                    truncate_chars(&entry.patient.full_name(), TOP_PATIENT_NAME_MAX_CHARS),
                    entry.patient.age.map(|a| a.to_string()).unwrap_or_else(|| "N/A".to_string()),
                    non_empty(entry.patient.gender.as_deref()).unwrap_or("N/A").to_string(),
                    entry.visits.to_string(),
                ]
            })
            .collect();
        add_table(
            &mut state,
            &["Patient Name", "Age", "Gender", "Total Visits"],
            &rows,
            &TableOptions {
                column_widths: Some(vec![220.0, 80.0, 100.0, 100.0]),
                row_height: Some(25.0),
            },
        );
    }

    // Summary
    add_section_header(&mut state, "Summary", SectionIcon::Summary);
    add_paragraph(
        &mut state,
        &format!(
            "{} has handled {} appointments this week with {} completed consultations. \
             The doctor has {} active patients and maintains a {}% completion rate overall.",
            display_name(&profile.name),
            stats.week_appointments,
            stats.completed_this_week,
            stats.total_patients,
            stats.completion_rate(),
        ),
    );

    finalize(state)
}

/// Fetch, lay out and serialize one doctor report
pub fn generate_doctor_report(db: &Database, doctor_id: &str, now: DateTime<Utc>) -> ReportResult<GeneratedReport> {
    info!(doctor_id, "Generating doctor report");

    let input = {
        let conn = db.get_conn()?;
        DoctorReportInput::fetch(&conn, doctor_id)?
    };
    debug!(
        doctor_id,
        query_id = %input.doctor.query_id,
        patients = input.patients.len(),
        appointments = input.appointments.len(),
        "Doctor report input fetched"
    );

    let document = render_doctor_report(&input, now);
    let name = &input.doctor.profile.name;
    let title = format!("{} - {}", REPORT_TITLE, display_name(name));
    let bytes = write_pdf(&document, &title)?;

    let report = GeneratedReport {
        filename: report_filename(name, now),
        title,
        page_count: document.page_count(),
        bytes,
    };

    info!(
        doctor_id,
        pages = report.page_count,
        bytes = report.bytes.len(),
        "Doctor report generated"
    );
    Ok(report)
}
