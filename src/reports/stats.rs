//! Derived statistics
//!
//! Pure functions over a fetched snapshot. Nothing here touches the store or
//! the layout.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::models::{Appointment, AppointmentStatus, Patient};

/// Visit counts for a patient report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitSummary {
    pub total: usize,
    pub completed: usize,
    pub upcoming: usize,
    pub cancelled: usize,
}

/// Upcoming means still scheduled and starting after `now`
pub fn is_upcoming(appointment: &Appointment, now: DateTime<Utc>) -> bool {
    appointment.status == AppointmentStatus::Scheduled && appointment.start_at > now
}

pub fn summarize_visits(appointments: &[Appointment], now: DateTime<Utc>) -> VisitSummary {
    let mut summary = VisitSummary {
        total: appointments.len(),
        ..Default::default()
    };
    for appt in appointments {
        match appt.status {
            AppointmentStatus::Completed => summary.completed += 1,
            AppointmentStatus::Cancelled => summary.cancelled += 1,
            _ => {}
        }
        if is_upcoming(appt, now) {
            summary.upcoming += 1;
        }
    }
    summary
}

/// `completed / total` as a percentage with one decimal, `"0"` when empty
pub fn completion_rate(completed: usize, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.1}", completed as f64 / total as f64 * 100.0)
}

// ============================================================================
// Weekly window
// ============================================================================

/// The seven calendar days ending today (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub const DAYS: u64 = 7;

    /// `[00:00 of today-6, 23:59:59 of today]`
    pub fn trailing_week(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let first = today.checked_sub_days(Days::new(Self::DAYS - 1)).unwrap_or(today);
        let start = first.and_time(NaiveTime::MIN).and_utc();
        let end = today.and_time(NaiveTime::MIN).and_utc() + TimeDelta::seconds(86_399);
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// Every calendar day of the window, oldest first
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .date_naive()
            .iter_days()
            .take_while(|day| *day <= self.end.date_naive())
            .collect()
    }
}

/// Appointment counts for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub scheduled: usize,
    pub cancelled: usize,
}

impl DailyCount {
    fn empty(date: NaiveDate) -> Self {
        Self { date, total: 0, completed: 0, scheduled: 0, cancelled: 0 }
    }
}

/// One bucket per day of the window, including empty days
pub fn daily_breakdown(window: &ReportWindow, appointments: &[Appointment]) -> Vec<DailyCount> {
    let mut buckets: Vec<DailyCount> = window.days().into_iter().map(DailyCount::empty).collect();

    for appt in appointments.iter().filter(|a| window.contains(a.start_at)) {
        let day = appt.start_at.date_naive();
        if let Some(bucket) = buckets.iter_mut().find(|b| b.date == day) {
            bucket.total += 1;
            match appt.status {
                AppointmentStatus::Completed => bucket.completed += 1,
                AppointmentStatus::Scheduled => bucket.scheduled += 1,
                AppointmentStatus::Cancelled => bucket.cancelled += 1,
                _ => {}
            }
        }
    }

    buckets
}

// ============================================================================
// Doctor statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorStats {
    pub total_patients: usize,
    pub week_appointments: usize,
    pub completed_this_week: usize,
    pub cancelled_this_week: usize,
    pub upcoming_this_week: usize,
    pub total_appointments: usize,
    pub total_completed: usize,
    pub daily: Vec<DailyCount>,
}

impl DoctorStats {
    pub fn compute(
        window: &ReportWindow,
        patients: &[Patient],
        appointments: &[Appointment],
        now: DateTime<Utc>,
    ) -> Self {
        let week: Vec<&Appointment> = appointments.iter().filter(|a| window.contains(a.start_at)).collect();
        let count_status = |list: &[&Appointment], status: AppointmentStatus| list.iter().filter(|a| a.status == status).count();

        Self {
            total_patients: patients.len(),
            week_appointments: week.len(),
            completed_this_week: count_status(&week, AppointmentStatus::Completed),
            cancelled_this_week: count_status(&week, AppointmentStatus::Cancelled),
            upcoming_this_week: week.iter().filter(|a| is_upcoming(a, now)).count(),
            total_appointments: appointments.len(),
            total_completed: appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Completed)
                .count(),
            daily: daily_breakdown(window, appointments),
        }
    }

    /// All-time completion rate
    pub fn completion_rate(&self) -> String {
        completion_rate(self.total_completed, self.total_appointments)
    }

    /// Week appointments spread over seven days, one decimal
    pub fn average_per_day(&self) -> String {
        format!("{:.1}", self.week_appointments as f64 / ReportWindow::DAYS as f64)
    }
}

/// A patient with their all-time visit count
#[derive(Debug, Clone, Copy)]
pub struct PatientVisits<'a> {
    pub patient: &'a Patient,
    pub visits: usize,
}

/// Patients ordered by visit count, most first; ties keep input order
pub fn top_patients<'a>(patients: &'a [Patient], appointments: &[Appointment], limit: usize) -> Vec<PatientVisits<'a>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for appt in appointments {
        *counts.entry(appt.patient_id.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<PatientVisits<'a>> = patients
        .iter()
        .map(|patient| PatientVisits {
            patient,
            visits: counts.get(patient.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    ranked.sort_by(|a, b| b.visits.cmp(&a.visits));
    ranked.truncate(limit);
    ranked
}
