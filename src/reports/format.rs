//! Display formatting shared by the report assemblers

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// `10/7/2026`
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

pub fn format_day(day: NaiveDate) -> String {
    day.format("%-m/%-d/%Y").to_string()
}

/// `Wed, Oct 7` style label for the daily breakdown
pub fn format_weekday(day: NaiveDate) -> String {
    day.format("%a, %b %-d").to_string()
}

/// `09:30 AM`
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

/// `October 7, 2026 at 09:30 AM`, used in the page header
pub fn format_generated_at(at: DateTime<Utc>) -> String {
    format!("{} at {}", at.format("%B %-d, %Y"), format_time(at))
}

/// Render a stored timestamp or date column as a short date.
///
/// Accepts RFC 3339, SQLite's `datetime('now')` layout and plain dates;
/// anything else is shown as stored.
pub fn format_stored_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return format_date(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return format_date(at.and_utc());
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return format_day(day);
    }
    raw.to_string()
}

/// Whole numbers without a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Blank strings count as absent
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Make a name safe for use in a file name: whitespace runs become `_` and
/// anything outside `[A-Za-z0-9_.-]` is dropped
pub fn sanitize_file_stem(name: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// `<stem>_Report_<unix millis>.pdf`
pub fn report_filename(stem: &str, now: DateTime<Utc>) -> String {
    let stem = sanitize_file_stem(stem);
    let stem = if stem.is_empty() { "Unknown".to_string() } else { stem };
    format!("{}_Report_{}.pdf", stem, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 7, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_dates_and_times() {
        assert_eq!(format_date(now()), "10/7/2026");
        assert_eq!(format_time(now()), "02:05 PM");
        assert_eq!(format_generated_at(now()), "October 7, 2026 at 02:05 PM");
        assert_eq!(format_weekday(now().date_naive()), "Wed, Oct 7");
    }

    #[test]
    fn test_stored_dates() {
        assert_eq!(format_stored_date("2026-01-15 08:00:00"), "1/15/2026");
        assert_eq!(format_stored_date("1990-05-02"), "5/2/1990");
        assert_eq!(format_stored_date("2026-03-01T10:00:00Z"), "3/1/2026");
        assert_eq!(format_stored_date("sometime"), "sometime");
    }

    #[test]
    fn test_format_number_trims_zero_fraction() {
        assert_eq!(format_number(72.0), "72");
        assert_eq!(format_number(98.6), "98.6");
        assert_eq!(format_number(22.857), "22.86");
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(
            report_filename("Ravi  Shankar", now()),
            format!("Ravi_Shankar_Report_{}.pdf", now().timestamp_millis())
        );
        assert_eq!(
            report_filename("Dr. Anand/Kumar", now()),
            format!("Dr._AnandKumar_Report_{}.pdf", now().timestamp_millis())
        );
    }

    #[test]
    fn test_truncate_and_non_empty() {
        assert_eq!(truncate_chars("Follow-up", 6), "Follow");
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" x ")), Some("x"));
    }
}
