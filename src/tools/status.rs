//! HMS Status Tool
//!
//! Provides runtime status information about the report service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Report tool instructions for AI assistants
pub const REPORT_INSTRUCTIONS: &str = r#"
# HMS Report Instructions

This server renders hospital PDF reports from the HMS database.

## Tools

| Task | Tool |
|------|------|
| Patient medical report | `generate_patient_report` |
| Doctor performance report | `generate_doctor_report` |
| Staff information report | `generate_staff_report` |
| Service status | `hms_status` |

## Patient Reports

```
generate_patient_report(patient_id: "pat-1001")
```

Includes patient details, the assigned doctor, vital signs, medical history,
allergies, appointment statistics with the 15 most recent appointments, and a
visit summary.

## Doctor Reports

```
generate_doctor_report(doctor_id: "doc-2001")
```

The id may be a doctor's user id or a staff profile id. Staff profiles are
matched to the doctor account with the same email, so both ids produce the
same statistics. The report covers the seven days ending today (UTC).

## Staff Reports

```
generate_staff_report(staff_id: "staff-3001")
```

Personal details, roles and qualifications of one staff profile.

## Output

Both tools write the PDF into the report directory (or `output_dir` when
given) and return the file path and page count.
"#;

/// Runtime status of the HMS report service
#[derive(Debug, Clone, Serialize)]
pub struct HmsStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Report output
    pub report_dir: String,
    pub reports_generated: u64,
    pub report_failures: u64,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    report_dir: PathBuf,
    reports_generated: u64,
    report_failures: u64,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, report_dir: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            report_dir,
            reports_generated: 0,
            report_failures: 0,
        }
    }

    /// Count one report attempt
    pub fn record_report(&mut self, success: bool) {
        if success {
            self.reports_generated += 1;
        } else {
            self.report_failures += 1;
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> HmsStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        HmsStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            report_dir: self.report_dir.display().to_string(),
            reports_generated: self.reports_generated,
            report_failures: self.report_failures,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_reports() {
        let mut tracker = StatusTracker::new(PathBuf::from("/nonexistent/hms.db"), PathBuf::from("reports"));
        tracker.record_report(true);
        tracker.record_report(true);
        tracker.record_report(false);

        let status = tracker.get_status();
        assert_eq!(status.reports_generated, 2);
        assert_eq!(status.report_failures, 1);
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.report_dir, "reports");
    }
}
