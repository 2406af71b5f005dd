//! HMS MCP Server Implementation
//!
//! Implements the MCP server with the report tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::tools::reports::{self, GenerateReportResponse};
use crate::tools::status::StatusTracker;

/// HMS MCP Service
#[derive(Clone)]
pub struct HmsService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    report_dir: PathBuf,
    tool_router: ToolRouter<HmsService>,
}

impl HmsService {
    pub fn new(database_path: PathBuf, report_dir: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                database_path,
                report_dir.clone(),
            ))),
            database,
            report_dir,
            tool_router: Self::tool_router(),
        }
    }

    /// Directory reports are written to when no `output_dir` is given
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    fn output_dir(&self, requested: Option<&str>) -> PathBuf {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => self.report_dir.clone(),
        }
    }

    async fn finish(
        &self,
        result: Result<GenerateReportResponse, String>,
    ) -> Result<CallToolResult, McpError> {
        self.status_tracker.lock().await.record_report(result.is_ok());
        let response = result.map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GeneratePatientReportParams {
    /// Patient id
    pub patient_id: String,
    /// Directory to write the PDF into (defaults to the report directory)
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateDoctorReportParams {
    /// Doctor user id or staff profile id
    pub doctor_id: String,
    /// Directory to write the PDF into (defaults to the report directory)
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateStaffReportParams {
    /// Staff profile id
    pub staff_id: String,
    /// Directory to write the PDF into (defaults to the report directory)
    pub output_dir: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl HmsService {
    // --- Status ---

    #[tool(description = "Get the current status of the HMS report service including build info, database status, report counters, and process information")]
    async fn hms_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for generating patient, doctor and staff reports. Call this when unsure which report tool or id to use.")]
    fn report_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::REPORT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(REPORT_INSTRUCTIONS)]))
    }

    // --- Reports ---

    #[tool(description = "Generate a patient medical report PDF with patient details, assigned doctor, vital signs, history, allergies, appointment statistics and recent appointments, and a visit summary")]
    async fn generate_patient_report(
        &self,
        Parameters(p): Parameters<GeneratePatientReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let dir = self.output_dir(p.output_dir.as_deref());
        let db = self.database.clone();
        let result = run_blocking(move || {
            reports::generate_patient_report(&db, &p.patient_id, &dir, Utc::now())
        })
        .await;
        self.finish(result).await
    }

    #[tool(description = "Generate a doctor performance report PDF covering the last 7 days: statistics, this week's appointments, daily breakdown, and most frequent patients. Accepts a user id or staff id.")]
    async fn generate_doctor_report(
        &self,
        Parameters(p): Parameters<GenerateDoctorReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let dir = self.output_dir(p.output_dir.as_deref());
        let db = self.database.clone();
        let result = run_blocking(move || {
            reports::generate_doctor_report(&db, &p.doctor_id, &dir, Utc::now())
        })
        .await;
        self.finish(result).await
    }

    #[tool(description = "Generate a staff information report PDF with personal details, roles, and qualifications for a staff profile id")]
    async fn generate_staff_report(
        &self,
        Parameters(p): Parameters<GenerateStaffReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let dir = self.output_dir(p.output_dir.as_deref());
        let db = self.database.clone();
        let result = run_blocking(move || {
            reports::generate_staff_report(&db, &p.staff_id, &dir, Utc::now())
        })
        .await;
        self.finish(result).await
    }
}

/// rusqlite and printpdf are synchronous; keep them off the async workers
async fn run_blocking<F>(render: F) -> Result<GenerateReportResponse, String>
where
    F: FnOnce() -> Result<GenerateReportResponse, String> + Send + 'static,
{
    tokio::task::spawn_blocking(render)
        .await
        .unwrap_or_else(|e| Err(format!("task join error: {}", e)))
}

#[tool_handler]
impl ServerHandler for HmsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hms-reports".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Hospital Management System Reports".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Hospital Management System (HMS) report service. \
                 Call report_instructions first if unsure. \
                 Reports: generate_patient_report(patient_id), generate_doctor_report(doctor_id), \
                 generate_staff_report(staff_id). \
                 Doctor ids may be user ids or staff ids. PDFs are written to the report directory. \
                 Status: hms_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(report_dir: &Path) -> HmsService {
        let db = Database::in_memory().unwrap();
        db.with_conn(crate::db::migrations::run_migrations).unwrap();
        HmsService::new(PathBuf::from(":memory:"), report_dir.to_path_buf(), db)
    }

    #[test]
    fn test_output_dir_defaults_to_report_dir() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        assert_eq!(svc.output_dir(None), dir.path());
        assert_eq!(svc.output_dir(Some("  ")), dir.path());
        assert_eq!(svc.output_dir(Some("/tmp/out")), PathBuf::from("/tmp/out"));
        assert_eq!(svc.report_dir(), dir.path());
    }

    #[test]
    fn test_server_info() {
        let dir = tempfile::tempdir().unwrap();
        let info = service(dir.path()).get_info();
        assert_eq!(info.server_info.name, "hms-reports");
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_report_tools_write_files_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.database
            .with_conn(|conn| {
                crate::models::Staff::create(
                    conn,
                    &crate::models::StaffCreate {
                        id: "stf-1".into(),
                        name: "Lakshmi R".into(),
                        ..Default::default()
                    },
                )
            })
            .unwrap();

        let result = svc
            .generate_staff_report(Parameters(GenerateStaffReportParams {
                staff_id: "stf-1".into(),
                output_dir: None,
            }))
            .await;
        assert!(result.is_ok());

        let missing = svc
            .generate_patient_report(Parameters(GeneratePatientReportParams {
                patient_id: "nobody".into(),
                output_dir: None,
            }))
            .await;
        assert!(missing.is_err());

        let written = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(written, 1);
        let status = svc.status_tracker.lock().await.get_status();
        assert_eq!((status.reports_generated, status.report_failures), (1, 1));
    }

    #[tokio::test]
    async fn test_failed_report_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());

        let result = svc
            .finish(reports::generate_patient_report(&svc.database, "missing", dir.path(), Utc::now()))
            .await;
        assert!(result.is_err());

        let status = svc.status_tracker.lock().await.get_status();
        assert_eq!(status.report_failures, 1);
        assert_eq!(status.reports_generated, 0);
    }
}
