//! Report HTTP endpoints
//!
//! Each request renders on the blocking pool and the PDF is fully buffered
//! before the response is built, so render failures always surface as JSON
//! errors and never after headers are sent.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tokio::{net::TcpListener, signal, sync::Mutex};
use tracing::{error, info};

use crate::config::Config;
use crate::db::Database;
use crate::reports::{self, GeneratedReport, ReportError, ReportResult};
use crate::tools::status::{HmsStatus, StatusTracker};

const PATIENT_FAILURE: &str = "Failed to generate patient report";
const DOCTOR_FAILURE: &str = "Failed to generate doctor report";
const STAFF_FAILURE: &str = "Failed to generate staff report";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub status: Arc<Mutex<StatusTracker>>,
}

impl AppState {
    pub fn new(db: Database, status: StatusTracker) -> Self {
        Self {
            db,
            status: Arc::new(Mutex::new(status)),
        }
    }
}

/// Build the report router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reports/patient/:patient_id", get(patient_report))
        .route("/api/reports/doctor/:doctor_id", get(doctor_report))
        .route("/api/reports/staff/:staff_id", get(staff_report))
        .route("/api/status", get(status))
        .with_state(state)
}

/// Bind `config.bind_addr` and serve until Ctrl+C
pub async fn serve(config: &Config, db: Database) -> std::io::Result<()> {
    let state = AppState::new(
        db,
        StatusTracker::new(config.database_path.clone(), config.report_dir.clone()),
    );

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP report service listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}

// ============================================================================
// Handlers
// ============================================================================

async fn patient_report(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Response, ApiError> {
    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || {
        reports::generate_patient_report(&db, &patient_id, Utc::now())
    })
    .await;
    finish(&state, result, PATIENT_FAILURE).await
}

async fn doctor_report(
    State(state): State<AppState>,
    Path(doctor_id): Path<String>,
) -> Result<Response, ApiError> {
    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || {
        reports::generate_doctor_report(&db, &doctor_id, Utc::now())
    })
    .await;
    finish(&state, result, DOCTOR_FAILURE).await
}

async fn staff_report(
    State(state): State<AppState>,
    Path(staff_id): Path<String>,
) -> Result<Response, ApiError> {
    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || {
        reports::generate_staff_report(&db, &staff_id, Utc::now())
    })
    .await;
    finish(&state, result, STAFF_FAILURE).await
}

async fn status(State(state): State<AppState>) -> Json<HmsStatus> {
    Json(state.status.lock().await.get_status())
}

async fn finish(
    state: &AppState,
    result: Result<ReportResult<GeneratedReport>, tokio::task::JoinError>,
    failure: &'static str,
) -> Result<Response, ApiError> {
    let result = result
        .map_err(|err| ApiError::internal(failure, format!("task join error: {err}")))
        .and_then(|r| r.map_err(|e| ApiError::from_report(e, failure)));
    state.status.lock().await.record_report(result.is_ok());

    let report = result?;
    Ok(pdf_response(report))
}

fn pdf_response(report: GeneratedReport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response()
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    error: Option<String>,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
            error: None,
        }
    }

    fn internal(message: &str, error: String) -> Self {
        error!(error = %error, "{}", message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            error: Some(error),
        }
    }

    fn from_report(err: ReportError, failure: &str) -> Self {
        match err {
            ReportError::NotFound(message) => Self::not_found(message),
            other => Self::internal(failure, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.error {
            Some(error) => serde_json::json!({
                "success": false,
                "message": self.message,
                "error": error,
            }),
            None => serde_json::json!({
                "success": false,
                "message": self.message,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}
