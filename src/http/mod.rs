//! HTTP surface
//!
//! Serves report PDFs and service status with axum.

pub mod server;

pub use server::{router, serve, AppState};
