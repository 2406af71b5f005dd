//! MCP surface
//!
//! Exposes report generation as MCP tools over stdio.

pub mod server;

pub use server::HmsService;
