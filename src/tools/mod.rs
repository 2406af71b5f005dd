//! MCP tool implementations
//!
//! Synchronous tool functions shared by the MCP service.

pub mod reports;
pub mod status;
