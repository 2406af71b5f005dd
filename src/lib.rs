//! Hospital Management System (HMS) report library
//!
//! Patient and doctor PDF reports served over HTTP and MCP.

pub mod build_info;
pub mod config;
pub mod db;
pub mod http;
pub mod mcp;
pub mod models;
pub mod reports;
pub mod tools;
