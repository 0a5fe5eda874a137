//! Timber Stock Manager Library
//!
//! Unit catalog, quantity calculation and stock keeping for a timber
//! trading business, served over MCP.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod units;
