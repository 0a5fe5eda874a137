//! Tools module
//!
//! MCP tool implementations for the timber stock manager.

pub mod status;
pub mod stock_items;
pub mod units;
