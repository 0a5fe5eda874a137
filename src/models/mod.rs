//! Data models
//!
//! Rust structs representing database entities.

mod category;
mod stock_item;

pub use category::Category;
pub use stock_item::{QuantityChange, StockItem, StockItemCreate, StockItemUpdate, StockTotal};
