//! Timberstock MCP Server Implementation
//!
//! Implements the MCP server with all stock and unit tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{StockItemCreate, StockItemUpdate};
use crate::tools::status::StatusTracker;
use crate::tools::{stock_items, units};
use crate::units::{
    checked_dim_unit, checked_number, checked_pieces, NumericInput, QuantityCalculator,
    QuantityForm, UnitLookup,
};

/// Timberstock MCP Service
#[derive(Clone)]
pub struct TimberService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    unit_lookup: Arc<UnitLookup>,
    calculator: QuantityCalculator<'static>,
    tool_router: ToolRouter<TimberService>,
}

impl TimberService {
    pub fn new(database_path: PathBuf, database: Database, unit_lookup: UnitLookup) -> Self {
        let units_service_url = unit_lookup.base_url().map(str::to_string);
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, units_service_url))),
            database,
            unit_lookup: Arc::new(unit_lookup),
            calculator: QuantityCalculator::default(),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Unit Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListUnitsForCategoryParams {
    /// Category ID (1 Timber, 2 Plywood, 3 Hardware, 4 Miscellaneous)
    pub category_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UnitInfoParams {
    /// Unit code, e.g. "CFT"
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormatDimensionsParams {
    pub length: Option<f64>,
    pub breadth: Option<f64>,
    pub height: Option<f64>,
    /// ft, in, cm or m (default ft)
    pub dim_unit: Option<String>,
}

// ============================================================================
// Stock Item Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddStockItemParams {
    /// Item name
    pub name: String,
    /// Category ID
    pub category_id: i64,
    /// Unit and measurements; quantity is derived from these
    #[serde(flatten)]
    pub measurements: QuantityForm,
    /// Optional notes
    pub notes: Option<String>,
}

impl AddStockItemParams {
    /// Measurements are stored, so anything entered must parse
    fn into_create(self) -> Result<StockItemCreate, String> {
        let spec = self.measurements.to_checked_spec()?;
        Ok(StockItemCreate {
            name: self.name,
            category_id: self.category_id,
            unit: spec.unit,
            dimensions: spec.dimensions,
            pieces: spec.pieces,
            weight_per_piece: spec.weight_per_piece,
            entered_quantity: spec.raw_quantity,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetStockItemParams {
    /// Stock item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListStockItemsParams {
    /// Only items in this category (optional)
    pub category_id: Option<i64>,
    /// Sort by: name, quantity, unit, created_at or updated_at (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default asc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_sort_order() -> String { "asc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchStockItemsParams {
    /// Text to match against name or notes
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateStockItemParams {
    /// Stock item ID to update
    pub id: i64,
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub unit: Option<String>,
    pub length: Option<NumericInput>,
    pub breadth: Option<NumericInput>,
    pub height: Option<NumericInput>,
    /// ft, in, cm or m
    pub dim_unit: Option<String>,
    pub pieces: Option<NumericInput>,
    pub weight_per_piece: Option<NumericInput>,
    /// Quantity entered directly
    pub quantity: Option<NumericInput>,
    pub notes: Option<String>,
    /// Remove stored length/breadth/height first (default false)
    #[serde(default)]
    pub clear_dimensions: bool,
}

impl UpdateStockItemParams {
    fn into_update(self) -> Result<StockItemUpdate, String> {
        Ok(StockItemUpdate {
            length: checked_number("length", self.length.as_ref())?,
            breadth: checked_number("breadth", self.breadth.as_ref())?,
            height: checked_number("height", self.height.as_ref())?,
            weight_per_piece: checked_number("weight_per_piece", self.weight_per_piece.as_ref())?,
            entered_quantity: checked_number("quantity", self.quantity.as_ref())?,
            dim_unit: checked_dim_unit(self.dim_unit.as_deref())?,
            pieces: checked_pieces(self.pieces.as_ref())?,
            name: self.name,
            category_id: self.category_id,
            unit: self.unit,
            notes: self.notes,
            clear_dimensions: self.clear_dimensions,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteStockItemParams {
    /// Stock item ID to delete
    pub id: i64,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl TimberService {
    // --- Status ---

    #[tool(description = "Get the current status of the timberstock service including build info, database status, and process information")]
    async fn timberstock_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get instructions for choosing units and entering measurements. Call this before adding or updating stock.")]
    fn stock_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::STOCK_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(STOCK_INSTRUCTIONS)]))
    }

    // --- Units ---

    #[tool(description = "List the units a category offers, as {value, label} pairs in catalog order. Uses the remote unit service when configured, otherwise the local catalog.")]
    async fn list_units_for_category(&self, Parameters(p): Parameters<ListUnitsForCategoryParams>) -> Result<CallToolResult, McpError> {
        let listing = units::list_units_for_category(&self.unit_lookup, p.category_id).await;
        json_result(&listing)
    }

    #[tool(description = "Describe a unit code: label, type, whether it takes dimensions or weight-per-piece, and which categories offer it")]
    fn unit_info(&self, Parameters(p): Parameters<UnitInfoParams>) -> Result<CallToolResult, McpError> {
        json_result(&units::unit_info(self.calculator.catalog(), &p.unit))
    }

    #[tool(description = "Compute a stock quantity from unit, dimensions, pieces, weight per piece or a typed quantity, without storing anything. Numbers may be given as JSON numbers or text.")]
    fn compute_quantity(&self, Parameters(form): Parameters<QuantityForm>) -> Result<CallToolResult, McpError> {
        json_result(&units::compute_quantity(&self.calculator, &form))
    }

    #[tool(description = "Format length/breadth/height into a label such as \"4 × 2 × 1 ft\". Returns null label if length or breadth is missing.")]
    fn format_dimensions(&self, Parameters(p): Parameters<FormatDimensionsParams>) -> Result<CallToolResult, McpError> {
        let result = units::format_dimensions_label(p.length, p.breadth, p.height, p.dim_unit.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List item categories with the unit types each permits")]
    fn list_categories(&self) -> Result<CallToolResult, McpError> {
        let result = stock_items::list_categories(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Stock Items ---

    #[tool(description = "Add a stock item. Quantity is derived from the unit and measurements (dimensions, pieces, weight per piece) or taken from quantity when measurements are incomplete.")]
    fn add_stock_item(&self, Parameters(p): Parameters<AddStockItemParams>) -> Result<CallToolResult, McpError> {
        let data = p.into_create().map_err(|e| McpError::invalid_params(e, None))?;
        let result = stock_items::add_stock_item(&self.database, &self.calculator, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get full details for a stock item including measurements and derived quantity")]
    fn get_stock_item(&self, Parameters(p): Parameters<GetStockItemParams>) -> Result<CallToolResult, McpError> {
        let result = stock_items::get_stock_item(&self.database, &self.calculator, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => json_result(&detail),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Stock item not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "List stock items with optional category filter, sorting, and pagination")]
    fn list_stock_items(&self, Parameters(p): Parameters<ListStockItemsParams>) -> Result<CallToolResult, McpError> {
        let result = stock_items::list_stock_items(
            &self.database, &self.calculator, p.category_id, &p.sort_by, &p.sort_order, p.limit, p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search stock items by name or notes")]
    fn search_stock_items(&self, Parameters(p): Parameters<SearchStockItemsParams>) -> Result<CallToolResult, McpError> {
        let result = stock_items::search_stock_items(&self.database, &self.calculator, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a stock item. Only given fields change; the quantity is re-derived from the merged measurements.")]
    fn update_stock_item(&self, Parameters(p): Parameters<UpdateStockItemParams>) -> Result<CallToolResult, McpError> {
        let id = p.id;
        let data = p.into_update().map_err(|e| McpError::invalid_params(e, None))?;
        let result = stock_items::update_stock_item(&self.database, &self.calculator, id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a stock item")]
    fn delete_stock_item(&self, Parameters(p): Parameters<DeleteStockItemParams>) -> Result<CallToolResult, McpError> {
        let result = stock_items::delete_stock_item(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Re-derive every stored stock quantity from its measurements. Returns the items whose quantity changed.")]
    fn recalculate_stock_quantities(&self) -> Result<CallToolResult, McpError> {
        let result = stock_items::recalculate_stock_quantities(&self.database, &self.calculator)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Total stock quantity per category and unit")]
    fn stock_summary(&self) -> Result<CallToolResult, McpError> {
        let result = stock_items::stock_summary(&self.database, &self.calculator)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for TimberService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "timberstock".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Timber Stock Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Timber Stock Manager - stock keeping for a timber trading business. \
                 IMPORTANT: Call stock_instructions before entering stock. \
                 Units: list_units_for_category, unit_info, compute_quantity, format_dimensions. \
                 Categories: list_categories. \
                 Stock: add/get/list/search/update/delete_stock_item, \
                 recalculate_stock_quantities, stock_summary."
                    .into(),
            ),
        }
    }
}
