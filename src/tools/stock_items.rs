//! Stock Item MCP Tools
//!
//! Tools for managing stock items in the database.

use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{Category, QuantityChange, StockItem, StockItemCreate, StockItemUpdate, StockTotal};
use crate::units::QuantityCalculator;

/// Response for add_stock_item
#[derive(Debug, Serialize)]
pub struct AddStockItemResponse {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub formatted_quantity: String,
    pub dimensions_label: Option<String>,
    /// False when the category does not normally offer this unit
    pub unit_allowed_for_category: bool,
    pub created_at: String,
}

/// Summary of a stock item for list/search results
#[derive(Debug, Serialize)]
pub struct StockItemSummary {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub unit: String,
    pub quantity: f64,
    pub formatted_quantity: String,
    pub dimensions_label: Option<String>,
}

impl StockItemSummary {
    fn new(item: &StockItem, calculator: &QuantityCalculator) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category_id: item.category_id,
            unit: item.unit.clone(),
            quantity: item.quantity,
            formatted_quantity: calculator.catalog().format_quantity(item.quantity, &item.unit),
            dimensions_label: item.dimensions_label.clone(),
        }
    }
}

/// Full stock item detail response
#[derive(Debug, Serialize)]
pub struct StockItemDetail {
    #[serde(flatten)]
    pub item: StockItem,
    pub category_name: Option<String>,
    pub formatted_quantity: String,
    pub unit_allowed_for_category: bool,
}

/// Response for list_stock_items
#[derive(Debug, Serialize)]
pub struct ListStockItemsResponse {
    pub items: Vec<StockItemSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for search_stock_items
#[derive(Debug, Serialize)]
pub struct SearchStockItemsResponse {
    pub items: Vec<StockItemSummary>,
    pub total: usize,
}

/// Response for update_stock_item
#[derive(Debug, Serialize)]
pub struct UpdateStockItemResponse {
    pub success: bool,
    pub old_quantity: f64,
    pub quantity: f64,
    pub formatted_quantity: String,
    pub updated_at: String,
}

/// Response for delete_stock_item
#[derive(Debug, Serialize)]
pub struct DeleteStockItemResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for recalculate_stock_quantities
#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub items_checked: usize,
    pub items_changed: usize,
    pub changes: Vec<QuantityChange>,
}

/// One line of the stock summary
#[derive(Debug, Serialize)]
pub struct StockSummaryLine {
    #[serde(flatten)]
    pub total: StockTotal,
    pub formatted_total: String,
}

/// Response for stock_summary
#[derive(Debug, Serialize)]
pub struct StockSummaryResponse {
    pub as_of: String,
    pub item_count: i64,
    pub lines: Vec<StockSummaryLine>,
}

fn db_error(e: DbError) -> String {
    match e {
        DbError::UnknownCategory(id) => format!("Category {} does not exist", id),
        other => format!("Database error: {}", other),
    }
}

/// Add a new stock item
pub fn add_stock_item(
    db: &Database,
    calculator: &QuantityCalculator,
    mut data: StockItemCreate,
) -> Result<AddStockItemResponse, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Stock item name cannot be empty".to_string());
    }
    data.unit = data.unit.trim().to_string();
    if data.unit.is_empty() {
        return Err("unit cannot be empty".to_string());
    }
    if data.pieces == Some(0) {
        return Err("pieces must be at least 1".to_string());
    }

    let catalog = calculator.catalog();
    let unit_allowed_for_category = catalog.is_unit_allowed(data.category_id, &data.unit);
    if catalog.get(&data.unit).is_none() {
        tracing::warn!("Stock item '{}' uses unknown unit '{}'", data.name, data.unit);
    } else if !unit_allowed_for_category {
        tracing::warn!(
            "Unit '{}' is not offered for category {}; storing anyway",
            data.unit,
            data.category_id
        );
    }

    let conn = db.get_conn().map_err(db_error)?;
    let item = StockItem::create(&conn, &data, calculator).map_err(db_error)?;
    tracing::info!("Added stock item {} '{}' = {} {}", item.id, item.name, item.quantity, item.unit);

    Ok(AddStockItemResponse {
        id: item.id,
        formatted_quantity: catalog.format_quantity(item.quantity, &item.unit),
        name: item.name,
        quantity: item.quantity,
        dimensions_label: item.dimensions_label,
        unit_allowed_for_category,
        created_at: item.created_at,
    })
}

/// Get full details for a stock item
pub fn get_stock_item(
    db: &Database,
    calculator: &QuantityCalculator,
    id: i64,
) -> Result<Option<StockItemDetail>, String> {
    let conn = db.get_conn().map_err(db_error)?;
    let Some(item) = StockItem::get_by_id(&conn, id).map_err(db_error)? else {
        return Ok(None);
    };
    let category_name = Category::get_by_id(&conn, item.category_id)
        .map_err(db_error)?
        .map(|c| c.name);

    let catalog = calculator.catalog();
    Ok(Some(StockItemDetail {
        category_name,
        formatted_quantity: catalog.format_quantity(item.quantity, &item.unit),
        unit_allowed_for_category: catalog.is_unit_allowed(item.category_id, &item.unit),
        item,
    }))
}

/// List stock items with optional category filter, sorting and pagination
pub fn list_stock_items(
    db: &Database,
    calculator: &QuantityCalculator,
    category_id: Option<i64>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListStockItemsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let conn = db.get_conn().map_err(db_error)?;

    let items = StockItem::list(&conn, category_id, sort_by, sort_order, limit, offset)
        .map_err(db_error)?;
    let total = StockItem::count(&conn, category_id).map_err(db_error)?;

    Ok(ListStockItemsResponse {
        items: items.iter().map(|i| StockItemSummary::new(i, calculator)).collect(),
        total,
        limit,
        offset,
    })
}

/// Search stock items by name or notes
pub fn search_stock_items(
    db: &Database,
    calculator: &QuantityCalculator,
    query: &str,
    limit: i64,
) -> Result<SearchStockItemsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(db_error)?;
    let items = StockItem::search(&conn, query.trim(), limit).map_err(db_error)?;

    Ok(SearchStockItemsResponse {
        total: items.len(),
        items: items.iter().map(|i| StockItemSummary::new(i, calculator)).collect(),
    })
}

/// Update a stock item, re-deriving its quantity
pub fn update_stock_item(
    db: &Database,
    calculator: &QuantityCalculator,
    id: i64,
    mut data: StockItemUpdate,
) -> Result<UpdateStockItemResponse, String> {
    data.name = data.name.map(|n| n.trim().to_string());
    if data.name.as_deref() == Some("") {
        return Err("Stock item name cannot be empty".to_string());
    }
    data.unit = data.unit.map(|u| u.trim().to_string());
    if data.unit.as_deref() == Some("") {
        return Err("unit cannot be empty".to_string());
    }
    if data.pieces == Some(0) {
        return Err("pieces must be at least 1".to_string());
    }

    db.with_transaction(|tx| {
        let Some(before) = StockItem::get_by_id(tx, id)? else {
            return Ok(None);
        };
        let after = StockItem::update(tx, id, &data, calculator)?;
        Ok(after.map(|after| (before.quantity, after)))
    })
    .map_err(db_error)?
    .map(|(old_quantity, item)| {
        tracing::info!(
            "Updated stock item {}: {} -> {} {}",
            item.id,
            old_quantity,
            item.quantity,
            item.unit
        );
        UpdateStockItemResponse {
            success: true,
            old_quantity,
            quantity: item.quantity,
            formatted_quantity: calculator.catalog().format_quantity(item.quantity, &item.unit),
            updated_at: item.updated_at,
        }
    })
    .ok_or_else(|| format!("Stock item {} not found", id))
}

/// Delete a stock item
pub fn delete_stock_item(db: &Database, id: i64) -> Result<DeleteStockItemResponse, String> {
    let conn = db.get_conn().map_err(db_error)?;
    if !StockItem::delete(&conn, id).map_err(db_error)? {
        return Err(format!("Stock item {} not found", id));
    }
    tracing::info!("Deleted stock item {}", id);
    Ok(DeleteStockItemResponse {
        success: true,
        deleted_id: id,
    })
}

/// Re-derive every stored quantity from its measurements
pub fn recalculate_stock_quantities(
    db: &Database,
    calculator: &QuantityCalculator,
) -> Result<RecalculateResponse, String> {
    let all = db
        .with_transaction(|tx| StockItem::recalculate_all(tx, calculator))
        .map_err(db_error)?;

    let items_checked = all.len();
    let changes: Vec<QuantityChange> = all.into_iter().filter(QuantityChange::changed).collect();
    for change in &changes {
        tracing::debug!(
            "Recalculated stock item {}: {} -> {}",
            change.id,
            change.old_quantity,
            change.new_quantity
        );
    }
    tracing::info!("Recalculated {} stock items, {} changed", items_checked, changes.len());

    Ok(RecalculateResponse {
        items_checked,
        items_changed: changes.len(),
        changes,
    })
}

/// Totals per category and unit
pub fn stock_summary(
    db: &Database,
    calculator: &QuantityCalculator,
) -> Result<StockSummaryResponse, String> {
    let conn = db.get_conn().map_err(db_error)?;
    let totals = StockItem::totals(&conn).map_err(db_error)?;
    let item_count = StockItem::count(&conn, None).map_err(db_error)?;

    let lines = totals
        .into_iter()
        .map(|total| StockSummaryLine {
            formatted_total: calculator
                .catalog()
                .format_quantity(total.total_quantity, &total.unit),
            total,
        })
        .collect();

    Ok(StockSummaryResponse {
        as_of: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        item_count,
        lines,
    })
}

/// List categories
pub fn list_categories(db: &Database) -> Result<Vec<Category>, String> {
    let conn = db.get_conn().map_err(db_error)?;
    Category::list(&conn).map_err(db_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::units::{DimensionInput, DimensionUnit};

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn planks() -> StockItemCreate {
        StockItemCreate {
            name: "  Pine planks ".to_string(),
            category_id: 1,
            unit: "RFT".to_string(),
            dimensions: Some(DimensionInput::new(12.0, 0.5, None, DimensionUnit::Ft)),
            pieces: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_and_get() {
        let db = setup();
        let calc = QuantityCalculator::default();
        let added = add_stock_item(&db, &calc, planks()).unwrap();
        assert_eq!(added.name, "Pine planks");
        assert_eq!(added.quantity, 120.0);
        assert_eq!(added.formatted_quantity, "120 Running Feet");
        assert!(added.unit_allowed_for_category);

        let detail = get_stock_item(&db, &calc, added.id).unwrap().unwrap();
        assert_eq!(detail.category_name.as_deref(), Some("Timber"));
        assert!(get_stock_item(&db, &calc, 404).unwrap().is_none());
    }

    #[test]
    fn test_add_validates_input() {
        let db = setup();
        let calc = QuantityCalculator::default();
        let blank = StockItemCreate {
            name: " ".to_string(),
            ..planks()
        };
        assert!(add_stock_item(&db, &calc, blank).is_err());

        let bad_category = StockItemCreate {
            category_id: 9,
            ..planks()
        };
        let err = add_stock_item(&db, &calc, bad_category).unwrap_err();
        assert_eq!(err, "Category 9 does not exist");

        let no_pieces = StockItemCreate {
            pieces: Some(0),
            ..planks()
        };
        assert_eq!(add_stock_item(&db, &calc, no_pieces).unwrap_err(), "pieces must be at least 1");
    }

    #[test]
    fn test_add_flags_unit_outside_category() {
        let db = setup();
        let calc = QuantityCalculator::default();
        let data = StockItemCreate {
            category_id: 3,
            ..planks()
        };
        let added = add_stock_item(&db, &calc, data).unwrap();
        assert!(!added.unit_allowed_for_category);
        assert_eq!(added.quantity, 120.0);
    }

    #[test]
    fn test_update_reports_old_and_new_quantity() {
        let db = setup();
        let calc = QuantityCalculator::default();
        let added = add_stock_item(&db, &calc, planks()).unwrap();

        let update = StockItemUpdate {
            pieces: Some(4),
            ..Default::default()
        };
        let updated = update_stock_item(&db, &calc, added.id, update).unwrap();
        assert_eq!(updated.old_quantity, 120.0);
        assert_eq!(updated.quantity, 48.0);

        let missing = update_stock_item(&db, &calc, 777, StockItemUpdate::default());
        assert_eq!(missing.unwrap_err(), "Stock item 777 not found");
    }

    #[test]
    fn test_list_search_delete_and_summary() {
        let db = setup();
        let calc = QuantityCalculator::default();
        let a = add_stock_item(&db, &calc, planks()).unwrap();
        add_stock_item(&db, &calc, planks()).unwrap();

        let listed = list_stock_items(&db, &calc, Some(1), "name", "asc", 0, -5).unwrap();
        assert_eq!(listed.limit, 1);
        assert_eq!(listed.offset, 0);
        assert_eq!(listed.total, 2);
        assert_eq!(listed.items.len(), 1);

        let found = search_stock_items(&db, &calc, "pine", 10).unwrap();
        assert_eq!(found.total, 2);

        let summary = stock_summary(&db, &calc).unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.lines[0].formatted_total, "240 Running Feet");

        assert!(delete_stock_item(&db, a.id).unwrap().success);
        assert!(delete_stock_item(&db, a.id).is_err());
    }

    #[test]
    fn test_recalculate_reports_only_changes() {
        let db = setup();
        let calc = QuantityCalculator::default();
        let added = add_stock_item(&db, &calc, planks()).unwrap();
        add_stock_item(&db, &calc, planks()).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE stock_items SET quantity = 0 WHERE id = ?1", [added.id])?;
            Ok(())
        })
        .unwrap();

        let response = recalculate_stock_quantities(&db, &calc).unwrap();
        assert_eq!(response.items_checked, 2);
        assert_eq!(response.items_changed, 1);
        assert_eq!(response.changes[0].new_quantity, 120.0);
    }

    #[test]
    fn test_list_categories() {
        let db = setup();
        let categories = list_categories(&db).unwrap();
        assert_eq!(categories[2].name, "Hardware");
    }
}
