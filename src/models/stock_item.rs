//! Stock item model
//!
//! A stocked item with its measurements and the quantity derived from them.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Category;
use crate::db::{DbError, DbResult};
use crate::units::{DimensionInput, DimensionUnit, ItemQuantitySpec, QuantityCalculator};

/// A stock item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub unit: String,
    pub length: Option<f64>,
    pub breadth: Option<f64>,
    pub height: Option<f64>,
    pub dim_unit: DimensionUnit,
    pub pieces: Option<u32>,
    pub weight_per_piece: Option<f64>,
    /// Quantity typed by the user, kept so the derived quantity can be rebuilt
    pub entered_quantity: Option<f64>,
    /// Derived stock quantity in `unit`
    pub quantity: f64,
    pub dimensions_label: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a stock item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockItemCreate {
    pub name: String,
    pub category_id: i64,
    pub unit: String,
    #[serde(default)]
    pub dimensions: Option<DimensionInput>,
    #[serde(default)]
    pub pieces: Option<u32>,
    #[serde(default)]
    pub weight_per_piece: Option<f64>,
    #[serde(default)]
    pub entered_quantity: Option<f64>,
    pub notes: Option<String>,
}

/// Data for updating a stock item. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockItemUpdate {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub unit: Option<String>,
    pub length: Option<f64>,
    pub breadth: Option<f64>,
    pub height: Option<f64>,
    pub dim_unit: Option<DimensionUnit>,
    pub pieces: Option<u32>,
    pub weight_per_piece: Option<f64>,
    pub entered_quantity: Option<f64>,
    pub notes: Option<String>,
    /// Drop stored length/breadth/height before applying the update
    #[serde(default)]
    pub clear_dimensions: bool,
}

/// Quantity before and after a recalculation
#[derive(Debug, Clone, Serialize)]
pub struct QuantityChange {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub old_quantity: f64,
    pub new_quantity: f64,
}

impl QuantityChange {
    pub fn changed(&self) -> bool {
        self.old_quantity != self.new_quantity
    }
}

/// Total stock per category and unit
#[derive(Debug, Clone, Serialize)]
pub struct StockTotal {
    pub category_id: i64,
    pub category_name: String,
    pub unit: String,
    pub item_count: i64,
    pub total_quantity: f64,
}

impl StockItemCreate {
    pub fn quantity_spec(&self) -> ItemQuantitySpec {
        ItemQuantitySpec {
            unit: self.unit.clone(),
            dimensions: self.dimensions,
            pieces: self.pieces,
            weight_per_piece: self.weight_per_piece,
            raw_quantity: self.entered_quantity,
        }
    }

    fn dimension_columns(&self) -> (Option<f64>, Option<f64>, Option<f64>, DimensionUnit) {
        match self.dimensions {
            Some(d) => (d.length, d.breadth, d.height, d.unit),
            None => (None, None, None, DimensionUnit::default()),
        }
    }
}

impl StockItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let dim_unit: String = row.get("dim_unit")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category_id: row.get("category_id")?,
            unit: row.get("unit")?,
            length: row.get("length")?,
            breadth: row.get("breadth")?,
            height: row.get("height")?,
            dim_unit: DimensionUnit::from_str(&dim_unit).unwrap_or_default(),
            pieces: row.get("pieces")?,
            weight_per_piece: row.get("weight_per_piece")?,
            entered_quantity: row.get("entered_quantity")?,
            quantity: row.get("quantity")?,
            dimensions_label: row.get("dimensions_label")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Stored dimensions, if any side was recorded
    pub fn dimensions(&self) -> Option<DimensionInput> {
        if self.length.is_none() && self.breadth.is_none() && self.height.is_none() {
            return None;
        }
        Some(DimensionInput {
            length: self.length,
            breadth: self.breadth,
            height: self.height,
            unit: self.dim_unit,
        })
    }

    /// The calculator input this item's quantity is derived from
    pub fn quantity_spec(&self) -> ItemQuantitySpec {
        ItemQuantitySpec {
            unit: self.unit.clone(),
            dimensions: self.dimensions(),
            pieces: self.pieces,
            weight_per_piece: self.weight_per_piece,
            raw_quantity: self.entered_quantity,
        }
    }

    fn as_create(&self) -> StockItemCreate {
        StockItemCreate {
            name: self.name.clone(),
            category_id: self.category_id,
            unit: self.unit.clone(),
            dimensions: self.dimensions(),
            pieces: self.pieces,
            weight_per_piece: self.weight_per_piece,
            entered_quantity: self.entered_quantity,
            notes: self.notes.clone(),
        }
    }

    /// Insert a new stock item, deriving its quantity
    pub fn create(
        conn: &Connection,
        data: &StockItemCreate,
        calculator: &QuantityCalculator,
    ) -> DbResult<Self> {
        if !Category::exists(conn, data.category_id)? {
            return Err(DbError::UnknownCategory(data.category_id));
        }

        let quantity = calculator.compute(&data.quantity_spec());
        let label = data.dimensions.and_then(|d| d.label());
        let (length, breadth, height, dim_unit) = data.dimension_columns();

        conn.execute(
            r#"
            INSERT INTO stock_items (
                name, category_id, unit, length, breadth, height, dim_unit,
                pieces, weight_per_piece, entered_quantity, quantity, dimensions_label, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                data.name,
                data.category_id,
                data.unit,
                length,
                breadth,
                height,
                dim_unit.as_str(),
                data.pieces,
                data.weight_per_piece,
                data.entered_quantity,
                quantity,
                label,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM stock_items WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search stock items by name or notes
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM stock_items
            WHERE name LIKE ?1 OR notes LIKE ?1
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;
        let items = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// List stock items with optional category filter, sorting and paging
    pub fn list(
        conn: &Connection,
        category_id: Option<i64>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.eq_ignore_ascii_case("desc") { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "quantity" => "quantity",
            "created_at" => "created_at",
            "updated_at" => "updated_at",
            "unit" => "unit",
            _ => "name",
        };

        let sql = format!(
            "SELECT * FROM stock_items WHERE (?1 IS NULL OR category_id = ?1) \
             ORDER BY {} {}, id ASC LIMIT ?2 OFFSET ?3",
            sort_col, order
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![category_id, limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn count(conn: &Connection, category_id: Option<i64>) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stock_items WHERE (?1 IS NULL OR category_id = ?1)",
            params![category_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Apply an update and re-derive the quantity. Ok(None) if not found.
    pub fn update(
        conn: &Connection,
        id: i64,
        data: &StockItemUpdate,
        calculator: &QuantityCalculator,
    ) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let mut merged = existing.as_create();
        if data.clear_dimensions {
            merged.dimensions = None;
        }
        if let Some(name) = &data.name {
            merged.name = name.clone();
        }
        if let Some(category_id) = data.category_id {
            if !Category::exists(conn, category_id)? {
                return Err(DbError::UnknownCategory(category_id));
            }
            merged.category_id = category_id;
        }
        if let Some(unit) = &data.unit {
            merged.unit = unit.clone();
        }
        if data.length.is_some() || data.breadth.is_some() || data.height.is_some() || data.dim_unit.is_some() {
            let mut dims = merged.dimensions.unwrap_or_default();
            if data.length.is_some() {
                dims.length = data.length;
            }
            if data.breadth.is_some() {
                dims.breadth = data.breadth;
            }
            if data.height.is_some() {
                dims.height = data.height;
            }
            if let Some(unit) = data.dim_unit {
                dims.unit = unit;
            }
            merged.dimensions = Some(dims);
        }
        if data.pieces.is_some() {
            merged.pieces = data.pieces;
        }
        if data.weight_per_piece.is_some() {
            merged.weight_per_piece = data.weight_per_piece;
        }
        if data.entered_quantity.is_some() {
            merged.entered_quantity = data.entered_quantity;
        }
        if data.notes.is_some() {
            merged.notes = data.notes.clone();
        }

        Self::write(conn, id, &merged, calculator)?;
        Self::get_by_id(conn, id)
    }

    fn write(
        conn: &Connection,
        id: i64,
        data: &StockItemCreate,
        calculator: &QuantityCalculator,
    ) -> DbResult<()> {
        let quantity = calculator.compute(&data.quantity_spec());
        let label = data.dimensions.and_then(|d| d.label());
        let (length, breadth, height, dim_unit) = data.dimension_columns();

        conn.execute(
            r#"
            UPDATE stock_items SET
                name = ?1, category_id = ?2, unit = ?3,
                length = ?4, breadth = ?5, height = ?6, dim_unit = ?7,
                pieces = ?8, weight_per_piece = ?9, entered_quantity = ?10,
                quantity = ?11, dimensions_label = ?12, notes = ?13,
                updated_at = datetime('now')
            WHERE id = ?14
            "#,
            params![
                data.name,
                data.category_id,
                data.unit,
                length,
                breadth,
                height,
                dim_unit.as_str(),
                data.pieces,
                data.weight_per_piece,
                data.entered_quantity,
                quantity,
                label,
                data.notes,
                id,
            ],
        )?;
        Ok(())
    }

    /// Re-derive one item's quantity from its stored measurements
    pub fn recalculate(
        conn: &Connection,
        id: i64,
        calculator: &QuantityCalculator,
    ) -> DbResult<Option<QuantityChange>> {
        let Some(item) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };
        let new_quantity = calculator.compute(&item.quantity_spec());
        if new_quantity != item.quantity {
            conn.execute(
                "UPDATE stock_items SET quantity = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![new_quantity, id],
            )?;
        }
        Ok(Some(QuantityChange {
            id,
            name: item.name,
            unit: item.unit,
            old_quantity: item.quantity,
            new_quantity,
        }))
    }

    /// Re-derive every item's quantity
    pub fn recalculate_all(
        conn: &Connection,
        calculator: &QuantityCalculator,
    ) -> DbResult<Vec<QuantityChange>> {
        let ids = conn
            .prepare("SELECT id FROM stock_items ORDER BY id")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        let mut changes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(change) = Self::recalculate(conn, id, calculator)? {
                changes.push(change);
            }
        }
        Ok(changes)
    }

    /// Totals grouped by category and unit
    pub fn totals(conn: &Connection) -> DbResult<Vec<StockTotal>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT s.category_id, c.name, s.unit, COUNT(*), COALESCE(SUM(s.quantity), 0)
            FROM stock_items s
            INNER JOIN categories c ON c.id = s.category_id
            GROUP BY s.category_id, s.unit
            ORDER BY s.category_id, s.unit
            "#,
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(StockTotal {
                    category_id: row.get(0)?,
                    category_name: row.get(1)?,
                    unit: row.get(2)?,
                    item_count: row.get(3)?,
                    total_quantity: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    /// Delete a stock item. Returns false if it did not exist.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM stock_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn beam() -> StockItemCreate {
        StockItemCreate {
            name: "Teak beam".to_string(),
            category_id: 1,
            unit: "CFT".to_string(),
            dimensions: Some(DimensionInput::new(4.0, 2.0, Some(1.0), DimensionUnit::Ft)),
            pieces: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_derives_quantity_and_label() {
        let conn = setup();
        let calc = QuantityCalculator::default();
        let item = StockItem::create(&conn, &beam(), &calc).unwrap();

        assert_eq!(item.quantity, 24.0);
        assert_eq!(item.dimensions_label.as_deref(), Some("4 × 2 × 1 ft"));
        assert_eq!(item.dim_unit, DimensionUnit::Ft);
        assert_eq!(item.pieces, Some(3));
    }

    #[test]
    fn test_create_rejects_unknown_category() {
        let conn = setup();
        let data = StockItemCreate {
            category_id: 12,
            ..beam()
        };
        let err = StockItem::create(&conn, &data, &QuantityCalculator::default()).unwrap_err();
        assert!(matches!(err, DbError::UnknownCategory(12)));
    }

    #[test]
    fn test_update_recomputes_quantity() {
        let conn = setup();
        let calc = QuantityCalculator::default();
        let item = StockItem::create(&conn, &beam(), &calc).unwrap();

        let update = StockItemUpdate {
            pieces: Some(5),
            height: Some(2.0),
            ..Default::default()
        };
        let updated = StockItem::update(&conn, item.id, &update, &calc).unwrap().unwrap();
        assert_eq!(updated.quantity, 80.0);
        assert_eq!(updated.dimensions_label.as_deref(), Some("4 × 2 × 2 ft"));

        assert!(StockItem::update(&conn, 999, &update, &calc).unwrap().is_none());
    }

    #[test]
    fn test_update_switching_to_weight_unit() {
        let conn = setup();
        let calc = QuantityCalculator::default();
        let item = StockItem::create(&conn, &beam(), &calc).unwrap();

        let update = StockItemUpdate {
            category_id: Some(3),
            unit: Some("GRAMS".to_string()),
            weight_per_piece: Some(500.0),
            pieces: Some(4),
            clear_dimensions: true,
            ..Default::default()
        };
        let updated = StockItem::update(&conn, item.id, &update, &calc).unwrap().unwrap();
        assert_eq!(updated.quantity, 2.0);
        assert_eq!(updated.dimensions_label, None);
        assert_eq!(updated.length, None);
    }

    #[test]
    fn test_entered_quantity_used_without_dimensions() {
        let conn = setup();
        let data = StockItemCreate {
            name: "Mixed offcuts".to_string(),
            category_id: 1,
            unit: "CFT".to_string(),
            entered_quantity: Some(12.5),
            ..Default::default()
        };
        let item = StockItem::create(&conn, &data, &QuantityCalculator::default()).unwrap();
        assert_eq!(item.quantity, 12.5);
        assert_eq!(item.dimensions(), None);
    }

    #[test]
    fn test_list_search_count_delete() {
        let conn = setup();
        let calc = QuantityCalculator::default();
        StockItem::create(&conn, &beam(), &calc).unwrap();
        let screws = StockItem::create(
            &conn,
            &StockItemCreate {
                name: "Wood screws".to_string(),
                category_id: 3,
                unit: "NOS".to_string(),
                pieces: Some(400),
                notes: Some("box of 400".to_string()),
                ..Default::default()
            },
            &calc,
        )
        .unwrap();

        assert_eq!(StockItem::count(&conn, None).unwrap(), 2);
        assert_eq!(StockItem::count(&conn, Some(3)).unwrap(), 1);

        let all = StockItem::list(&conn, None, "quantity", "desc", 10, 0).unwrap();
        assert_eq!(all[0].name, "Wood screws");
        let timber = StockItem::list(&conn, Some(1), "name", "asc", 10, 0).unwrap();
        assert_eq!(timber.len(), 1);

        let found = StockItem::search(&conn, "box", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].quantity, 400.0);

        assert!(StockItem::delete(&conn, screws.id).unwrap());
        assert!(!StockItem::delete(&conn, screws.id).unwrap());
    }

    #[test]
    fn test_recalculate_all_repairs_stale_quantities() {
        let conn = setup();
        let calc = QuantityCalculator::default();
        let item = StockItem::create(&conn, &beam(), &calc).unwrap();
        conn.execute("UPDATE stock_items SET quantity = 1 WHERE id = ?1", [item.id])
            .unwrap();

        let changes = StockItem::recalculate_all(&conn, &calc).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].changed());
        assert_eq!(changes[0].old_quantity, 1.0);
        assert_eq!(changes[0].new_quantity, 24.0);

        let again = StockItem::recalculate_all(&conn, &calc).unwrap();
        assert!(!again[0].changed());
    }

    #[test]
    fn test_totals_group_by_category_and_unit() {
        let conn = setup();
        let calc = QuantityCalculator::default();
        StockItem::create(&conn, &beam(), &calc).unwrap();
        StockItem::create(&conn, &beam(), &calc).unwrap();

        let totals = StockItem::totals(&conn).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].category_name, "Timber");
        assert_eq!(totals[0].item_count, 2);
        assert_eq!(totals[0].total_quantity, 48.0);
    }
}
