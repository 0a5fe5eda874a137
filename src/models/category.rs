//! Category model
//!
//! Item categories. The units a category offers come from the unit catalog.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::db::DbResult;
use crate::units::{UnitCatalog, UnitType};

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Unit types the catalog permits for this category
    pub unit_types: Vec<UnitType>,
    pub created_at: String,
}

impl Category {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let id: i64 = row.get("id")?;
        let unit_types = UnitCatalog::standard()
            .category(id)
            .map(|rule| rule.unit_types.to_vec())
            .unwrap_or_default();
        Ok(Self {
            id,
            name: row.get("name")?,
            unit_types,
            created_at: row.get("created_at")?,
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn exists(conn: &Connection, id: i64) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
