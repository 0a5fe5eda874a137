//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::{params, Connection};

use super::connection::DbResult;
use crate::units::UnitCatalog;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: categories and stock items
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- Item categories; which units each offers lives in the unit catalog
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Stock items. quantity is derived from the measurement columns
        -- and rewritten whenever they change.
        CREATE TABLE stock_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
            unit TEXT NOT NULL,                  -- catalog code, e.g. "CFT"

            length REAL,
            breadth REAL,
            height REAL,
            dim_unit TEXT NOT NULL DEFAULT 'ft' CHECK(dim_unit IN ('ft', 'in', 'cm', 'm')),
            pieces INTEGER,
            weight_per_piece REAL,
            entered_quantity REAL,               -- quantity typed by the user, if any

            quantity REAL NOT NULL DEFAULT 0,
            dimensions_label TEXT,               -- e.g. "4 × 2 × 1 ft"

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_stock_items_name ON stock_items(name);
        CREATE INDEX idx_stock_items_category ON stock_items(category_id);
        CREATE INDEX idx_stock_items_unit ON stock_items(unit);
        "#,
    )?;

    let mut insert = conn.prepare("INSERT INTO categories (id, name) VALUES (?1, ?2)")?;
    for rule in UnitCatalog::standard().categories() {
        insert.execute(params![rule.category_id, rule.name])?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
