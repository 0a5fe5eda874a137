//! Re-derive stored stock quantities from their measurements
//! Usage: cargo run --bin recalculate_stock -- [--dry-run]

use timberstock::config::Config;
use timberstock::db::{migrations, Database};
use timberstock::models::StockItem;
use timberstock::units::QuantityCalculator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = std::env::args().skip(1).any(|a| a == "--dry-run");

    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    let calculator = QuantityCalculator::default();

    let mut conn = database.get_conn()?;
    if migrations::needs_migration(&conn)? {
        println!(
            "Upgrading schema from version {}",
            migrations::get_schema_version(&conn)?
        );
        migrations::run_migrations(&conn)?;
    }

    // Recompute in one transaction; a dry run rolls it back

    let tx = conn.transaction()?;
    let changes = StockItem::recalculate_all(&tx, &calculator)?;
    if dry_run {
        tx.rollback()?;
    } else {
        tx.commit()?;
    }

    println!("Checked {} stock items", changes.len());
    let changed: Vec<_> = changes.iter().filter(|c| c.changed()).collect();
    for change in &changed {
        println!(
            "  #{} {}: {} -> {} {}",
            change.id, change.name, change.old_quantity, change.new_quantity, change.unit
        );
    }

    if dry_run {
        println!("Dry run: {} quantities would change", changed.len());
    } else {
        println!("Updated {} quantities", changed.len());
    }

    Ok(())
}
