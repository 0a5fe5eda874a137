//! Timber Stock Manager
//!
//! An MCP server for timber stock keeping.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use timberstock::build_info;
use timberstock::config::Config;
use timberstock::db::{self, Database};
use timberstock::mcp::TimberService;
use timberstock::units::UnitLookup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr; stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("timberstock=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    build_info::print_startup_banner(&config);
    eprintln!("Starting MCP server on stdio...");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        tracing::info!("Database schema version: {}", version);
        Ok(())
    })?;

    let unit_lookup = match UnitLookup::new(config.units_service_url.clone(), config.units_service_timeout) {
        Ok(lookup) => lookup,
        Err(e) => {
            tracing::warn!("Unit service client unavailable ({}), using local catalog", e);
            UnitLookup::local()
        }
    };

    let service = TimberService::new(config.database_path, database, unit_lookup);
    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
