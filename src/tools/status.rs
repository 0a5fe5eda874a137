//! Status Tool
//!
//! Runtime status of the timberstock service and usage instructions.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Stock-keeping instructions for AI assistants
pub const STOCK_INSTRUCTIONS: &str = r#"
# Timber Stock Instructions

## Choosing a unit

Call `list_units_for_category` with the item's category before adding stock.
Categories:

| id | Category      | Unit types        |
|----|---------------|-------------------|
| 1  | Timber        | volume, length    |
| 2  | Plywood       | area, count       |
| 3  | Hardware      | count, weight     |
| 4  | Miscellaneous | any               |

## How quantity is derived

| Unit  | Provide                                 | Quantity                     |
|-------|-----------------------------------------|------------------------------|
| CFT   | length, breadth, height, dim_unit, pieces | l × b × h × pieces (cu ft) |
| m3    | same as CFT                             | CFT ÷ 35.3147                |
| SFT   | length, breadth, dim_unit, pieces       | l × b × pieces (sq ft)       |
| m2    | same as SFT                             | SFT ÷ 10.7639                |
| RFT   | length, dim_unit, pieces (breadth too)  | l × pieces (ft)              |
| NOS, PCS, BUNDLE | pieces                       | pieces                       |
| KG    | weight_per_piece, pieces                | weight × pieces              |
| GRAMS | weight_per_piece (grams), pieces        | weight × pieces ÷ 1000       |

- dim_unit is one of ft, in, cm, m (default ft). Dimensions are converted to feet.
- Height is optional. A CFT/m3 item without height is computed with height 1.
- RFT still needs a breadth value to be considered measured.
- If measurements are incomplete, `quantity` is used as typed.
- Results are rounded to 6 decimal places.

Use `compute_quantity` to preview a result without storing anything.

## Keeping stock

- `add_stock_item` stores the measurements and the derived quantity.
- `update_stock_item` re-derives the quantity; pass `clear_dimensions: true`
  when switching an item away from measured units.
- `recalculate_stock_quantities` re-derives every stored quantity.
- `stock_summary` totals quantity per category and unit.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    /// Remote category unit service, if configured
    pub units_service_url: Option<String>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    units_service_url: Option<String>,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, units_service_url: Option<String>) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            units_service_url,
        }
    }

    pub fn get_status(&self) -> ServiceStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            units_service_url: self.units_service_url.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
