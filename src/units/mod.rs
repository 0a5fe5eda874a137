//! Unit catalog and quantity calculation
//!
//! Maps stock units to their types and derives canonical quantities from
//! dimensions, piece counts or weights.

pub mod calculator;
pub mod catalog;
pub mod dimensions;
pub mod parse;
pub mod remote;

pub use calculator::{
    compute_quantity, round6, ItemQuantitySpec, QuantityCalculator, QuantityResult, QuantitySource,
};
pub use catalog::{
    format_quantity, list_units_for_category, requires_weight_per_piece, supports_dimensions,
    CategoryUnitRule, DimensionFormula, UnitCatalog, UnitDefinition, UnitOption, UnitType,
};
pub use dimensions::{format_dimensions, DimensionInput, DimensionUnit, FeetDimensions};
pub use parse::{
    checked_dim_unit, checked_number, checked_pieces, parse_number, parse_pieces, NumericInput,
    QuantityForm,
};
pub use remote::{RemoteError, UnitListSource, UnitListing, UnitLookup};
