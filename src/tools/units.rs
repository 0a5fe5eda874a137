//! Unit MCP Tools
//!
//! Catalog lookups and quantity calculation without touching stock.

use serde::Serialize;

use crate::units::{
    format_dimensions, DimensionUnit, QuantityCalculator, QuantityForm, QuantitySource,
    UnitCatalog, UnitDefinition, UnitListing, UnitLookup,
};

/// Response for unit_info
#[derive(Debug, Serialize)]
pub struct UnitInfoResponse {
    pub known: bool,
    pub unit: Option<UnitDefinition>,
    pub supports_dimensions: bool,
    pub requires_weight_per_piece: bool,
    /// Category ids that offer this unit
    pub offered_in_categories: Vec<i64>,
}

/// Response for compute_quantity
#[derive(Debug, Serialize)]
pub struct ComputeQuantityResponse {
    pub unit: String,
    pub quantity: f64,
    pub source: QuantitySource,
    pub formatted: String,
    pub dimensions_label: Option<String>,
}

/// Response for format_dimensions
#[derive(Debug, Serialize)]
pub struct FormatDimensionsResponse {
    pub label: Option<String>,
}

/// Units a category offers, remote service first
pub async fn list_units_for_category(lookup: &UnitLookup, category_id: i64) -> UnitListing {
    lookup.units_for_category(category_id).await
}

/// Describe a unit code
pub fn unit_info(catalog: &UnitCatalog, code: &str) -> UnitInfoResponse {
    let code = code.trim();
    let offered_in_categories = catalog
        .categories()
        .iter()
        .filter(|c| catalog.is_unit_allowed(c.category_id, code))
        .map(|c| c.category_id)
        .collect();

    UnitInfoResponse {
        known: catalog.get(code).is_some(),
        unit: catalog.get(code).cloned(),
        supports_dimensions: catalog.supports_dimensions(code),
        requires_weight_per_piece: catalog.requires_weight_per_piece(code),
        offered_in_categories,
    }
}

/// Compute a quantity from form fields
pub fn compute_quantity(calculator: &QuantityCalculator, form: &QuantityForm) -> ComputeQuantityResponse {
    let spec = form.to_spec();
    let result = calculator.compute_detailed(&spec);
    tracing::debug!(
        "compute_quantity unit={} quantity={} source={:?}",
        spec.unit,
        result.quantity,
        result.source
    );

    ComputeQuantityResponse {
        formatted: calculator.catalog().format_quantity(result.quantity, &spec.unit),
        dimensions_label: spec.dimensions.and_then(|d| d.label()),
        unit: spec.unit,
        quantity: result.quantity,
        source: result.source,
    }
}

/// Format dimensions into a label
pub fn format_dimensions_label(
    length: Option<f64>,
    breadth: Option<f64>,
    height: Option<f64>,
    dim_unit: Option<&str>,
) -> Result<FormatDimensionsResponse, String> {
    let unit = match dim_unit {
        None => DimensionUnit::default(),
        Some(s) => DimensionUnit::from_str(s)
            .ok_or_else(|| format!("Unknown dimension unit '{}': use ft, in, cm or m", s))?,
    };
    Ok(FormatDimensionsResponse {
        label: format_dimensions(length, breadth, height, unit),
    })
}
