//! Unit catalog
//!
//! Static registry of stock-keeping units, their types, and which unit types
//! each item category may use.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Classification of a stock-keeping unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Cubic measure (CFT, m3)
    Volume,
    /// Surface measure (SFT, m2)
    Area,
    /// Running measure (RFT)
    Length,
    /// Discrete pieces (NOS, PCS)
    Count,
    /// Mass, derived from weight-per-piece (KG, GRAMS)
    Weight,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Volume,
        UnitType::Area,
        UnitType::Length,
        UnitType::Count,
        UnitType::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Volume => "volume",
            UnitType::Area => "area",
            UnitType::Length => "length",
            UnitType::Count => "count",
            UnitType::Weight => "weight",
        }
    }

    /// Whether quantities of this type are derived from length/breadth/height
    pub fn supports_dimensions(&self) -> bool {
        matches!(self, UnitType::Volume | UnitType::Area | UnitType::Length)
    }
}

/// Formula turning feet-denominated dimensions into a quantity.
///
/// Attached to a unit definition as data, so adding a dimensioned unit means
/// adding a catalog row that names one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionFormula {
    /// length × breadth × height × pieces, in cubic feet
    CubicFeet,
    /// length × pieces, in feet
    RunningFeet,
    /// length × breadth × pieces, in square feet
    SquareFeet,
    /// square feet ÷ 10.7639
    SquareMeters,
    /// cubic feet ÷ 35.3147
    CubicMeters,
}

/// A stock-keeping unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDefinition {
    pub code: &'static str,
    pub label: &'static str,
    pub unit_type: UnitType,
    /// Present only for dimension-supporting units that have a formula
    pub formula: Option<DimensionFormula>,
    /// Divisor bringing weight totals to the kilogram base (1000 for grams)
    pub weight_divisor: f64,
}

impl UnitDefinition {
    pub const fn dimensioned(
        code: &'static str,
        label: &'static str,
        unit_type: UnitType,
        formula: DimensionFormula,
    ) -> Self {
        Self {
            code,
            label,
            unit_type,
            formula: Some(formula),
            weight_divisor: 1.0,
        }
    }

    pub const fn count(code: &'static str, label: &'static str) -> Self {
        Self {
            code,
            label,
            unit_type: UnitType::Count,
            formula: None,
            weight_divisor: 1.0,
        }
    }

    pub const fn weight(code: &'static str, label: &'static str, weight_divisor: f64) -> Self {
        Self {
            code,
            label,
            unit_type: UnitType::Weight,
            formula: None,
            weight_divisor,
        }
    }
}

/// Unit types an item category may be stocked in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryUnitRule {
    pub category_id: i64,
    pub name: &'static str,
    pub unit_types: &'static [UnitType],
}

/// A `{value, label}` pair for a unit selection control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOption {
    pub value: String,
    pub label: String,
}

impl From<&UnitDefinition> for UnitOption {
    fn from(unit: &UnitDefinition) -> Self {
        Self {
            value: unit.code.to_string(),
            label: unit.label.to_string(),
        }
    }
}

// ============================================================================
// Standard catalog
// ============================================================================

/// Sq-ft per sq-meter
pub const SQFT_PER_SQM: f64 = 10.7639;
/// Cu-ft per cu-meter
pub const CUFT_PER_CUM: f64 = 35.3147;
/// Grams per kilogram
pub const GRAMS_PER_KG: f64 = 1000.0;

/// Units in declaration order. Listing order follows this array.
pub const STANDARD_UNITS: [UnitDefinition; 10] = [
    UnitDefinition::dimensioned("CFT", "Cubic Feet", UnitType::Volume, DimensionFormula::CubicFeet),
    UnitDefinition::dimensioned("m3", "Cubic Meter", UnitType::Volume, DimensionFormula::CubicMeters),
    UnitDefinition::dimensioned("SFT", "Square Feet", UnitType::Area, DimensionFormula::SquareFeet),
    UnitDefinition::dimensioned("m2", "Square Meter", UnitType::Area, DimensionFormula::SquareMeters),
    UnitDefinition::dimensioned("RFT", "Running Feet", UnitType::Length, DimensionFormula::RunningFeet),
    UnitDefinition::count("NOS", "Numbers"),
    UnitDefinition::count("PCS", "Pieces"),
    UnitDefinition::count("BUNDLE", "Bundle"),
    UnitDefinition::weight("KG", "Kilograms", 1.0),
    UnitDefinition::weight("GRAMS", "Grams", GRAMS_PER_KG),
];

pub const STANDARD_CATEGORIES: [CategoryUnitRule; 4] = [
    CategoryUnitRule {
        category_id: 1,
        name: "Timber",
        unit_types: &[UnitType::Volume, UnitType::Length],
    },
    CategoryUnitRule {
        category_id: 2,
        name: "Plywood",
        unit_types: &[UnitType::Area, UnitType::Count],
    },
    CategoryUnitRule {
        category_id: 3,
        name: "Hardware",
        unit_types: &[UnitType::Count, UnitType::Weight],
    },
    CategoryUnitRule {
        category_id: 4,
        name: "Miscellaneous",
        unit_types: &UnitType::ALL,
    },
];

static STANDARD: LazyLock<UnitCatalog> =
    LazyLock::new(|| UnitCatalog::new(STANDARD_UNITS.to_vec(), STANDARD_CATEGORIES.to_vec()));

// ============================================================================
// Catalog
// ============================================================================

/// Immutable registry of units and category rules
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    units: Vec<UnitDefinition>,
    by_code: HashMap<&'static str, usize>,
    categories: Vec<CategoryUnitRule>,
}

impl UnitCatalog {
    /// Build a catalog. A repeated code keeps its first declaration.
    pub fn new(units: Vec<UnitDefinition>, categories: Vec<CategoryUnitRule>) -> Self {
        let mut by_code = HashMap::with_capacity(units.len());
        for (idx, unit) in units.iter().enumerate() {
            by_code.entry(unit.code).or_insert(idx);
        }
        Self {
            units,
            by_code,
            categories,
        }
    }

    /// The process-wide catalog of timber trade units
    pub fn standard() -> &'static UnitCatalog {
        &STANDARD
    }

    /// Look up a unit by its exact code
    pub fn get(&self, code: &str) -> Option<&UnitDefinition> {
        self.by_code.get(code).map(|&idx| &self.units[idx])
    }

    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    pub fn categories(&self) -> &[CategoryUnitRule] {
        &self.categories
    }

    pub fn category(&self, category_id: i64) -> Option<&CategoryUnitRule> {
        self.categories.iter().find(|c| c.category_id == category_id)
    }

    /// Units a category may use, in declaration order. Unknown or absent
    /// category yields an empty list.
    pub fn list_units_for_category(&self, category_id: Option<i64>) -> Vec<UnitOption> {
        let Some(rule) = category_id.and_then(|id| self.category(id)) else {
            return Vec::new();
        };
        self.units
            .iter()
            .filter(|u| rule.unit_types.contains(&u.unit_type))
            .map(UnitOption::from)
            .collect()
    }

    /// Whether a unit is offered for a category
    pub fn is_unit_allowed(&self, category_id: i64, code: &str) -> bool {
        match (self.category(category_id), self.get(code)) {
            (Some(rule), Some(unit)) => rule.unit_types.contains(&unit.unit_type),
            _ => false,
        }
    }

    pub fn supports_dimensions(&self, code: &str) -> bool {
        self.get(code)
            .is_some_and(|u| u.unit_type.supports_dimensions())
    }

    pub fn requires_weight_per_piece(&self, code: &str) -> bool {
        self.get(code).is_some_and(|u| u.unit_type == UnitType::Weight)
    }

    /// Render `"<quantity> <label>"`, or the bare quantity for an unknown code
    pub fn format_quantity(&self, quantity: f64, code: &str) -> String {
        match self.get(code) {
            Some(unit) => format!("{} {}", quantity, unit.label),
            None => quantity.to_string(),
        }
    }
}

// ============================================================================
// Free functions over the standard catalog
// ============================================================================

pub fn list_units_for_category(category_id: Option<i64>) -> Vec<UnitOption> {
    UnitCatalog::standard().list_units_for_category(category_id)
}

pub fn supports_dimensions(code: &str) -> bool {
    UnitCatalog::standard().supports_dimensions(code)
}

pub fn requires_weight_per_piece(code: &str) -> bool {
    UnitCatalog::standard().requires_weight_per_piece(code)
}

pub fn format_quantity(quantity: f64, code: &str) -> String {
    UnitCatalog::standard().format_quantity(quantity, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(options: &[UnitOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn test_hardware_lists_count_and_weight_in_declaration_order() {
        let units = list_units_for_category(Some(3));
        assert_eq!(values(&units), vec!["NOS", "PCS", "BUNDLE", "KG", "GRAMS"]);
        assert_eq!(units[0].label, "Numbers");
    }

    #[test]
    fn test_timber_lists_volume_and_length() {
        let units = list_units_for_category(Some(1));
        assert_eq!(values(&units), vec!["CFT", "m3", "RFT"]);
    }

    #[test]
    fn test_miscellaneous_lists_everything() {
        let units = list_units_for_category(Some(4));
        assert_eq!(units.len(), STANDARD_UNITS.len());
        assert_eq!(units.first().map(|u| u.value.as_str()), Some("CFT"));
        assert_eq!(units.last().map(|u| u.value.as_str()), Some("GRAMS"));
    }

    #[test]
    fn test_unknown_or_absent_category_is_empty() {
        assert!(list_units_for_category(Some(99)).is_empty());
        assert!(list_units_for_category(None).is_empty());
    }

    #[test]
    fn test_supports_dimensions() {
        assert!(supports_dimensions("CFT"));
        assert!(supports_dimensions("m2"));
        assert!(supports_dimensions("RFT"));
        assert!(!supports_dimensions("NOS"));
        assert!(!supports_dimensions("KG"));
        assert!(!supports_dimensions("NOT_A_UNIT"));
        assert!(!supports_dimensions(""));
    }

    #[test]
    fn test_requires_weight_per_piece() {
        assert!(requires_weight_per_piece("KG"));
        assert!(requires_weight_per_piece("GRAMS"));
        assert!(!requires_weight_per_piece("CFT"));
        assert!(!requires_weight_per_piece("cft"));
        assert!(!requires_weight_per_piece(""));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(24.0, "CFT"), "24 Cubic Feet");
        assert_eq!(format_quantity(2.5, "KG"), "2.5 Kilograms");
        assert_eq!(format_quantity(7.0, "NOT_A_UNIT"), "7");
    }

    #[test]
    fn test_is_unit_allowed() {
        let catalog = UnitCatalog::standard();
        assert!(catalog.is_unit_allowed(1, "CFT"));
        assert!(!catalog.is_unit_allowed(1, "KG"));
        assert!(!catalog.is_unit_allowed(42, "CFT"));
    }

    #[test]
    fn test_custom_catalog_keeps_first_duplicate() {
        let catalog = UnitCatalog::new(
            vec![
                UnitDefinition::count("EA", "Each"),
                UnitDefinition::weight("EA", "Shadowed", 1.0),
            ],
            vec![],
        );
        assert_eq!(catalog.get("EA").map(|u| u.label), Some("Each"));
        assert_eq!(catalog.units().len(), 2);
    }

    #[test]
    fn test_unit_type_str_matches_serialized_name() {
        for t in UnitType::ALL {
            assert_eq!(serde_json::to_value(t).unwrap(), serde_json::json!(t.as_str()));
        }
    }
}
