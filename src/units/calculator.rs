//! Quantity calculator
//!
//! Reduces an item's unit, dimensions, piece count and weight-per-piece to a
//! single stock quantity.

use serde::{Deserialize, Serialize};

use super::catalog::{
    DimensionFormula, UnitCatalog, UnitType, CUFT_PER_CUM, SQFT_PER_SQM,
};
use super::dimensions::{usable, DimensionInput, FeetDimensions};

/// Results are rounded to this many parts per unit (6 decimal places)
pub const ROUNDING_SCALE: f64 = 1_000_000.0;

/// Round to 6 decimal places, collapsing floating-point noise
pub fn round6(value: f64) -> f64 {
    (value * ROUNDING_SCALE).round() / ROUNDING_SCALE
}

/// Everything needed to derive one item's quantity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemQuantitySpec {
    pub unit: String,
    #[serde(default)]
    pub dimensions: Option<DimensionInput>,
    /// Absent pieces count as 1 for dimension formulas only
    #[serde(default)]
    pub pieces: Option<u32>,
    #[serde(default)]
    pub weight_per_piece: Option<f64>,
    /// Quantity typed directly by the user
    #[serde(default)]
    pub raw_quantity: Option<f64>,
}

impl ItemQuantitySpec {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Default::default()
        }
    }

    pub fn with_dimensions(mut self, dimensions: DimensionInput) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_pieces(mut self, pieces: u32) -> Self {
        self.pieces = Some(pieces);
        self
    }

    pub fn with_weight_per_piece(mut self, weight: f64) -> Self {
        self.weight_per_piece = Some(weight);
        self
    }

    pub fn with_raw_quantity(mut self, quantity: f64) -> Self {
        self.raw_quantity = Some(quantity);
        self
    }
}

/// Which input the quantity was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantitySource {
    /// The directly entered quantity
    RawQuantity,
    /// Piece count of a count-type unit
    Pieces,
    /// weight-per-piece × pieces
    Weight,
    /// A dimension formula
    Dimensions,
    /// Nothing usable; zero
    Zero,
}

/// A computed quantity and how it was reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantityResult {
    pub quantity: f64,
    pub source: QuantitySource,
}

impl QuantityResult {
    fn fallback(raw: Option<f64>) -> Self {
        match raw {
            Some(quantity) => Self {
                quantity,
                source: QuantitySource::RawQuantity,
            },
            None => Self {
                quantity: 0.0,
                source: QuantitySource::Zero,
            },
        }
    }
}

impl DimensionFormula {
    /// Apply to one piece's feet dimensions, multiplied by the piece count
    pub fn apply(&self, ft: &FeetDimensions, pieces: f64) -> f64 {
        match self {
            DimensionFormula::CubicFeet => ft.length * ft.breadth * ft.height * pieces,
            DimensionFormula::RunningFeet => ft.length * pieces,
            DimensionFormula::SquareFeet => ft.length * ft.breadth * pieces,
            DimensionFormula::SquareMeters => {
                DimensionFormula::SquareFeet.apply(ft, pieces) / SQFT_PER_SQM
            }
            DimensionFormula::CubicMeters => {
                DimensionFormula::CubicFeet.apply(ft, pieces) / CUFT_PER_CUM
            }
        }
    }
}

/// Calculator bound to a unit catalog
#[derive(Debug, Clone, Copy)]
pub struct QuantityCalculator<'a> {
    catalog: &'a UnitCatalog,
}

impl Default for QuantityCalculator<'static> {
    fn default() -> Self {
        Self::new(UnitCatalog::standard())
    }
}

impl<'a> QuantityCalculator<'a> {
    pub fn new(catalog: &'a UnitCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a UnitCatalog {
        self.catalog
    }

    /// Compute the stock quantity. Never fails; see [`Self::compute_detailed`].
    pub fn compute(&self, spec: &ItemQuantitySpec) -> f64 {
        self.compute_detailed(spec).quantity
    }

    /// Compute the stock quantity and report which input produced it.
    ///
    /// Precedence:
    /// 1. unknown unit: raw quantity or 0
    /// 2. raw quantity given, dimensions incomplete, unit not weighed: raw quantity
    /// 3. count unit: pieces, else raw quantity, else 0
    /// 4. weight unit: weight-per-piece × pieces (grams normalised to kg)
    /// 5. dimensioned unit with length and breadth: the unit's formula
    /// 6. otherwise raw quantity or 0
    pub fn compute_detailed(&self, spec: &ItemQuantitySpec) -> QuantityResult {
        let raw = usable(spec.raw_quantity);

        let Some(unit) = self.catalog.get(&spec.unit) else {
            return QuantityResult::fallback(raw);
        };

        let dimensions_complete = spec
            .dimensions
            .as_ref()
            .is_some_and(DimensionInput::is_complete);
        let weighed = unit.unit_type == UnitType::Weight;

        if raw.is_some() && !dimensions_complete && !weighed {
            return QuantityResult::fallback(raw);
        }

        let result = match unit.unit_type {
            UnitType::Count => match spec.pieces {
                Some(pieces) => QuantityResult {
                    quantity: f64::from(pieces),
                    source: QuantitySource::Pieces,
                },
                None => QuantityResult::fallback(raw),
            },
            UnitType::Weight => {
                match (usable(spec.weight_per_piece), spec.pieces) {
                    (Some(weight), Some(pieces)) => QuantityResult {
                        quantity: round6(weight * f64::from(pieces) / unit.weight_divisor),
                        source: QuantitySource::Weight,
                    },
                    _ => QuantityResult::fallback(raw),
                }
            }
            UnitType::Volume | UnitType::Area | UnitType::Length => {
                let feet = spec.dimensions.as_ref().and_then(DimensionInput::in_feet);
                match (feet, unit.formula) {
                    (Some(ft), Some(formula)) => {
                        let pieces = f64::from(spec.pieces.unwrap_or(1));
                        QuantityResult {
                            quantity: round6(formula.apply(&ft, pieces)),
                            source: QuantitySource::Dimensions,
                        }
                    }
                    _ => QuantityResult::fallback(raw),
                }
            }
        };

        if result.quantity.is_finite() && result.quantity >= 0.0 {
            result
        } else {
            QuantityResult::fallback(raw)
        }
    }
}

/// Compute a quantity against the standard catalog
pub fn compute_quantity(spec: &ItemQuantitySpec) -> f64 {
    QuantityCalculator::default().compute(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::catalog::UnitDefinition;
    use crate::units::dimensions::DimensionUnit;

    fn ft(length: f64, breadth: f64, height: Option<f64>) -> DimensionInput {
        DimensionInput::new(length, breadth, height, DimensionUnit::Ft)
    }

    #[test]
    fn test_cft_volume_is_exact() {
        let spec = ItemQuantitySpec::new("CFT")
            .with_dimensions(ft(4.0, 2.0, Some(1.0)))
            .with_pieces(3);
        assert_eq!(compute_quantity(&spec), 24.0);
    }

    #[test]
    fn test_cubic_meter_from_feet() {
        let spec = ItemQuantitySpec::new("m3")
            .with_dimensions(ft(35.3147, 1.0, Some(1.0)))
            .with_pieces(1);
        assert!((compute_quantity(&spec) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_square_meter_from_feet() {
        let spec = ItemQuantitySpec::new("m2")
            .with_dimensions(ft(10.7639, 1.0, None))
            .with_pieces(2);
        assert!((compute_quantity(&spec) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_running_feet_ignores_breadth_and_height() {
        let spec = ItemQuantitySpec::new("RFT")
            .with_dimensions(ft(10.0, 999.0, Some(42.0)))
            .with_pieces(2);
        assert_eq!(compute_quantity(&spec), 20.0);
    }

    #[test]
    fn test_square_feet_from_inches() {
        // 24in × 12in = 2ft × 1ft = 2 sft per piece
        let spec = ItemQuantitySpec::new("SFT")
            .with_dimensions(DimensionInput::new(24.0, 12.0, None, DimensionUnit::In))
            .with_pieces(5);
        assert_eq!(compute_quantity(&spec), 10.0);
    }

    #[test]
    fn test_cft_from_centimeters_rounds_away_noise() {
        // 30.48cm on every side is exactly one cubic foot
        let spec = ItemQuantitySpec::new("CFT")
            .with_dimensions(DimensionInput::new(30.48, 30.48, Some(30.48), DimensionUnit::Cm))
            .with_pieces(336);
        assert_eq!(compute_quantity(&spec), 336.0);
    }

    #[test]
    fn test_volume_without_height_uses_identity() {
        let spec = ItemQuantitySpec::new("CFT")
            .with_dimensions(ft(4.0, 2.0, None))
            .with_pieces(3);
        assert_eq!(compute_quantity(&spec), 24.0);
    }

    #[test]
    fn test_dimension_formula_defaults_to_one_piece() {
        let spec = ItemQuantitySpec::new("SFT").with_dimensions(ft(8.0, 4.0, None));
        assert_eq!(compute_quantity(&spec), 32.0);
    }

    #[test]
    fn test_grams_normalise_to_kilograms() {
        let spec = ItemQuantitySpec::new("GRAMS")
            .with_weight_per_piece(500.0)
            .with_pieces(4);
        assert_eq!(compute_quantity(&spec), 2.0);
    }

    #[test]
    fn test_kilograms_multiply_weight_by_pieces() {
        let spec = ItemQuantitySpec::new("KG")
            .with_weight_per_piece(0.35)
            .with_pieces(3);
        assert_eq!(compute_quantity(&spec), 1.05);
    }

    #[test]
    fn test_weight_ignores_raw_shortcut_when_weights_present() {
        let spec = ItemQuantitySpec::new("KG")
            .with_weight_per_piece(2.0)
            .with_pieces(5)
            .with_raw_quantity(3.0);
        assert_eq!(compute_quantity(&spec), 10.0);
    }

    #[test]
    fn test_weight_without_pieces_falls_back() {
        let spec = ItemQuantitySpec::new("KG")
            .with_weight_per_piece(2.0)
            .with_raw_quantity(3.0);
        assert_eq!(compute_quantity(&spec), 3.0);
        assert_eq!(compute_quantity(&ItemQuantitySpec::new("KG").with_pieces(3)), 0.0);
    }

    #[test]
    fn test_count_unit_returns_pieces() {
        for n in [1, 2, 17, 1000] {
            for unit in ["NOS", "PCS", "BUNDLE"] {
                let spec = ItemQuantitySpec::new(unit).with_pieces(n);
                assert_eq!(compute_quantity(&spec), f64::from(n));
            }
        }
    }

    #[test]
    fn test_count_unit_prefers_raw_quantity_without_dimensions() {
        let spec = ItemQuantitySpec::new("NOS").with_pieces(4).with_raw_quantity(9.0);
        assert_eq!(compute_quantity(&spec), 9.0);
    }

    #[test]
    fn test_raw_quantity_wins_when_dimensions_incomplete() {
        let spec = ItemQuantitySpec::new("CFT")
            .with_dimensions(DimensionInput {
                length: Some(4.0),
                ..Default::default()
            })
            .with_raw_quantity(12.5);
        let result = QuantityCalculator::default().compute_detailed(&spec);
        assert_eq!(result.quantity, 12.5);
        assert_eq!(result.source, QuantitySource::RawQuantity);
    }

    #[test]
    fn test_dimensions_beat_raw_quantity_when_complete() {
        let spec = ItemQuantitySpec::new("CFT")
            .with_dimensions(ft(2.0, 2.0, Some(2.0)))
            .with_raw_quantity(99.0);
        assert_eq!(compute_quantity(&spec), 8.0);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_raw_quantity() {
        let spec = ItemQuantitySpec::new("NOT_A_UNIT").with_raw_quantity(7.0);
        assert_eq!(compute_quantity(&spec), 7.0);
        assert_eq!(compute_quantity(&ItemQuantitySpec::new("NOT_A_UNIT")), 0.0);
    }

    #[test]
    fn test_unusable_numbers_are_treated_as_absent() {
        let nan_raw = ItemQuantitySpec::new("NOT_A_UNIT").with_raw_quantity(f64::NAN);
        assert_eq!(compute_quantity(&nan_raw), 0.0);

        let infinite = ItemQuantitySpec::new("CFT")
            .with_dimensions(ft(f64::INFINITY, 2.0, Some(1.0)))
            .with_pieces(1);
        let result = QuantityCalculator::default().compute_detailed(&infinite);
        assert_eq!(result.quantity, 0.0);
        assert_eq!(result.source, QuantitySource::Zero);

        let negative_weight = ItemQuantitySpec::new("KG")
            .with_weight_per_piece(-1.0)
            .with_pieces(2);
        assert_eq!(compute_quantity(&negative_weight), 0.0);
    }

    #[test]
    fn test_overflow_degrades_to_fallback() {
        let spec = ItemQuantitySpec::new("CFT")
            .with_dimensions(ft(f64::MAX, f64::MAX, Some(f64::MAX)))
            .with_pieces(1)
            .with_raw_quantity(5.0);
        assert_eq!(compute_quantity(&spec), 5.0);
    }

    #[test]
    fn test_dimensioned_unit_without_formula_falls_back() {
        let catalog = UnitCatalog::new(
            vec![UnitDefinition {
                code: "GIRTH",
                label: "Girth",
                unit_type: UnitType::Volume,
                formula: None,
                weight_divisor: 1.0,
            }],
            vec![],
        );
        let calculator = QuantityCalculator::new(&catalog);
        let spec = ItemQuantitySpec::new("GIRTH")
            .with_dimensions(ft(4.0, 2.0, Some(1.0)))
            .with_pieces(2);
        assert_eq!(calculator.compute(&spec), 0.0);
    }

    #[test]
    fn test_computation_is_deterministic() {
        let spec = ItemQuantitySpec::new("m3")
            .with_dimensions(DimensionInput::new(3.7, 0.23, Some(0.11), DimensionUnit::M))
            .with_pieces(13);
        assert_eq!(compute_quantity(&spec), compute_quantity(&spec));
    }

    #[test]
    fn test_round6_is_idempotent() {
        for x in [0.0, 1.0, 335.99999999, 1.2345675, 123456.7890123, 1e-7, 2.0 / 3.0] {
            assert_eq!(round6(round6(x)), round6(x));
        }
        assert_eq!(round6(335.99999999), 336.0);
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: ItemQuantitySpec = serde_json::from_str(
            r#"{"unit": "CFT", "dimensions": {"length": 4, "breadth": 2, "height": 1}, "pieces": 3}"#,
        )
        .unwrap();
        assert_eq!(spec.dimensions.map(|d| d.unit), Some(DimensionUnit::Ft));
        assert_eq!(compute_quantity(&spec), 24.0);
    }
}
