//! Dimension units and feet conversion
//!
//! Length, breadth and height can be entered in feet, inches, centimeters or
//! meters. Calculations run in feet.

use serde::{Deserialize, Serialize};

/// Meters in one foot
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Unit a user entered dimensions in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    #[default]
    Ft,
    In,
    Cm,
    M,
}

impl DimensionUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionUnit::Ft => "ft",
            DimensionUnit::In => "in",
            DimensionUnit::Cm => "cm",
            DimensionUnit::M => "m",
        }
    }

    /// Parse from string. Unknown units yield None.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ft" | "feet" | "foot" => Some(DimensionUnit::Ft),
            "in" | "inch" | "inches" => Some(DimensionUnit::In),
            "cm" => Some(DimensionUnit::Cm),
            "m" => Some(DimensionUnit::M),
            _ => None,
        }
    }

    pub fn meters_per_unit(&self) -> f64 {
        match self {
            DimensionUnit::M => 1.0,
            DimensionUnit::Cm => 0.01,
            DimensionUnit::Ft => METERS_PER_FOOT,
            DimensionUnit::In => 0.0254,
        }
    }

    /// Convert a value in this unit to feet (via meters)
    pub fn to_feet(&self, value: f64) -> f64 {
        value * self.meters_per_unit() / METERS_PER_FOOT
    }
}

/// A number the calculator may use: present, finite and not negative
pub(crate) fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Dimensions of one piece as entered
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionInput {
    pub length: Option<f64>,
    pub breadth: Option<f64>,
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: DimensionUnit,
}

/// Dimensions of one piece in feet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeetDimensions {
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
}

impl DimensionInput {
    pub fn new(length: f64, breadth: f64, height: Option<f64>, unit: DimensionUnit) -> Self {
        Self {
            length: Some(length),
            breadth: Some(breadth),
            height,
            unit,
        }
    }

    /// Length and breadth are both usable
    pub fn is_complete(&self) -> bool {
        usable(self.length).is_some() && usable(self.breadth).is_some()
    }

    /// Height, or 1 when absent. A volume formula fed the identity height
    /// yields what is really an area.
    pub fn height_or_identity(&self) -> f64 {
        usable(self.height).unwrap_or(1.0)
    }

    /// Convert to feet. None when length or breadth is unusable.
    pub fn in_feet(&self) -> Option<FeetDimensions> {
        let length = usable(self.length)?;
        let breadth = usable(self.breadth)?;
        Some(FeetDimensions {
            length: self.unit.to_feet(length),
            breadth: self.unit.to_feet(breadth),
            height: self.unit.to_feet(self.height_or_identity()),
        })
    }

    /// Human-readable label, see [`format_dimensions`]
    pub fn label(&self) -> Option<String> {
        format_dimensions(self.length, self.breadth, self.height, self.unit)
    }
}

/// Join dimensions into a label such as `"4 × 2 × 1 ft"`.
///
/// Returns None if length or breadth is absent; the height segment is
/// omitted when height is absent.
pub fn format_dimensions(
    length: Option<f64>,
    breadth: Option<f64>,
    height: Option<f64>,
    unit: DimensionUnit,
) -> Option<String> {
    let (length, breadth) = (length?, breadth?);
    let label = match height {
        Some(height) => format!("{} × {} × {} {}", length, breadth, height, unit.as_str()),
        None => format!("{} × {} {}", length, breadth, unit.as_str()),
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_to_feet() {
        assert!(close(DimensionUnit::Ft.to_feet(4.0), 4.0));
        assert!(close(DimensionUnit::In.to_feet(12.0), 1.0));
        assert!(close(DimensionUnit::Cm.to_feet(30.48), 1.0));
        assert!(close(DimensionUnit::M.to_feet(0.3048), 1.0));
        assert!(close(DimensionUnit::M.to_feet(1.0), 1.0 / 0.3048));
    }

    #[test]
    fn test_dimension_unit_from_str() {
        assert_eq!(DimensionUnit::from_str("ft"), Some(DimensionUnit::Ft));
        assert_eq!(DimensionUnit::from_str(" IN "), Some(DimensionUnit::In));
        assert_eq!(DimensionUnit::from_str("cm"), Some(DimensionUnit::Cm));
        assert_eq!(DimensionUnit::from_str("m"), Some(DimensionUnit::M));
        assert_eq!(DimensionUnit::from_str("yd"), None);
    }

    #[test]
    fn test_format_dimensions() {
        assert_eq!(
            format_dimensions(Some(4.0), Some(2.0), None, DimensionUnit::Ft).as_deref(),
            Some("4 × 2 ft")
        );
        assert_eq!(
            format_dimensions(Some(4.0), Some(2.0), Some(1.0), DimensionUnit::Ft).as_deref(),
            Some("4 × 2 × 1 ft")
        );
        assert_eq!(
            format_dimensions(Some(2.5), Some(0.3), Some(0.15), DimensionUnit::M).as_deref(),
            Some("2.5 × 0.3 × 0.15 m")
        );
        assert_eq!(format_dimensions(None, Some(2.0), Some(1.0), DimensionUnit::Ft), None);
        assert_eq!(format_dimensions(Some(4.0), None, None, DimensionUnit::Ft), None);
    }

    #[test]
    fn test_completeness_and_height_default() {
        let dims = DimensionInput::new(4.0, 2.0, None, DimensionUnit::Ft);
        assert!(dims.is_complete());
        assert_eq!(dims.height_or_identity(), 1.0);

        let missing_breadth = DimensionInput {
            breadth: None,
            ..dims
        };
        assert!(!missing_breadth.is_complete());
        assert!(missing_breadth.in_feet().is_none());

        let nan_length = DimensionInput {
            length: Some(f64::NAN),
            ..dims
        };
        assert!(!nan_length.is_complete());
    }

    #[test]
    fn test_in_feet_converts_every_side() {
        let dims = DimensionInput::new(24.0, 12.0, Some(6.0), DimensionUnit::In);
        let ft = dims.in_feet().unwrap();
        assert!(close(ft.length, 2.0));
        assert!(close(ft.breadth, 1.0));
        assert!(close(ft.height, 0.5));
    }
}
