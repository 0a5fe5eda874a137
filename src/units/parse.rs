//! Numeric input parsing
//!
//! Form fields arrive as text or JSON numbers. These rules decide which of
//! them the calculator gets to see; anything rejected is treated as absent.

use std::borrow::Cow;

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::calculator::ItemQuantitySpec;
use super::dimensions::{usable, DimensionInput, DimensionUnit};

/// Parse a user-entered decimal.
///
/// - surrounding whitespace is trimmed; empty input is absent
/// - the whole string must be a number (`"12abc"` is rejected)
/// - a single `,` is read as the decimal separator when there is no `.`,
///   except `1,250` style input, which is a thousands separator and rejected
/// - non-finite and negative values are rejected
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized: Cow<str> = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        if looks_like_thousands(trimmed) {
            return None;
        }
        Cow::Owned(trimmed.replace(',', "."))
    } else {
        Cow::Borrowed(trimmed)
    };

    let value: f64 = normalized.parse().ok()?;
    usable(Some(value))
}

/// `1,250` or `12,000`: three digits after the comma and a non-zero whole part
fn looks_like_thousands(s: &str) -> bool {
    let Some((whole, frac)) = s.split_once(',') else {
        return false;
    };
    let whole = whole.trim_start_matches('+');
    frac.len() == 3
        && frac.bytes().all(|b| b.is_ascii_digit())
        && !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && !whole.trim_start_matches('0').is_empty()
}

/// Parse a piece count: a whole, non-negative number that fits in u32
pub fn parse_pieces(input: &str) -> Option<u32> {
    parse_number(input).and_then(pieces_from_f64)
}

fn pieces_from_f64(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// A numeric field that may arrive as a JSON number or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericInput::Number(n) => usable(Some(*n)),
            NumericInput::Text(s) => parse_number(s),
        }
    }

    pub fn pieces(&self) -> Option<u32> {
        match self {
            NumericInput::Number(n) => usable(Some(*n)).and_then(pieces_from_f64),
            NumericInput::Text(s) => parse_pieces(s),
        }
    }

    /// Blank text counts as not entered
    fn is_blank(&self) -> bool {
        matches!(self, NumericInput::Text(s) if s.trim().is_empty())
    }
}

/// A supplied number must parse. Absent or blank input stays absent.
pub fn checked_number(name: &str, input: Option<&NumericInput>) -> Result<Option<f64>, String> {
    match input {
        None => Ok(None),
        Some(v) if v.is_blank() => Ok(None),
        Some(v) => v
            .value()
            .map(Some)
            .ok_or_else(|| format!("{} must be a non-negative number", name)),
    }
}

/// A supplied piece count must be a whole non-negative number
pub fn checked_pieces(input: Option<&NumericInput>) -> Result<Option<u32>, String> {
    match input {
        None => Ok(None),
        Some(v) if v.is_blank() => Ok(None),
        Some(v) => v
            .pieces()
            .map(Some)
            .ok_or_else(|| "pieces must be a whole non-negative number".to_string()),
    }
}

/// A supplied dimension unit must be one of ft, in, cm or m
pub fn checked_dim_unit(input: Option<&str>) -> Result<Option<DimensionUnit>, String> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DimensionUnit::from_str(s)
            .map(Some)
            .ok_or_else(|| format!("Unknown dimension unit '{}': use ft, in, cm or m", s)),
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Quantity fields as entered on a stock form
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QuantityForm {
    /// Stock unit code, e.g. "CFT", "RFT", "NOS", "KG"
    pub unit: String,
    /// Length of one piece
    #[serde(default)]
    pub length: Option<NumericInput>,
    /// Breadth of one piece
    #[serde(default)]
    pub breadth: Option<NumericInput>,
    /// Height of one piece (optional, treated as 1 when absent)
    #[serde(default)]
    pub height: Option<NumericInput>,
    /// Unit of length/breadth/height: ft, in, cm or m (default ft)
    #[serde(default)]
    pub dim_unit: Option<String>,
    /// Number of pieces
    #[serde(default)]
    pub pieces: Option<NumericInput>,
    /// Weight of one piece, for weight units
    #[serde(default)]
    pub weight_per_piece: Option<NumericInput>,
    /// Quantity entered directly
    #[serde(default)]
    pub quantity: Option<NumericInput>,
}

impl QuantityForm {
    /// Dimensions as entered. None when no side was given or the dimension
    /// unit is not recognised.
    pub fn dimensions(&self) -> Option<DimensionInput> {
        let length = self.length.as_ref().and_then(NumericInput::value);
        let breadth = self.breadth.as_ref().and_then(NumericInput::value);
        let height = self.height.as_ref().and_then(NumericInput::value);
        if length.is_none() && breadth.is_none() && height.is_none() {
            return None;
        }

        let unit = match self.dim_unit.as_deref() {
            None => DimensionUnit::default(),
            Some(s) if s.trim().is_empty() => DimensionUnit::default(),
            Some(s) => DimensionUnit::from_str(s)?,
        };

        Some(DimensionInput {
            length,
            breadth,
            height,
            unit,
        })
    }

    /// Lenient: anything that does not parse is dropped. Fine for previews,
    /// not for values that get stored.
    pub fn to_spec(&self) -> ItemQuantitySpec {
        ItemQuantitySpec {
            unit: self.unit.trim().to_string(),
            dimensions: self.dimensions(),
            pieces: self.pieces.as_ref().and_then(NumericInput::pieces),
            weight_per_piece: self.weight_per_piece.as_ref().and_then(NumericInput::value),
            raw_quantity: self.quantity.as_ref().and_then(NumericInput::value),
        }
    }

    /// Strict: every field that was filled in must parse
    pub fn to_checked_spec(&self) -> Result<ItemQuantitySpec, String> {
        let unit = checked_dim_unit(self.dim_unit.as_deref())?.unwrap_or_default();
        let length = checked_number("length", self.length.as_ref())?;
        let breadth = checked_number("breadth", self.breadth.as_ref())?;
        let height = checked_number("height", self.height.as_ref())?;
        let dimensions = if length.is_none() && breadth.is_none() && height.is_none() {
            None
        } else {
            Some(DimensionInput {
                length,
                breadth,
                height,
                unit,
            })
        };

        Ok(ItemQuantitySpec {
            unit: self.unit.trim().to_string(),
            dimensions,
            pieces: checked_pieces(self.pieces.as_ref())?,
            weight_per_piece: checked_number("weight_per_piece", self.weight_per_piece.as_ref())?,
            raw_quantity: checked_number("quantity", self.quantity.as_ref())?,
        })
    }
}
