//! Measurement conversion
//!
//! The format reuses bare integers with a per-site unit: twentieths of a
//! point for page geometry, English metric units for drawings, half-points
//! for font sizes, eighth-points for borders. Each call site declares its
//! usage; values that already carry a unit suffix pass through untouched.

/// A unit interpretation: multiplier into the output unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthUsage {
    pub factor: f32,
    pub unit: &'static str,
}

impl LengthUsage {
    /// Twentieths of a point (dxa).
    pub const DXA: LengthUsage = LengthUsage {
        factor: 1.0 / 20.0,
        unit: "pt",
    };
    /// English metric units, 914400 per inch.
    pub const EMU: LengthUsage = LengthUsage {
        factor: 1.0 / 12700.0,
        unit: "pt",
    };
    /// Half-points (font sizes).
    pub const FONT_SIZE: LengthUsage = LengthUsage {
        factor: 0.5,
        unit: "pt",
    };
    /// Eighths of a point (border widths).
    pub const BORDER: LengthUsage = LengthUsage {
        factor: 1.0 / 8.0,
        unit: "pt",
    };
    /// Fiftieths of a percent (table measures of type `pct`).
    pub const PERCENT: LengthUsage = LengthUsage {
        factor: 0.02,
        unit: "%",
    };
    /// Whole points.
    pub const POINT: LengthUsage = LengthUsage {
        factor: 1.0,
        unit: "pt",
    };
    /// 96-dpi pixels converted onto the 72-dpi point grid.
    pub const PX: LengthUsage = LengthUsage {
        factor: 72.0 / 96.0,
        unit: "pt",
    };
}

/// Convert a raw attribute value per the declared usage. A value already
/// suffixed `pt`, `px` or `%` passes through unconverted; a non-numeric
/// value yields `None` so the caller can fall back to its default.
pub fn convert(value: &str, usage: LengthUsage) -> Option<String> {
    let value = value.trim();
    if value.ends_with("pt") || value.ends_with("px") || value.ends_with('%') {
        return Some(value.to_string());
    }
    let number: f32 = value.parse().ok()?;
    Some(format!("{:.2}{}", number * usage.factor, usage.unit))
}

/// Convert a raw attribute value into unsuffixed points.
pub fn to_points(value: &str, usage: LengthUsage) -> Option<f32> {
    value.trim().parse::<f32>().ok().map(|n| n * usage.factor)
}

/// Rotation angles arrive in sixty-thousandths of a degree.
pub fn rotation_degrees(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok().map(|n| n / 60_000.0)
}
