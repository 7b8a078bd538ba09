//! SVG lengths converted to pixels at 90 dpi.

use vs_core::{ConvertError, ConvertResult};

use crate::lexer::parse_number_prefix;

const PIXELS_PER_INCH: f64 = 90.0;

fn unit_factor(unit: &str) -> Option<f64> {
    match unit {
        "" | "px" => Some(1.0),
        "pt" => Some(PIXELS_PER_INCH / 72.0),
        "pc" => Some(PIXELS_PER_INCH / 6.0),
        "in" => Some(PIXELS_PER_INCH),
        "cm" => Some(PIXELS_PER_INCH / 2.54),
        "mm" => Some(PIXELS_PER_INCH / 25.4),
        _ => None,
    }
}

/// Parses a length such as `12`, `1.5pt` or `3mm` into pixels.
pub fn parse_length(raw: &str) -> ConvertResult<f64> {
    let trimmed = raw.trim();
    let (value, len) =
        parse_number_prefix(trimmed).ok_or_else(|| ConvertError::unsupported("length", raw))?;
    let factor = unit_factor(trimmed[len..].trim_start())
        .ok_or_else(|| ConvertError::unsupported("length", raw))?;
    Ok(value * factor)
}
