use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::transform::TransformKind;

/// How `stroke-width` maps onto the `\bord` tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrokePreservation {
    /// Border equals the stroke width.
    #[default]
    Width,
    /// Border is half the stroke width, keeping the painted area.
    Area,
}

/// What the renderer writes out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// Dialogue lines only, for pasting into an existing script.
    Events,
    /// Complete script with header and styles.
    #[default]
    Script,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Symbolic kinds to bake into the path matrix (subset of scale/translate/rotate).
    pub unnecessary_transformations: BTreeSet<TransformKind>,
    /// Drawing precision level for `\p`; coordinates scale by `2^(level - 1)`.
    pub magnification_level: u32,
    pub stroke_preservation: StrokePreservation,
    pub collapse_consecutive_path_segments: bool,
    pub default_play_res_x: u32,
    pub default_play_res_y: u32,
    pub export: ExportKind,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            unnecessary_transformations: BTreeSet::new(),
            magnification_level: 3,
            stroke_preservation: StrokePreservation::default(),
            collapse_consecutive_path_segments: true,
            default_play_res_x: 1920,
            default_play_res_y: 1088,
            export: ExportKind::default(),
        }
    }
}

impl RenderConfig {
    pub const BAKEABLE: [TransformKind; 3] = [
        TransformKind::Scale,
        TransformKind::Translate,
        TransformKind::Rotate,
    ];

    /// Coordinate multiplier matching `\p<magnification_level>`.
    #[must_use]
    pub fn magnification(&self) -> f64 {
        let exponent = self.magnification_level.saturating_sub(1).min(1023);
        2f64.powi(exponent as i32)
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if self.magnification_level == 0 {
            return Err(ConvertError::unsupported("magnification level", "0"));
        }
        if let Some(kind) = self
            .unnecessary_transformations
            .iter()
            .find(|kind| !Self::BAKEABLE.contains(kind))
        {
            return Err(ConvertError::unsupported(
                "unnecessary transformation",
                kind.as_str(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_options() {
        let config = RenderConfig::default();
        assert_eq!(config.magnification_level, 3);
        assert!((config.magnification() - 4.0).abs() < f64::EPSILON);
        assert!(config.collapse_consecutive_path_segments);
        assert_eq!(config.stroke_preservation, StrokePreservation::Width);
        assert_eq!((config.default_play_res_x, config.default_play_res_y), (1920, 1088));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn magnification_doubles_per_level() {
        let mut config = RenderConfig::default();
        config.magnification_level = 1;
        assert!((config.magnification() - 1.0).abs() < f64::EPSILON);
        config.magnification_level = 6;
        assert!((config.magnification() - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_level_and_always_baked_kinds() {
        let config = RenderConfig {
            magnification_level: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            unnecessary_transformations: BTreeSet::from([TransformKind::SkewX]),
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RenderConfig = serde_json::from_str(
            r#"{"magnification_level": 4, "unnecessary_transformations": ["rotate"], "stroke_preservation": "area"}"#,
        )
        .expect("valid config");
        assert_eq!(config.magnification_level, 4);
        assert!(config.unnecessary_transformations.contains(&TransformKind::Rotate));
        assert_eq!(config.stroke_preservation, StrokePreservation::Area);
        assert_eq!(config.export, ExportKind::Script);
    }
}
