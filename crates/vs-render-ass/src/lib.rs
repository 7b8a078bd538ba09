#![forbid(unsafe_code)]

//! SVG to ASS drawing conversion.
//!
//! Walks the parsed document, merges inherited styles into every path,
//! decides which transforms survive as override tags and which are baked
//! into the drawing, and writes the result as a subtitle script or as bare
//! event lines.

mod attributes;
mod color;
mod document;
mod element;
mod path;
mod transform;

pub use attributes::{
    Alpha, Color, ElementId, Fill, FillOpacity, Opacity, Paint, Rgb, Stroke, StrokeOpacity,
    StrokeWidth, StyleAttribute, Transform,
};
pub use color::keyword_color;
pub use document::{event_line, play_resolution, render_script};
pub use element::{RenderedElement, StyleBag};
pub use path::{
    AbsoluteSegment, TerminalKind, TerminalSegment, absolute_segments, collapse_segments,
    normalize_path, render_drawing,
};
pub use transform::{TransformPlan, ensure_origin, plan_transform, render_tags};

use tracing::{debug, info, warn};
use vs_core::{ConvertResult, RenderConfig};
use vs_parser::{ElementKind, RawElement, SvgDocument, parse_svg_document};

/// Converts SVG source text into ASS output.
pub fn convert_svg(text: &str, config: &RenderConfig) -> ConvertResult<String> {
    config.validate()?;
    let document = parse_svg_document(text)?;
    let elements = convert_elements(&document, config)?;
    info!(
        paths = elements.len(),
        export = ?config.export,
        "converted document"
    );
    Ok(render_script(&document, &elements, config))
}

/// Resolves every path of `document` in document order.
pub fn convert_elements(
    document: &SvgDocument,
    config: &RenderConfig,
) -> ConvertResult<Vec<RenderedElement>> {
    let mut rendered = Vec::with_capacity(document.path_count());
    walk(&document.children, &StyleBag::default(), config, &mut rendered)?;
    Ok(rendered)
}

fn walk(
    elements: &[RawElement],
    parent: &StyleBag,
    config: &RenderConfig,
    out: &mut Vec<RenderedElement>,
) -> ConvertResult<()> {
    for element in elements {
        let bag = StyleBag::from_raw(&element.attributes)?.inherit(parent);
        match element.kind {
            ElementKind::Group => walk(&element.children, &bag, config, out)?,
            ElementKind::Path => {
                if bag.d.is_none() {
                    warn!(id = ?element.attributes.get("id"), "path without d attribute skipped");
                    continue;
                }
                let resolved = bag.resolve(config)?;
                debug!(id = %resolved.id, transform = %resolved.transform, "resolved path");
                out.push(resolved);
            }
        }
    }
    Ok(())
}

/// Formats a tag parameter: integers plainly, fractions with at most three
/// decimals.
pub(crate) fn fmt_num(value: f64) -> String {
    let fixed = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.3}")
    };
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vs_core::{ConvertError, ExportKind, TransformKind};

    const TRIANGLE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="640" height="480">
  <path id="tri" d="M0,0 L10,0 L10,10"/>
</svg>"#;

    #[test]
    fn fmt_num_trims_fractions() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(-90.0), "-90");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(2.0 / 3.0), "0.667");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(12.10), "12.1");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(1e20), "100000000000000000000");
        assert_eq!(fmt_num(-1e30), "-1000000000000000019884624838656");
    }

    #[test]
    fn huge_translations_are_not_clamped() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0,0 L1,0" transform="translate(1e30,0)"/></svg>"#;
        let out = convert_svg(svg, &RenderConfig::default()).expect("converts");
        assert!(out.contains("\\pos(1000000000000000019884624838656,0)"), "{out}");
    }

    #[test]
    fn overflowing_transforms_are_unsupported() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0,0 L1,0" transform="translate(1e308) translate(1e308)"/></svg>"#;
        let err = convert_svg(svg, &RenderConfig::default()).expect_err("overflows");
        assert_eq!(err.code().as_str(), "vecsub/error/unsupported-value");

        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0,0 L1,0" transform="scale(1e999)"/></svg>"#;
        assert!(matches!(
            convert_svg(svg, &RenderConfig::default()),
            Err(ConvertError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn triangle_converts_end_to_end() {
        let out = convert_svg(TRIANGLE, &RenderConfig::default()).expect("converts");
        assert!(out.contains("PlayResX: 640\nPlayResY: 480\n"));
        assert!(out.contains(
            "Dialogue: 0,0:00:00.00,0:00:02.00,vecsub.default,tri,0000,0000,0000,,\
             {\\p3\\org(0,0)}m 0 0 l 40 0 40 40{\\p0}"
        ));
    }

    #[test]
    fn group_styles_reach_nested_paths() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g transform="translate(5,5)" style="fill:#0000ff">
    <g opacity="0.5" fill-opacity="1">
      <path id="inner" d="M0,0 L1,0"/>
    </g>
  </g>
  <path id="outer" d="M0,0 L1,0"/>
</svg>"#;
        let document = parse_svg_document(svg).expect("parses");
        let elements = convert_elements(&document, &RenderConfig::default()).expect("converts");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].id, "inner");
        assert_eq!(elements[0].transform, "\\pos(5,5)");
        assert_eq!(elements[0].codes, vec!["\\1c&HFF0000&", "\\1a&H7F&"]);
        assert_eq!(elements[1].id, "outer");
        assert_eq!(elements[1].transform, "\\org(0,0)");
        assert!(elements[1].codes.is_empty());
    }

    #[test]
    fn paths_without_data_are_skipped() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path id="empty"/><path d="M1,1"/></svg>"#;
        let document = parse_svg_document(svg).expect("parses");
        let elements = convert_elements(&document, &RenderConfig::default()).expect("converts");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].drawing, "m 4 4");
    }

    #[test]
    fn events_export_has_no_header() {
        let config = RenderConfig {
            export: ExportKind::Events,
            ..RenderConfig::default()
        };
        let out = convert_svg(TRIANGLE, &config).expect("converts");
        assert!(!out.contains("[Script Info]"));
        assert!(out.contains("{\\p3\\an7\\org(0,0)}"));
    }

    #[test]
    fn any_bad_attribute_aborts_the_document() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <path d="M0,0 L1,1"/>
  <path d="M0,0 A1,1 0 2 0 5,5"/>
</svg>"#;
        let err = convert_svg(svg, &RenderConfig::default()).expect_err("bad arc flag");
        assert_eq!(err.code().as_str(), "vecsub/error/grammar");
    }

    #[test]
    fn invalid_config_is_rejected_before_parsing() {
        let config = RenderConfig {
            unnecessary_transformations: [TransformKind::SkewX].into(),
            ..RenderConfig::default()
        };
        assert!(matches!(
            convert_svg("not even xml", &config),
            Err(ConvertError::UnsupportedValue { .. })
        ));
    }
}
