//! ASS script assembly: header, play resolution and event lines.

use std::fmt::Write;

use tracing::warn;
use vs_core::{ExportKind, RenderConfig, round_half_even};
use vs_parser::{SvgDocument, parse_length};

use crate::element::RenderedElement;

/// Frame sides are kept at multiples of this.
const FRAME_MODULUS: u32 = 16;

const SCRIPT_STYLE: &str = "vecsub.default";
const PASTE_STYLE: &str = "Default";

/// `PlayResX`/`PlayResY` for `document`.
#[must_use]
pub fn play_resolution(document: &SvgDocument, config: &RenderConfig) -> (u32, u32) {
    (
        frame_side(document.width.as_deref(), config.default_play_res_x),
        frame_side(document.height.as_deref(), config.default_play_res_y),
    )
}

fn frame_side(raw: Option<&str>, default: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };
    let pixels = match parse_length(raw) {
        Ok(pixels) => round_half_even(pixels),
        Err(err) => {
            warn!(value = raw, error = %err, "document size unusable, using default");
            return default;
        }
    };
    match u32::try_from(pixels) {
        Ok(side) if side > 0 => side.next_multiple_of(FRAME_MODULUS),
        _ => {
            warn!(value = raw, "document size is not positive, using default");
            default
        }
    }
}

fn header(width: u32, height: u32) -> String {
    format!(
        "[Script Info]\n\
         ; Script generated by vecsub\n\
         ScriptType: v4.00+\n\
         Title: ASS drawing converted from SVG\n\
         WrapStyle: 0\n\
         PlayResX: {width}\n\
         PlayResY: {height}\n\
         ScaledBorderAndShadow: yes\n\
         Video File: ?dummy:23.976000:100000:{width}:{height}:255:255:255:\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
         BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
         BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: {SCRIPT_STYLE},Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,\
         0,0,0,0,100,100,0,0,1,0,0,7,0,0,0,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n"
    )
}

/// One `Dialogue` line for `element`.
#[must_use]
pub fn event_line(element: &RenderedElement, config: &RenderConfig) -> String {
    let (style, alignment) = match config.export {
        ExportKind::Script => (SCRIPT_STYLE, ""),
        ExportKind::Events => (PASTE_STYLE, "\\an7"),
    };
    format!(
        "Dialogue: 0,0:00:00.00,0:00:02.00,{style},{actor},0000,0000,0000,,\
         {{\\p{level}{alignment}{transform}{codes}}}{drawing}{{\\p0}}",
        actor = element.id,
        level = config.magnification_level,
        transform = element.transform,
        codes = element.codes.concat(),
        drawing = element.drawing,
    )
}

/// Full output text: a script, or bare events for pasting.
#[must_use]
pub fn render_script(
    document: &SvgDocument,
    elements: &[RenderedElement],
    config: &RenderConfig,
) -> String {
    let mut out = match config.export {
        ExportKind::Script => {
            let (width, height) = play_resolution(document, config);
            header(width, height)
        }
        ExportKind::Events => String::new(),
    };
    for element in elements {
        let _ = writeln!(out, "{}", event_line(element, config));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(width: Option<&str>, height: Option<&str>) -> SvgDocument {
        SvgDocument {
            width: width.map(str::to_string),
            height: height.map(str::to_string),
            children: Vec::new(),
        }
    }

    fn element() -> RenderedElement {
        RenderedElement {
            id: "shape".to_string(),
            transform: "\\org(0,0)".to_string(),
            drawing: "m 0 0 l 40 0 40 40".to_string(),
            codes: vec!["\\1c&H0000FF&".to_string(), "\\bord2".to_string()],
        }
    }

    #[test]
    fn play_resolution_rounds_up_to_mod16() {
        let config = RenderConfig::default();
        assert_eq!(play_resolution(&document(Some("640"), Some("481")), &config), (640, 496));
        assert_eq!(play_resolution(&document(Some("100.4"), Some("1in")), &config), (112, 96));
    }

    #[test]
    fn play_resolution_falls_back_to_defaults() {
        let config = RenderConfig {
            default_play_res_x: 800,
            default_play_res_y: 600,
            ..RenderConfig::default()
        };
        assert_eq!(play_resolution(&document(None, None), &config), (800, 600));
        assert_eq!(play_resolution(&document(Some("100%"), Some("0")), &config), (800, 600));
    }

    #[test]
    fn script_event_uses_script_style() {
        let line = event_line(&element(), &RenderConfig::default());
        assert_eq!(
            line,
            "Dialogue: 0,0:00:00.00,0:00:02.00,vecsub.default,shape,0000,0000,0000,,\
             {\\p3\\org(0,0)\\1c&H0000FF&\\bord2}m 0 0 l 40 0 40 40{\\p0}"
        );
    }

    #[test]
    fn paste_event_uses_default_style_and_top_left_alignment() {
        let config = RenderConfig {
            export: ExportKind::Events,
            ..RenderConfig::default()
        };
        let out = render_script(&document(None, None), &[element()], &config);
        assert!(out.starts_with("Dialogue: 0,0:00:00.00,0:00:02.00,Default,shape,"));
        assert!(out.contains("{\\p3\\an7\\org(0,0)"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn script_has_header_and_one_event_per_element() {
        let out = render_script(
            &document(Some("640"), Some("480")),
            &[element(), element()],
            &RenderConfig::default(),
        );
        assert!(out.starts_with("[Script Info]\n"));
        assert!(out.contains("PlayResX: 640\nPlayResY: 480\n"));
        assert!(out.contains("Style: vecsub.default,Arial,20,"));
        assert!(out.contains("[Events]\nFormat: Layer, Start, End, Style, Name,"));
        assert_eq!(out.matches("Dialogue: ").count(), 2);
        assert!(out.ends_with("{\\p0}\n"));
    }
}
