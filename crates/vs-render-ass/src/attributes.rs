//! Typed style attributes and their ASS override tags.

use serde::Serialize;
use vs_core::{
    ConvertError, ConvertResult, RenderConfig, StrokePreservation, TransformList, round_half_even,
};
use vs_parser::{parse_length, parse_number_prefix, parse_transform_list};

use crate::color::keyword_color;
use crate::fmt_num;
use crate::transform::render_tags;

/// One presentation attribute: parsed from its raw SVG value, rendered to
/// override tags, and combined with the value inherited from an ancestor.
pub trait StyleAttribute: Sized {
    /// SVG attribute name.
    const NAME: &'static str;

    fn parse(raw: &str) -> ConvertResult<Self>;

    fn render(&self, config: &RenderConfig) -> String;

    /// New value for an element whose ancestor carries `parent`.
    #[must_use]
    fn combine(&self, parent: &Self) -> Self;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex digits in ASS channel order (blue, green, red).
    #[must_use]
    pub fn to_bgr_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.b, self.g, self.r)
    }
}

/// A paint value; `Paint(None)` is the `none` keyword.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Paint(pub Option<Rgb>);

impl Paint {
    pub fn parse(raw: &str) -> ConvertResult<Self> {
        let value = raw.trim();
        let unsupported = || ConvertError::unsupported("color", raw);

        if value == "none" {
            return Ok(Self(None));
        }
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).map(|rgb| Self(Some(rgb))).ok_or_else(unsupported);
        }
        if let Some(args) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args)
                .map(|rgb| Self(Some(rgb)))
                .ok_or_else(unsupported);
        }
        keyword_color(value)
            .map(|rgb| Self(Some(rgb)))
            .ok_or_else(unsupported)
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0.is_none()
    }

    fn tag(self, channel: u8) -> String {
        self.0
            .map(|rgb| format!("\\{channel}c&H{}&", rgb.to_bgr_hex()))
            .unwrap_or_default()
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        6 => Some(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let short = |index: usize| channel(&hex[index..=index]).map(|v| v * 17);
            Some(Rgb::new(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

/// `r,g,b` as integers or as integer percentages, never mixed.
fn parse_rgb_function(args: &str) -> Option<Rgb> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return None;
    };

    let percent = |part: &str| -> Option<u8> {
        let value: u32 = part.strip_suffix('%')?.parse().ok()?;
        u8::try_from(value.min(100) * 255 / 100).ok()
    };
    let absolute = |part: &str| -> Option<u8> { part.parse().ok() };

    if [r, g, b].iter().all(|part| part.ends_with('%')) {
        Some(Rgb::new(percent(r)?, percent(g)?, percent(b)?))
    } else {
        Some(Rgb::new(absolute(r)?, absolute(g)?, absolute(b)?))
    }
}

/// Opacity in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Alpha(f64);

impl Alpha {
    pub const TRANSPARENT: Self = Self(0.0);

    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn parse(raw: &str) -> ConvertResult<Self> {
        let value = raw.trim();
        let (number, len) = parse_number_prefix(value)
            .ok_or_else(|| ConvertError::unsupported("opacity", raw))?;
        match &value[len..] {
            "" => Ok(Self::new(number)),
            "%" => Ok(Self::new(number / 100.0)),
            _ => Err(ConvertError::unsupported("opacity", raw)),
        }
    }

    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        Self::new(self.0 * other.0)
    }

    /// ASS alpha byte: `00` is opaque, `FF` transparent.
    #[must_use]
    pub fn to_ass_hex(self) -> String {
        format!("{:02X}", 255 - round_half_even(self.0 * 255.0))
    }
}

/// The `color` attribute; only ever used as a fallback fill.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Color(pub Paint);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Fill(pub Paint);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Stroke(pub Paint);

impl StyleAttribute for Color {
    const NAME: &'static str = "color";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Paint::parse(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        self.0.tag(1)
    }

    fn combine(&self, _parent: &Self) -> Self {
        *self
    }
}

impl StyleAttribute for Fill {
    const NAME: &'static str = "fill";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Paint::parse(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        self.0.tag(1)
    }

    fn combine(&self, _parent: &Self) -> Self {
        *self
    }
}

impl StyleAttribute for Stroke {
    const NAME: &'static str = "stroke";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Paint::parse(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        self.0.tag(3)
    }

    fn combine(&self, _parent: &Self) -> Self {
        *self
    }
}

/// Group opacity; folded into fill and stroke opacity before rendering.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Opacity(pub Alpha);

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FillOpacity(pub Alpha);

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct StrokeOpacity(pub Alpha);

impl StyleAttribute for Opacity {
    const NAME: &'static str = "opacity";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Alpha::parse(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        format!("\\alpha&H{}&", self.0.to_ass_hex())
    }

    fn combine(&self, parent: &Self) -> Self {
        Self(self.0.multiply(parent.0))
    }
}

impl StyleAttribute for FillOpacity {
    const NAME: &'static str = "fill-opacity";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Alpha::parse(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        format!("\\1a&H{}&", self.0.to_ass_hex())
    }

    fn combine(&self, parent: &Self) -> Self {
        Self(self.0.multiply(parent.0))
    }
}

impl StyleAttribute for StrokeOpacity {
    const NAME: &'static str = "stroke-opacity";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Alpha::parse(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        format!("\\3a&H{}&", self.0.to_ass_hex())
    }

    fn combine(&self, parent: &Self) -> Self {
        Self(self.0.multiply(parent.0))
    }
}

/// Stroke width in pixels.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct StrokeWidth(f64);

impl StrokeWidth {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn pixels(self) -> f64 {
        self.0
    }
}

impl StyleAttribute for StrokeWidth {
    const NAME: &'static str = "stroke-width";

    fn parse(raw: &str) -> ConvertResult<Self> {
        let pixels = parse_length(raw)?;
        if pixels < 0.0 {
            return Err(ConvertError::unsupported("stroke width", raw));
        }
        Ok(Self(pixels))
    }

    fn render(&self, config: &RenderConfig) -> String {
        // ASS borders lie entirely outside the shape, SVG strokes straddle it.
        let border = match config.stroke_preservation {
            StrokePreservation::Width => self.0,
            StrokePreservation::Area => self.0 / 2.0,
        };
        format!("\\bord{}", fmt_num(border))
    }

    fn combine(&self, _parent: &Self) -> Self {
        *self
    }
}

/// Element id, written to the event's actor field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ElementId(String);

impl StyleAttribute for ElementId {
    const NAME: &'static str = "id";

    fn parse(raw: &str) -> ConvertResult<Self> {
        Ok(Self(raw.to_string()))
    }

    /// Commas separate event fields, so they are replaced.
    fn render(&self, _config: &RenderConfig) -> String {
        self.0.replace(',', "_")
    }

    fn combine(&self, _parent: &Self) -> Self {
        self.clone()
    }
}

/// The `transform` attribute.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transform(pub TransformList);

impl StyleAttribute for Transform {
    const NAME: &'static str = "transform";

    fn parse(raw: &str) -> ConvertResult<Self> {
        parse_transform_list(raw).map(Self)
    }

    fn render(&self, _config: &RenderConfig) -> String {
        render_tags(self.0.ops())
    }

    /// Ancestor transforms apply outside the element's own.
    fn combine(&self, parent: &Self) -> Self {
        Self(parent.0.then(&self.0))
    }
}
