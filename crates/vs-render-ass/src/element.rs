//! Typed attribute bags, inheritance and per-path resolution.

use serde::Serialize;
use tracing::debug;
use vs_core::{ConvertResult, PathSegment, RenderConfig};
use vs_parser::{RawAttributes, parse_path_data};

use crate::attributes::{
    Alpha, Color, ElementId, Fill, FillOpacity, Opacity, Stroke, StrokeOpacity, StrokeWidth,
    StyleAttribute, Transform,
};
use crate::path::{normalize_path, render_drawing};
use crate::transform::plan_transform;

/// Parsed attributes of one element, merged with everything inherited from
/// its ancestors.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StyleBag {
    pub transform: Option<Transform>,
    pub color: Option<Color>,
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    pub opacity: Option<Opacity>,
    pub fill_opacity: Option<FillOpacity>,
    pub stroke_opacity: Option<StrokeOpacity>,
    pub stroke_width: Option<StrokeWidth>,
    pub d: Option<Vec<PathSegment>>,
    pub id: Option<ElementId>,
}

/// One path ready for an event line.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedElement {
    pub id: String,
    pub transform: String,
    pub drawing: String,
    pub codes: Vec<String>,
}

fn attribute<A: StyleAttribute>(raw: &RawAttributes) -> ConvertResult<Option<A>> {
    raw.get(A::NAME).map(|value| A::parse(value)).transpose()
}

fn inherited<A: StyleAttribute + Clone>(child: Option<&A>, parent: Option<&A>) -> Option<A> {
    match (child, parent) {
        (Some(own), Some(ancestor)) => Some(own.combine(ancestor)),
        (Some(own), None) => Some(own.clone()),
        (None, ancestor) => ancestor.cloned(),
    }
}

impl StyleBag {
    pub fn from_raw(raw: &RawAttributes) -> ConvertResult<Self> {
        Ok(Self {
            transform: attribute(raw)?,
            color: attribute(raw)?,
            fill: attribute(raw)?,
            stroke: attribute(raw)?,
            opacity: attribute(raw)?,
            fill_opacity: attribute(raw)?,
            stroke_opacity: attribute(raw)?,
            stroke_width: attribute(raw)?,
            d: raw.get("d").map(|d| parse_path_data(d)).transpose()?,
            id: attribute(raw)?,
        })
    }

    /// Merges the parent's resolved bag into this one. Path data and ids
    /// belong to the element itself and are never inherited.
    #[must_use]
    pub fn inherit(&self, parent: &Self) -> Self {
        Self {
            transform: inherited(self.transform.as_ref(), parent.transform.as_ref()),
            color: inherited(self.color.as_ref(), parent.color.as_ref()),
            fill: inherited(self.fill.as_ref(), parent.fill.as_ref()),
            stroke: inherited(self.stroke.as_ref(), parent.stroke.as_ref()),
            opacity: inherited(self.opacity.as_ref(), parent.opacity.as_ref()),
            fill_opacity: inherited(self.fill_opacity.as_ref(), parent.fill_opacity.as_ref()),
            stroke_opacity: inherited(self.stroke_opacity.as_ref(), parent.stroke_opacity.as_ref()),
            stroke_width: inherited(self.stroke_width.as_ref(), parent.stroke_width.as_ref()),
            d: self.d.clone(),
            id: self.id.clone(),
        }
    }

    pub fn resolve(&self, config: &RenderConfig) -> ConvertResult<RenderedElement> {
        let plan = plan_transform(self.transform.as_ref().map(|t| &t.0), config)?;
        let segments = self.d.as_deref().unwrap_or_default();
        let terminals = normalize_path(
            segments,
            &plan.path_matrix,
            config.collapse_consecutive_path_segments,
        )?;

        Ok(RenderedElement {
            id: self
                .id
                .as_ref()
                .map(|id| id.render(config))
                .unwrap_or_default(),
            transform: plan.tags(),
            drawing: render_drawing(&terminals),
            codes: self.style_codes(config),
        })
    }

    /// Fill, fill-opacity, stroke, stroke-opacity and stroke-width tags.
    fn style_codes(&self, config: &RenderConfig) -> Vec<String> {
        let mut fill_opacity = self.fill_opacity;
        let mut stroke_opacity = self.stroke_opacity;
        let mut stroke_width = self.stroke_width;

        let fill = match self.fill.or_else(|| self.color.map(|Color(paint)| Fill(paint))) {
            Some(Fill(paint)) if paint.is_none() => {
                fill_opacity = Some(FillOpacity(Alpha::TRANSPARENT));
                None
            }
            other => other,
        };
        let stroke = match self.stroke {
            Some(Stroke(paint)) if paint.is_none() => {
                stroke_width = Some(StrokeWidth::ZERO);
                None
            }
            other => other,
        };

        if let Some(Opacity(alpha)) = self.opacity {
            if fill_opacity.is_none() && stroke_opacity.is_none() {
                debug!(
                    opacity = alpha.value(),
                    "opacity dropped: no fill-opacity or stroke-opacity to fold into"
                );
            }
            fill_opacity = fill_opacity.map(|FillOpacity(own)| FillOpacity(own.multiply(alpha)));
            stroke_opacity =
                stroke_opacity.map(|StrokeOpacity(own)| StrokeOpacity(own.multiply(alpha)));
        }

        [
            fill.map(|v| v.render(config)),
            fill_opacity.map(|v| v.render(config)),
            stroke.map(|v| v.render(config)),
            stroke_opacity.map(|v| v.render(config)),
            stroke_width.map(|v| v.render(config)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
