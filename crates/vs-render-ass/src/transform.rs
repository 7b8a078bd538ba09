//! Transform policy: which ops stay symbolic as ASS tags and which are
//! baked into the path matrix.

use serde::Serialize;
use vs_core::{
    AffineMatrix, ConvertError, ConvertResult, RenderConfig, TransformKind, TransformList,
    TransformOp,
};

use crate::fmt_num;

/// Tags and path matrix for one element.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransformPlan {
    /// Symbolic ops in emission order. A leading matrix is already part of
    /// `path_matrix` and emits nothing.
    pub ops: Vec<TransformOp>,
    /// CTM handed to the path normalizer, including magnification.
    pub path_matrix: AffineMatrix,
}

impl TransformPlan {
    #[must_use]
    pub fn tags(&self) -> String {
        render_tags(&self.ops)
    }
}

/// Collapses `transform`, applies the origin policy and derives the path
/// matrix. An element without a transform still gets an explicit origin.
///
/// Fails with `UnsupportedValue` when merging overflows a parameter.
pub fn plan_transform(
    transform: Option<&TransformList>,
    config: &RenderConfig,
) -> ConvertResult<TransformPlan> {
    let mut ops = transform.map_or_else(Vec::new, |list| {
        let mut list = list.clone();
        list.collapse_adjacent();
        list.bake(&config.unnecessary_transformations);
        list.into_ops()
    });

    let magnification = config.magnification();
    let magnify = AffineMatrix::scale(magnification, magnification);
    let path_matrix = match ops.first() {
        Some(TransformOp::Matrix(baked)) => magnify.compose(baked),
        _ => magnify,
    };

    if let Some(op) = ops.iter().find(|op| !op.matrix().is_finite()) {
        return Err(ConvertError::unsupported("transform", &format!("{op:?}")));
    }
    if !path_matrix.is_finite() {
        return Err(ConvertError::unsupported(
            "transform",
            &format!("{path_matrix:?}"),
        ));
    }

    ensure_origin(&mut ops);
    Ok(TransformPlan { ops, path_matrix })
}

/// Guarantees exactly one origin designator per shape.
///
/// A rotation supplies its own `\org`, so a no-op translate next to it is
/// dropped. Without a rotation, a no-op translate is replaced by
/// `rotate(0,0,0)`; a real translate is kept as `\pos`; and a list with
/// neither gains `rotate(0,0,0)`.
pub fn ensure_origin(ops: &mut Vec<TransformOp>) {
    let has_rotate = ops.iter().any(|op| op.kind() == TransformKind::Rotate);
    let has_translate = ops.iter().any(|op| op.kind() == TransformKind::Translate);
    let zero_translate = ops.iter().position(TransformOp::is_zero_translate);

    if let Some(index) = zero_translate {
        ops.remove(index);
    }
    if !has_rotate && (zero_translate.is_some() || !has_translate) {
        ops.push(TransformOp::ORIGIN);
    }
}

/// Override tags for symbolic ops; baked kinds render nothing.
#[must_use]
pub fn render_tags(ops: &[TransformOp]) -> String {
    ops.iter().map(render_tag).collect()
}

fn render_tag(op: &TransformOp) -> String {
    match *op {
        TransformOp::Translate { tx, ty } => format!("\\pos({},{})", fmt_num(tx), fmt_num(ty)),
        TransformOp::Rotate { angle, cx, cy } => {
            let origin = format!("\\org({},{})", fmt_num(cx), fmt_num(cy));
            if angle == 0.0 {
                origin
            } else {
                format!("{origin}\\frz{}", fmt_num(-angle))
            }
        }
        TransformOp::Scale { sx, sy } => format!(
            "\\fscx{}\\fscy{}",
            fmt_num(sx * 100.0),
            fmt_num(sy * 100.0)
        ),
        TransformOp::Matrix(_) | TransformOp::SkewX { .. } | TransformOp::SkewY { .. } => {
            String::new()
        }
    }
}
