//! Transform lists and the passes that fold them into matrices.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::collapse::collapse_consecutive_by_key;
use crate::geometry::AffineMatrix;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    Matrix,
    Translate,
    Scale,
    Rotate,
    SkewX,
    SkewY,
}

impl TransformKind {
    /// Kinds that never survive as symbolic tags.
    pub const ALWAYS_BAKED: [Self; 3] = [Self::Matrix, Self::SkewX, Self::SkewY];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Translate => "translate",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::SkewX => "skewX",
            Self::SkewY => "skewY",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransformKind(pub String);

impl fmt::Display for UnknownTransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transform function: {}", self.0)
    }
}

impl std::error::Error for UnknownTransformKind {}

impl FromStr for TransformKind {
    type Err = UnknownTransformKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matrix" => Ok(Self::Matrix),
            "translate" => Ok(Self::Translate),
            "scale" => Ok(Self::Scale),
            "rotate" => Ok(Self::Rotate),
            "skewX" => Ok(Self::SkewX),
            "skewY" => Ok(Self::SkewY),
            _ => Err(UnknownTransformKind(s.to_string())),
        }
    }
}

/// One transform function with its defaults filled in. Angles are degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransformOp {
    Matrix(AffineMatrix),
    Translate { tx: f64, ty: f64 },
    Scale { sx: f64, sy: f64 },
    Rotate { angle: f64, cx: f64, cy: f64 },
    SkewX { angle: f64 },
    SkewY { angle: f64 },
}

impl TransformOp {
    /// The synthetic `rotate(0,0,0)` used as an explicit origin.
    pub const ORIGIN: Self = Self::Rotate {
        angle: 0.0,
        cx: 0.0,
        cy: 0.0,
    };

    /// Builds an op from a parsed argument list, applying the optional
    /// argument defaults. Returns `None` for an arity the function rejects.
    #[must_use]
    pub fn from_arguments(kind: TransformKind, args: &[f64]) -> Option<Self> {
        let op = match (kind, args) {
            (TransformKind::Matrix, &[a, b, c, d, e, f]) => {
                Self::Matrix(AffineMatrix::new(a, b, c, d, e, f))
            }
            (TransformKind::Translate, &[tx]) => Self::Translate { tx, ty: 0.0 },
            (TransformKind::Translate, &[tx, ty]) => Self::Translate { tx, ty },
            (TransformKind::Scale, &[s]) => Self::Scale { sx: s, sy: s },
            (TransformKind::Scale, &[sx, sy]) => Self::Scale { sx, sy },
            (TransformKind::Rotate, &[angle]) => Self::Rotate {
                angle,
                cx: 0.0,
                cy: 0.0,
            },
            (TransformKind::Rotate, &[angle, cx, cy]) => Self::Rotate { angle, cx, cy },
            (TransformKind::SkewX, &[angle]) => Self::SkewX { angle },
            (TransformKind::SkewY, &[angle]) => Self::SkewY { angle },
            _ => return None,
        };
        Some(op)
    }

    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        match self {
            Self::Matrix(_) => TransformKind::Matrix,
            Self::Translate { .. } => TransformKind::Translate,
            Self::Scale { .. } => TransformKind::Scale,
            Self::Rotate { .. } => TransformKind::Rotate,
            Self::SkewX { .. } => TransformKind::SkewX,
            Self::SkewY { .. } => TransformKind::SkewY,
        }
    }

    #[must_use]
    pub fn matrix(&self) -> AffineMatrix {
        match *self {
            Self::Matrix(m) => m,
            Self::Translate { tx, ty } => AffineMatrix::translate(tx, ty),
            Self::Scale { sx, sy } => AffineMatrix::scale(sx, sy),
            Self::Rotate { angle, cx, cy } => AffineMatrix::rotate_around(angle, cx, cy),
            Self::SkewX { angle } => AffineMatrix::skew_x(angle),
            Self::SkewY { angle } => AffineMatrix::skew_y(angle),
        }
    }

    #[must_use]
    pub fn is_zero_translate(&self) -> bool {
        matches!(self, Self::Translate { tx, ty } if *tx == 0.0 && *ty == 0.0)
    }

    /// Merges `next` (applied to points before `self`) into a new op.
    ///
    /// Same kinds stay symbolic: matrices multiply, everything else adds
    /// parameters component-wise. Different kinds compose into a matrix.
    #[must_use]
    pub fn merge(&self, next: &Self) -> Self {
        match (*self, *next) {
            (Self::Matrix(outer), Self::Matrix(inner)) => Self::Matrix(outer.compose(&inner)),
            (Self::Translate { tx, ty }, Self::Translate { tx: ntx, ty: nty }) => {
                Self::Translate {
                    tx: tx + ntx,
                    ty: ty + nty,
                }
            }
            (Self::Scale { sx, sy }, Self::Scale { sx: nsx, sy: nsy }) => Self::Scale {
                sx: sx + nsx,
                sy: sy + nsy,
            },
            (
                Self::Rotate { angle, cx, cy },
                Self::Rotate {
                    angle: nangle,
                    cx: ncx,
                    cy: ncy,
                },
            ) => Self::Rotate {
                angle: angle + nangle,
                cx: cx + ncx,
                cy: cy + ncy,
            },
            (Self::SkewX { angle }, Self::SkewX { angle: nangle }) => Self::SkewX {
                angle: angle + nangle,
            },
            (Self::SkewY { angle }, Self::SkewY { angle: nangle }) => Self::SkewY {
                angle: angle + nangle,
            },
            (outer, inner) => Self::Matrix(outer.matrix().compose(&inner.matrix())),
        }
    }
}

/// Non-empty, ordered list of transform ops (leftmost is outermost).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TransformList {
    ops: Vec<TransformOp>,
}

impl TransformList {
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn new(ops: Vec<TransformOp>) -> Option<Self> {
        if ops.is_empty() {
            None
        } else {
            Some(Self { ops })
        }
    }

    #[must_use]
    pub fn single(op: TransformOp) -> Self {
        Self { ops: vec![op] }
    }

    #[must_use]
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<TransformOp> {
        self.ops
    }

    #[must_use]
    pub fn contains(&self, kind: TransformKind) -> bool {
        self.ops.iter().any(|op| op.kind() == kind)
    }

    /// Full CTM of the list: left fold of `acc.compose(op)`.
    #[must_use]
    pub fn matrix(&self) -> AffineMatrix {
        self.ops
            .iter()
            .fold(AffineMatrix::IDENTITY, |acc, op| acc.compose(&op.matrix()))
    }

    /// `self` wrapped around `inner`: ancestor ops come first.
    #[must_use]
    pub fn then(&self, inner: &Self) -> Self {
        let mut ops = Vec::with_capacity(self.ops.len() + inner.ops.len());
        ops.extend_from_slice(&self.ops);
        ops.extend_from_slice(&inner.ops);
        Self { ops }
    }

    /// Merges runs of adjacent same-kind ops.
    pub fn collapse_adjacent(&mut self) {
        collapse_consecutive_by_key(&mut self.ops, TransformOp::kind, TransformOp::merge);
    }

    /// Bakes the prefix that cannot stay symbolic into one matrix.
    ///
    /// The prefix ends at the last op whose kind is in `unnecessary` (or is
    /// always baked), or at the second-to-last occurrence of a repeated
    /// kind, whichever is later. Afterwards every remaining symbolic kind
    /// occurs at most once.
    pub fn bake(&mut self, unnecessary: &BTreeSet<TransformKind>) {
        let is_unnecessary = |kind: TransformKind| {
            unnecessary.contains(&kind) || TransformKind::ALWAYS_BAKED.contains(&kind)
        };

        let last_unnecessary = self
            .ops
            .iter()
            .rposition(|op| is_unnecessary(op.kind()));

        let last_repeat = [
            TransformKind::Translate,
            TransformKind::Scale,
            TransformKind::Rotate,
        ]
        .into_iter()
        .filter(|kind| !is_unnecessary(*kind))
        .filter_map(|kind| {
            let mut positions = self
                .ops
                .iter()
                .enumerate()
                .filter(|(_, op)| op.kind() == kind)
                .map(|(index, _)| index)
                .rev();
            positions.next()?;
            positions.next()
        })
        .max();

        let Some(end) = last_unnecessary.max(last_repeat) else {
            return;
        };

        let baked = self.ops[..=end]
            .iter()
            .fold(AffineMatrix::IDENTITY, |acc, op| acc.compose(&op.matrix()));
        let symbolic = self.ops.split_off(end + 1);
        self.ops = std::iter::once(TransformOp::Matrix(baked))
            .chain(symbolic)
            .collect();
    }
}
