#![forbid(unsafe_code)]

//! Shared data model for vecsub: path segments, transform lists, affine
//! matrices, render configuration and the error type used by every stage.

mod collapse;
mod config;
mod error;
mod geometry;
mod path;
mod transform;

pub use collapse::{collapse_consecutive_by, collapse_consecutive_by_key};
pub use config::{ExportKind, RenderConfig, StrokePreservation};
pub use error::{CONTEXT_CHARS, ConvertError, ConvertErrorCode, ConvertResult};
pub use geometry::AffineMatrix;
pub use path::{PathCommandKind, PathSegment};
pub use transform::{TransformKind, TransformList, TransformOp, UnknownTransformKind};

/// Rounds half to even, the convention used for every emitted coordinate.
#[must_use]
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_prefers_even_neighbours() {
        assert_eq!(round_half_even(0.5), 0);
        assert_eq!(round_half_even(1.5), 2);
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(-2.5), -2);
        assert_eq!(round_half_even(2.6), 3);
    }
}
