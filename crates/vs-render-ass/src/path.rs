//! Path normalization: parsed segments become absolute Move, Line and Cubic
//! commands in drawing units.

use std::fmt::Write;

use serde::Serialize;
use tracing::warn;
use vs_core::{
    AffineMatrix, ConvertError, ConvertResult, PathCommandKind, PathSegment,
    collapse_consecutive_by_key, round_half_even,
};

type Point = (f64, f64);

/// The drawing vocabulary of ASS.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Move,
    Line,
    Cubic,
}

impl TerminalKind {
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Move => 'm',
            Self::Line => 'l',
            Self::Cubic => 'b',
        }
    }
}

/// Absolute segment in document units, before the CTM.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AbsoluteSegment {
    pub kind: TerminalKind,
    pub points: Vec<Point>,
}

impl AbsoluteSegment {
    /// Applies `ctm` and rounds every coordinate half to even.
    #[must_use]
    pub fn transform(&self, ctm: &AffineMatrix) -> TerminalSegment {
        let coords = self
            .points
            .iter()
            .flat_map(|&(x, y)| {
                let (tx, ty) = ctm.apply(x, y);
                [round_half_even(tx), round_half_even(ty)]
            })
            .collect();
        TerminalSegment {
            kind: self.kind,
            coords,
        }
    }
}

/// Segment ready to be written into a drawing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TerminalSegment {
    pub kind: TerminalKind,
    pub coords: Vec<i64>,
}

impl TerminalSegment {
    /// Consecutive lines and curves share one command letter. Only the last
    /// of several consecutive moves has any effect.
    fn merge(&self, next: &Self) -> Self {
        match self.kind {
            TerminalKind::Move => next.clone(),
            TerminalKind::Line | TerminalKind::Cubic => {
                let mut coords = self.coords.clone();
                coords.extend_from_slice(&next.coords);
                Self {
                    kind: self.kind,
                    coords,
                }
            }
        }
    }
}

/// Running context for one `d` attribute.
#[derive(Debug, Clone, Copy, Default)]
struct PathState {
    current_point: Point,
    last_moveto_point: Point,
    last_command_kind: Option<PathCommandKind>,
    /// Second cubic control point, or the quadratic control point.
    last_control_point: Point,
}

impl PathState {
    fn absolute(&mut self, segment: &PathSegment) -> ConvertResult<AbsoluteSegment> {
        if !segment.has_valid_arity() {
            return Err(arity_error(segment));
        }

        let kind = segment.kind.to_absolute();
        let coords = self.resolve_relative(segment);
        let current = self.current_point;

        let (terminal, points, control) = match (kind, coords.as_slice()) {
            (PathCommandKind::MoveAbs, &[x, y]) => (TerminalKind::Move, vec![(x, y)], None),
            (PathCommandKind::LineAbs, &[x, y]) => (TerminalKind::Line, vec![(x, y)], None),
            (PathCommandKind::HorizAbs, &[x]) => (TerminalKind::Line, vec![(x, current.1)], None),
            (PathCommandKind::VertAbs, &[y]) => (TerminalKind::Line, vec![(current.0, y)], None),
            (PathCommandKind::CubicAbs, &[x1, y1, x2, y2, x, y]) => (
                TerminalKind::Cubic,
                vec![(x1, y1), (x2, y2), (x, y)],
                Some((x2, y2)),
            ),
            (PathCommandKind::SmoothCubicAbs, &[x2, y2, x, y]) => {
                let first = self.reflected_control(&[
                    PathCommandKind::CubicAbs,
                    PathCommandKind::SmoothCubicAbs,
                ]);
                (
                    TerminalKind::Cubic,
                    vec![first, (x2, y2), (x, y)],
                    Some((x2, y2)),
                )
            }
            (PathCommandKind::QuadAbs, &[x1, y1, x, y]) => (
                TerminalKind::Cubic,
                elevate(current, (x1, y1), (x, y)),
                Some((x1, y1)),
            ),
            (PathCommandKind::SmoothQuadAbs, &[x, y]) => {
                let control = self.reflected_control(&[
                    PathCommandKind::QuadAbs,
                    PathCommandKind::SmoothQuadAbs,
                ]);
                (
                    TerminalKind::Cubic,
                    elevate(current, control, (x, y)),
                    Some(control),
                )
            }
            (PathCommandKind::ArcAbs, &[.., x, y]) => {
                warn!(x, y, "elliptical arc drawn as a straight line to its endpoint");
                (TerminalKind::Line, vec![(x, y)], None)
            }
            _ => return Err(arity_error(segment)),
        };

        let end = points.last().copied().unwrap_or(current);
        self.current_point = end;
        if terminal == TerminalKind::Move {
            self.last_moveto_point = end;
        }
        self.last_command_kind = Some(kind);
        self.last_control_point = control.unwrap_or(end);

        Ok(AbsoluteSegment {
            kind: terminal,
            points,
        })
    }

    /// Absolute coordinates for `segment`, still in its own argument layout.
    fn resolve_relative(&self, segment: &PathSegment) -> Vec<f64> {
        let mut coords = segment.coords.clone();
        let (cx, cy) = self.current_point;
        match segment.kind {
            PathCommandKind::MoveRel => offset_pairs(&mut coords, self.last_moveto_point),
            PathCommandKind::HorizRel => {
                if let Some(x) = coords.first_mut() {
                    *x += cx;
                }
            }
            PathCommandKind::VertRel => {
                if let Some(y) = coords.first_mut() {
                    *y += cy;
                }
            }
            PathCommandKind::ArcRel => {
                if let [.., x, y] = coords.as_mut_slice() {
                    *x += cx;
                    *y += cy;
                }
            }
            kind if kind.is_relative() => offset_pairs(&mut coords, self.current_point),
            _ => {}
        }
        coords
    }

    /// First control point of a smooth curve: the previous control point
    /// mirrored through the current point when the previous command belongs
    /// to `family`, the current point otherwise.
    fn reflected_control(&self, family: &[PathCommandKind]) -> Point {
        let (cx, cy) = self.current_point;
        match self.last_command_kind {
            Some(kind) if family.contains(&kind) => {
                let (px, py) = self.last_control_point;
                (2.0 * cx - px, 2.0 * cy - py)
            }
            _ => (cx, cy),
        }
    }
}

fn offset_pairs(coords: &mut [f64], (dx, dy): Point) {
    for pair in coords.chunks_exact_mut(2) {
        pair[0] += dx;
        pair[1] += dy;
    }
}

/// Degree elevation of the quadratic `p0, p1, p2` into cubic control points.
fn elevate(p0: Point, p1: Point, p2: Point) -> Vec<Point> {
    const TWO_THIRDS: f64 = 2.0 / 3.0;
    let first = (
        p0.0 + TWO_THIRDS * (p1.0 - p0.0),
        p0.1 + TWO_THIRDS * (p1.1 - p0.1),
    );
    let second = (
        p2.0 + TWO_THIRDS * (p1.0 - p2.0),
        p2.1 + TWO_THIRDS * (p1.1 - p2.1),
    );
    vec![first, second, p2]
}

fn arity_error(segment: &PathSegment) -> ConvertError {
    ConvertError::internal(format!(
        "'{}' segment carries {} coordinates, expected {}",
        segment.kind.letter(),
        segment.coords.len(),
        segment.kind.arity()
    ))
}

/// Resolves every segment of one path to absolute Move/Line/Cubic form.
pub fn absolute_segments(segments: &[PathSegment]) -> ConvertResult<Vec<AbsoluteSegment>> {
    let mut state = PathState::default();
    segments
        .iter()
        .map(|segment| state.absolute(segment))
        .collect()
}

/// Normalizes `segments`, applies `ctm` and optionally merges runs of the
/// same command.
pub fn normalize_path(
    segments: &[PathSegment],
    ctm: &AffineMatrix,
    collapse: bool,
) -> ConvertResult<Vec<TerminalSegment>> {
    let mut terminals: Vec<TerminalSegment> = absolute_segments(segments)?
        .iter()
        .map(|segment| segment.transform(ctm))
        .collect();
    if collapse {
        collapse_segments(&mut terminals);
    }
    Ok(terminals)
}

pub fn collapse_segments(segments: &mut Vec<TerminalSegment>) {
    collapse_consecutive_by_key(
        segments,
        |segment: &TerminalSegment| segment.kind,
        TerminalSegment::merge,
    );
}

/// Space-joined drawing commands, e.g. `m 0 0 l 40 0 40 40`.
#[must_use]
pub fn render_drawing(segments: &[TerminalSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push(segment.kind.letter());
        for coord in &segment.coords {
            let _ = write!(out, " {coord}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vs_parser::parse_path_data;

    const EPS: f64 = 1e-3;

    fn absolute(d: &str) -> Vec<AbsoluteSegment> {
        absolute_segments(&parse_path_data(d).expect("valid path")).expect("normalizes")
    }

    fn points(d: &str) -> Vec<Vec<Point>> {
        absolute(d).into_iter().map(|segment| segment.points).collect()
    }

    fn close(actual: Point, expected: Point) -> bool {
        (actual.0 - expected.0).abs() < EPS && (actual.1 - expected.1).abs() < EPS
    }

    #[test]
    fn triangle_renders_magnified() {
        let segments = parse_path_data("M0,0 L10,0 L10,10").expect("valid path");
        let ctm = AffineMatrix::scale(4.0, 4.0);

        let separate = normalize_path(&segments, &ctm, false).expect("normalizes");
        assert_eq!(render_drawing(&separate), "m 0 0 l 40 0 l 40 40");

        let collapsed = normalize_path(&segments, &ctm, true).expect("normalizes");
        assert_eq!(render_drawing(&collapsed), "m 0 0 l 40 0 40 40");
    }

    #[test]
    fn quadratic_is_elevated_exactly() {
        let segments = absolute("M0,0 Q10,10 20,0");
        assert_eq!(segments[1].kind, TerminalKind::Cubic);
        let cubic = &segments[1].points;
        assert!(close(cubic[0], (6.667, 6.667)));
        assert!(close(cubic[1], (13.333, 6.667)));
        assert!(close(cubic[2], (20.0, 0.0)));
    }

    #[test]
    fn relative_commands_follow_current_point() {
        assert_eq!(
            points("M10,10 l5,5 h5 v-10 c1,1 2,2 3,3"),
            vec![
                vec![(10.0, 10.0)],
                vec![(15.0, 15.0)],
                vec![(20.0, 15.0)],
                vec![(20.0, 5.0)],
                vec![(21.0, 6.0), (22.0, 7.0), (23.0, 8.0)],
            ]
        );
    }

    #[test]
    fn relative_moveto_offsets_last_moveto() {
        assert_eq!(
            points("M10,10 L50,50 m5,5"),
            vec![vec![(10.0, 10.0)], vec![(50.0, 50.0)], vec![(15.0, 15.0)]]
        );
    }

    #[test]
    fn horizontal_and_vertical_fill_missing_axis() {
        assert_eq!(
            points("M3,4 H10 V20"),
            vec![vec![(3.0, 4.0)], vec![(10.0, 4.0)], vec![(10.0, 20.0)]]
        );
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let segments = absolute("M0,0 C0,10 10,10 10,0 S20,-10 20,0");
        assert_eq!(segments[2].points[0], (10.0, -10.0));
    }

    #[test]
    fn smooth_cubic_without_cubic_uses_current_point() {
        let segments = absolute("M0,0 L5,5 S20,-10 20,0");
        assert_eq!(segments[2].points[0], (5.0, 5.0));
    }

    #[test]
    fn smooth_quadratic_reflects_quadratic_control() {
        let segments = absolute("M0,0 Q10,10 20,0 T40,0");
        // Reflected control point is (30,-10).
        let cubic = &segments[2].points;
        assert!(close(cubic[0], (26.667, -6.667)));
        assert!(close(cubic[1], (33.333, -6.667)));
        assert!(close(cubic[2], (40.0, 0.0)));
    }

    #[test]
    fn smooth_quadratic_after_cubic_is_a_straight_curve() {
        let segments = absolute("M0,0 C0,10 10,10 10,0 T40,0");
        let cubic = &segments[2].points;
        assert!(close(cubic[0], (10.0, 0.0)));
        assert!(close(cubic[1], (20.0, 0.0)));
    }

    #[test]
    fn arcs_become_lines_to_their_endpoint() {
        assert_eq!(
            points("M0,0 A5,5 0 0 1 10,0 a5,5 0 1 0 10,10"),
            vec![vec![(0.0, 0.0)], vec![(10.0, 0.0)], vec![(20.0, 10.0)]]
        );
        assert_eq!(absolute("M0,0 A5,5 0 0 1 10,0")[1].kind, TerminalKind::Line);
    }

    #[test]
    fn segments_after_an_arc_start_at_its_endpoint() {
        let segments = parse_path_data("M0,0 A5,5 0 0 1 10,0 l0,10").expect("valid path");
        let out = normalize_path(&segments, &AffineMatrix::scale(1.0, 1.0), false).expect("normalizes");
        assert_eq!(render_drawing(&out), "m 0 0 l 10 0 l 10 10");
    }

    #[test]
    fn coordinates_round_half_to_even() {
        let segments = parse_path_data("M0.125,0.375 L0.625,0.875").expect("valid path");
        let out = normalize_path(&segments, &AffineMatrix::scale(4.0, 4.0), false).expect("normalizes");
        assert_eq!(render_drawing(&out), "m 0 2 l 2 4");
    }

    #[test]
    fn ctm_is_applied_to_every_point() {
        let segments = parse_path_data("M1,0 C1,1 2,2 3,3").expect("valid path");
        let ctm = AffineMatrix::translate(100.0, 0.0).compose(&AffineMatrix::rotate(90.0));
        let out = normalize_path(&segments, &ctm, false).expect("normalizes");
        assert_eq!(render_drawing(&out), "m 100 1 b 99 1 98 2 97 3");
    }

    #[test]
    fn wrong_coordinate_count_is_internal() {
        let broken = [PathSegment::new(PathCommandKind::CubicAbs, [1.0, 2.0])];
        assert!(matches!(
            absolute_segments(&broken),
            Err(ConvertError::Internal { .. })
        ));
    }

    #[test]
    fn collapse_merges_runs_and_keeps_last_move() {
        let mut segments = vec![
            TerminalSegment { kind: TerminalKind::Move, coords: vec![0, 0] },
            TerminalSegment { kind: TerminalKind::Move, coords: vec![5, 5] },
            TerminalSegment { kind: TerminalKind::Cubic, coords: vec![1, 1, 2, 2, 3, 3] },
            TerminalSegment { kind: TerminalKind::Cubic, coords: vec![4, 4, 5, 5, 6, 6] },
            TerminalSegment { kind: TerminalKind::Line, coords: vec![9, 9] },
        ];
        collapse_segments(&mut segments);
        assert_eq!(
            render_drawing(&segments),
            "m 5 5 b 1 1 2 2 3 3 4 4 5 5 6 6 l 9 9"
        );
        let once = segments.clone();
        collapse_segments(&mut segments);
        assert_eq!(segments, once);
    }

    #[test]
    fn empty_path_renders_nothing() {
        assert_eq!(render_drawing(&normalize_path(&[], &AffineMatrix::IDENTITY, true).expect("empty")), "");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_relative_lines_match_absolute(
            start in (-1e3f64..1e3, -1e3f64..1e3),
            deltas in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 1..12),
        ) {
            let mut absolute_path = vec![PathSegment::new(PathCommandKind::MoveAbs, [start.0, start.1])];
            let mut relative_path = absolute_path.clone();
            let mut point = start;
            for (dx, dy) in deltas {
                point = (point.0 + dx, point.1 + dy);
                absolute_path.push(PathSegment::new(PathCommandKind::LineAbs, [point.0, point.1]));
                relative_path.push(PathSegment::new(PathCommandKind::LineRel, [dx, dy]));
            }

            let expected = absolute_segments(&absolute_path).expect("absolute");
            let actual = absolute_segments(&relative_path).expect("relative");
            prop_assert_eq!(expected.len(), actual.len());
            for (lhs, rhs) in expected.iter().zip(&actual) {
                prop_assert_eq!(lhs.kind, rhs.kind);
                prop_assert!(close(lhs.points[0], rhs.points[0]));
            }
        }

        #[test]
        fn prop_collapse_is_idempotent(kinds in prop::collection::vec(0u8..3, 0..24)) {
            let mut segments: Vec<TerminalSegment> = kinds
                .into_iter()
                .enumerate()
                .map(|(index, kind)| {
                    let value = index as i64;
                    match kind {
                        0 => TerminalSegment { kind: TerminalKind::Move, coords: vec![value, value] },
                        1 => TerminalSegment { kind: TerminalKind::Line, coords: vec![value, value] },
                        _ => TerminalSegment { kind: TerminalKind::Cubic, coords: vec![value; 6] },
                    }
                })
                .collect();
            collapse_segments(&mut segments);
            let once = segments.clone();
            collapse_segments(&mut segments);
            prop_assert_eq!(segments, once);
        }
    }
}
