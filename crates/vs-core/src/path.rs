//! Parsed path data: command kinds and their coordinate groups.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PathCommandKind {
    MoveAbs,
    MoveRel,
    LineAbs,
    LineRel,
    HorizAbs,
    HorizRel,
    VertAbs,
    VertRel,
    CubicAbs,
    CubicRel,
    SmoothCubicAbs,
    SmoothCubicRel,
    QuadAbs,
    QuadRel,
    SmoothQuadAbs,
    SmoothQuadRel,
    ArcAbs,
    ArcRel,
}

impl PathCommandKind {
    pub const ALL: [Self; 18] = [
        Self::MoveAbs,
        Self::MoveRel,
        Self::LineAbs,
        Self::LineRel,
        Self::HorizAbs,
        Self::HorizRel,
        Self::VertAbs,
        Self::VertRel,
        Self::CubicAbs,
        Self::CubicRel,
        Self::SmoothCubicAbs,
        Self::SmoothCubicRel,
        Self::QuadAbs,
        Self::QuadRel,
        Self::SmoothQuadAbs,
        Self::SmoothQuadRel,
        Self::ArcAbs,
        Self::ArcRel,
    ];

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::MoveAbs => 'M',
            Self::MoveRel => 'm',
            Self::LineAbs => 'L',
            Self::LineRel => 'l',
            Self::HorizAbs => 'H',
            Self::HorizRel => 'h',
            Self::VertAbs => 'V',
            Self::VertRel => 'v',
            Self::CubicAbs => 'C',
            Self::CubicRel => 'c',
            Self::SmoothCubicAbs => 'S',
            Self::SmoothCubicRel => 's',
            Self::QuadAbs => 'Q',
            Self::QuadRel => 'q',
            Self::SmoothQuadAbs => 'T',
            Self::SmoothQuadRel => 't',
            Self::ArcAbs => 'A',
            Self::ArcRel => 'a',
        }
    }

    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.letter() == letter)
    }

    /// Number of coordinates in one argument group.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::HorizAbs | Self::HorizRel | Self::VertAbs | Self::VertRel => 1,
            Self::MoveAbs
            | Self::MoveRel
            | Self::LineAbs
            | Self::LineRel
            | Self::SmoothQuadAbs
            | Self::SmoothQuadRel => 2,
            Self::SmoothCubicAbs | Self::SmoothCubicRel | Self::QuadAbs | Self::QuadRel => 4,
            Self::CubicAbs | Self::CubicRel => 6,
            Self::ArcAbs | Self::ArcRel => 7,
        }
    }

    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(
            self,
            Self::MoveRel
                | Self::LineRel
                | Self::HorizRel
                | Self::VertRel
                | Self::CubicRel
                | Self::SmoothCubicRel
                | Self::QuadRel
                | Self::SmoothQuadRel
                | Self::ArcRel
        )
    }

    /// Absolute counterpart; absolute kinds map to themselves.
    #[must_use]
    pub const fn to_absolute(self) -> Self {
        match self {
            Self::MoveRel => Self::MoveAbs,
            Self::LineRel => Self::LineAbs,
            Self::HorizRel => Self::HorizAbs,
            Self::VertRel => Self::VertAbs,
            Self::CubicRel => Self::CubicAbs,
            Self::SmoothCubicRel => Self::SmoothCubicAbs,
            Self::QuadRel => Self::QuadAbs,
            Self::SmoothQuadRel => Self::SmoothQuadAbs,
            Self::ArcRel => Self::ArcAbs,
            other => other,
        }
    }

    /// Line kind with the same case, used for implicit lineto after a moveto.
    #[must_use]
    pub const fn implicit_line(self) -> Self {
        if self.is_relative() {
            Self::LineRel
        } else {
            Self::LineAbs
        }
    }
}

/// One command with exactly `kind.arity()` coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSegment {
    pub kind: PathCommandKind,
    pub coords: Vec<f64>,
}

impl PathSegment {
    #[must_use]
    pub fn new(kind: PathCommandKind, coords: impl Into<Vec<f64>>) -> Self {
        Self {
            kind,
            coords: coords.into(),
        }
    }

    #[must_use]
    pub fn has_valid_arity(&self) -> bool {
        self.coords.len() == self.kind.arity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_round_trip_for_every_kind() {
        for kind in PathCommandKind::ALL {
            assert_eq!(PathCommandKind::from_letter(kind.letter()), Some(kind));
        }
        assert_eq!(PathCommandKind::from_letter('Z'), None);
    }

    #[test]
    fn relative_kinds_are_lowercase() {
        for kind in PathCommandKind::ALL {
            assert_eq!(kind.is_relative(), kind.letter().is_ascii_lowercase());
            assert!(!kind.to_absolute().is_relative());
        }
    }

    #[test]
    fn arities_match_path_grammar() {
        assert_eq!(PathCommandKind::CubicAbs.arity(), 6);
        assert_eq!(PathCommandKind::ArcRel.arity(), 7);
        assert_eq!(PathCommandKind::VertRel.arity(), 1);
        assert_eq!(PathCommandKind::SmoothCubicAbs.arity(), 4);
    }

    #[test]
    fn implicit_line_keeps_case() {
        assert_eq!(PathCommandKind::MoveAbs.implicit_line(), PathCommandKind::LineAbs);
        assert_eq!(PathCommandKind::MoveRel.implicit_line(), PathCommandKind::LineRel);
    }

    #[test]
    fn arity_check_flags_short_segments() {
        assert!(PathSegment::new(PathCommandKind::LineAbs, [1.0, 2.0]).has_valid_arity());
        assert!(!PathSegment::new(PathCommandKind::CubicAbs, [1.0, 2.0]).has_valid_arity());
    }
}
