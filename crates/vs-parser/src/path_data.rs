//! Grammar for the `d` attribute.

use chumsky::prelude::*;
use vs_core::{ConvertResult, PathCommandKind, PathSegment};

use crate::grammar::{TokenExtra, arguments, bare_tokens, grammar_error};
use crate::lexer::{PATH_LEXICON, Token, tokenize};

/// Parses path data into segments, one per argument group.
///
/// A moveto with several coordinate pairs yields one move followed by
/// implicit lines of the same case. Input without any command yields an
/// empty list.
pub fn parse_path_data(input: &str) -> ConvertResult<Vec<PathSegment>> {
    let spanned = tokenize(input, &PATH_LEXICON)?;
    if spanned.is_empty() {
        return Ok(Vec::new());
    }

    let tokens = bare_tokens(&spanned);
    path_parser()
        .parse(tokens.as_slice())
        .into_result()
        .map_err(|errors| grammar_error(PATH_LEXICON.attribute, input, &spanned, &errors))
}

fn path_parser<'a>() -> impl Parser<'a, &'a [Token], Vec<PathSegment>, TokenExtra<'a>> {
    use PathCommandKind as K;

    let moveto = command(K::MoveAbs, K::MoveRel)
        .then(arguments(2).repeated().at_least(1).collect::<Vec<_>>())
        .map(|(kind, groups)| {
            groups
                .into_iter()
                .enumerate()
                .map(|(index, coords)| {
                    let kind = if index == 0 { kind } else { kind.implicit_line() };
                    PathSegment::new(kind, coords)
                })
                .collect::<Vec<_>>()
        });

    let drawto = choice((
        drawto(K::LineAbs, K::LineRel, arguments(2)),
        drawto(K::HorizAbs, K::HorizRel, arguments(1)),
        drawto(K::VertAbs, K::VertRel, arguments(1)),
        drawto(K::CubicAbs, K::CubicRel, arguments(6)),
        drawto(K::SmoothCubicAbs, K::SmoothCubicRel, arguments(4)),
        drawto(K::QuadAbs, K::QuadRel, arguments(4)),
        drawto(K::SmoothQuadAbs, K::SmoothQuadRel, arguments(2)),
        drawto(K::ArcAbs, K::ArcRel, arc_arguments()),
    ));

    moveto
        .then(drawto.repeated().collect::<Vec<_>>())
        .map(|(mut segments, tail)| {
            segments.extend(tail.into_iter().flatten());
            segments
        })
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|groups| groups.into_iter().flatten().collect::<Vec<_>>())
}

/// Command letter in either case, mapped to its kind.
fn command<'a>(
    absolute: PathCommandKind,
    relative: PathCommandKind,
) -> impl Parser<'a, &'a [Token], PathCommandKind, TokenExtra<'a>> {
    let (upper, lower) = (absolute.letter(), relative.letter());
    any()
        .filter(move |token: &Token| {
            matches!(token, Token::Literal(letter) if *letter == upper || *letter == lower)
        })
        .map(move |token| {
            if token == Token::Literal(upper) {
                absolute
            } else {
                relative
            }
        })
}

/// Command letter followed by one or more argument groups.
fn drawto<'a, G>(
    absolute: PathCommandKind,
    relative: PathCommandKind,
    group: G,
) -> impl Parser<'a, &'a [Token], Vec<PathSegment>, TokenExtra<'a>>
where
    G: Parser<'a, &'a [Token], Vec<f64>, TokenExtra<'a>>,
{
    command(absolute, relative)
        .then(group.repeated().at_least(1).collect::<Vec<_>>())
        .map(|(kind, groups)| {
            groups
                .into_iter()
                .map(|coords| PathSegment::new(kind, coords))
                .collect::<Vec<_>>()
        })
}

/// `rx ry rotation large-arc sweep x y`, flags restricted to 0 or 1.
fn arc_arguments<'a>() -> impl Parser<'a, &'a [Token], Vec<f64>, TokenExtra<'a>> {
    arguments(7).try_map(|mut coords: Vec<f64>, span| {
        let flags_valid = coords[3..5].iter().all(|flag| *flag == 0.0 || *flag == 1.0);
        if !flags_valid {
            let tuple = coords
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Rich::custom(
                span,
                format!("elliptical arc flags must be 0 or 1 in ({tuple})"),
            ));
        }
        coords[0] = coords[0].abs();
        coords[1] = coords[1].abs();
        Ok(coords)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vs_core::ConvertError;

    use PathCommandKind as K;

    fn seg(kind: PathCommandKind, coords: &[f64]) -> PathSegment {
        PathSegment::new(kind, coords.to_vec())
    }

    #[test]
    fn moveto_repeats_become_lines() {
        assert_eq!(
            parse_path_data("M 0,0 10,10 20,20").expect("parses"),
            vec![
                seg(K::MoveAbs, &[0.0, 0.0]),
                seg(K::LineAbs, &[10.0, 10.0]),
                seg(K::LineAbs, &[20.0, 20.0]),
            ]
        );
        assert_eq!(
            parse_path_data("m 0,0 10,10").expect("parses"),
            vec![seg(K::MoveRel, &[0.0, 0.0]), seg(K::LineRel, &[10.0, 10.0])]
        );
    }

    #[test]
    fn repeated_argument_groups_share_the_command() {
        assert_eq!(
            parse_path_data("M0 0c1 1 2 2 3 3 4 4 5 5 6 6h5-5").expect("parses"),
            vec![
                seg(K::MoveAbs, &[0.0, 0.0]),
                seg(K::CubicRel, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]),
                seg(K::CubicRel, &[4.0, 4.0, 5.0, 5.0, 6.0, 6.0]),
                seg(K::HorizRel, &[5.0]),
                seg(K::HorizRel, &[-5.0]),
            ]
        );
    }

    #[test]
    fn closepath_starts_no_new_group() {
        let segments = parse_path_data("M0 0 L 10 0 Z M 5 5 L 6 6 z").expect("parses");
        let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![K::MoveAbs, K::LineAbs, K::MoveAbs, K::LineAbs]);
    }

    #[test]
    fn every_drawto_command_parses() {
        let segments =
            parse_path_data("M0 0 L1 1 H2 V3 C1 2 3 4 5 6 S1 2 3 4 Q1 2 3 4 T5 6 A5 5 0 1 0 9 9")
                .expect("parses");
        let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                K::MoveAbs,
                K::LineAbs,
                K::HorizAbs,
                K::VertAbs,
                K::CubicAbs,
                K::SmoothCubicAbs,
                K::QuadAbs,
                K::SmoothQuadAbs,
                K::ArcAbs,
            ]
        );
        assert!(segments.iter().all(PathSegment::has_valid_arity));
    }

    #[test]
    fn arc_radii_are_made_positive() {
        let segments = parse_path_data("M0 0 a-5 -6 30 0 1 10 10").expect("parses");
        assert_eq!(segments[1], seg(K::ArcRel, &[5.0, 6.0, 30.0, 0.0, 1.0, 10.0, 10.0]));
    }

    #[test]
    fn arc_flag_outside_zero_one_is_a_grammar_error() {
        let err = parse_path_data("M0 0 A5 5 0 2 0 10 10").expect_err("bad flag");
        assert!(matches!(err, ConvertError::Grammar { .. }), "got {err:?}");
    }

    #[test]
    fn path_must_start_with_moveto() {
        let err = parse_path_data("L 10 10").expect_err("no moveto");
        match err {
            ConvertError::Grammar { attribute, context, .. } => {
                assert_eq!(attribute, "d");
                assert_eq!(context, "L 10 10");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dangling_coordinate_is_rejected_with_context() {
        let input = "M 0 0 L 1 2 3";
        let err = parse_path_data(input).expect_err("odd count");
        match err {
            ConvertError::Grammar { context, .. } => {
                assert!(input.ends_with(&context), "context {context:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_path_is_empty() {
        assert!(parse_path_data("  ").expect("parses").is_empty());
    }

    #[test]
    fn lex_errors_propagate() {
        assert!(matches!(
            parse_path_data("M 0 0 X 1 1"),
            Err(ConvertError::Lex { found: 'X', .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_parser_never_panics(input in "[MmLlHhVvCcSsQqTtAaZz0-9 ,.eE+-]{0,96}") {
            if let Ok(segments) = parse_path_data(&input) {
                prop_assert!(segments.iter().all(PathSegment::has_valid_arity));
            }
        }

        #[test]
        fn prop_polyline_parses_to_one_line_per_pair(
            points in proptest::collection::vec((-1000i32..1000, -1000i32..1000), 1..16)
        ) {
            let mut text = String::from("M 0 0 L");
            for (x, y) in &points {
                text.push_str(&format!(" {x},{y}"));
            }
            let segments = parse_path_data(&text).expect("polyline parses");
            prop_assert_eq!(segments.len(), points.len() + 1);
            prop_assert!(segments[1..].iter().all(|s| s.kind == K::LineAbs));
        }
    }
}
