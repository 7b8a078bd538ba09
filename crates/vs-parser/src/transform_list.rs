//! Grammar for the `transform` attribute.

use chumsky::prelude::*;
use vs_core::{ConvertError, ConvertResult, TransformKind, TransformList, TransformOp};

use crate::grammar::{TokenExtra, bare_tokens, grammar_error, number};
use crate::lexer::{TRANSFORM_LEXICON, Token, tokenize};

/// Parses a transform list such as `translate(10) rotate(45, 5, 5)`.
pub fn parse_transform_list(input: &str) -> ConvertResult<TransformList> {
    let spanned = tokenize(input, &TRANSFORM_LEXICON)?;
    let tokens = bare_tokens(&spanned);
    let ops = transform_parser()
        .parse(tokens.as_slice())
        .into_result()
        .map_err(|errors| grammar_error(TRANSFORM_LEXICON.attribute, input, &spanned, &errors))?;

    TransformList::new(ops).ok_or_else(|| {
        ConvertError::internal("transform grammar accepted an empty list")
    })
}

fn transform_parser<'a>() -> impl Parser<'a, &'a [Token], Vec<TransformOp>, TokenExtra<'a>> {
    let keyword = select! { Token::Keyword(kind) => kind };
    let unknown = just(Token::Identifier).try_map(|_, span| {
        Err::<TransformKind, _>(Rich::custom(span, "unknown transform function"))
    });
    let arguments = number()
        .repeated()
        .at_least(1)
        .collect::<Vec<f64>>()
        .delimited_by(just(Token::Literal('(')), just(Token::Literal(')')));

    keyword
        .or(unknown)
        .then(arguments)
        .try_map(|(kind, args): (TransformKind, Vec<f64>), span| {
            TransformOp::from_arguments(kind, &args).ok_or_else(|| {
                Rich::custom(
                    span,
                    format!("{kind}() does not take {} argument(s)", args.len()),
                )
            })
        })
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
}
