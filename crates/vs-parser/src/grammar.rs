//! Chumsky plumbing shared by the path and transform grammars.

use chumsky::error::RichReason;
use chumsky::prelude::*;
use vs_core::ConvertError;

use crate::lexer::{SpannedToken, Token};

pub(crate) type TokenExtra<'a> = extra::Err<Rich<'a, Token>>;

pub(crate) fn number<'a>() -> impl Parser<'a, &'a [Token], f64, TokenExtra<'a>> {
    select! { Token::Number(value) => value }
}

/// Exactly `count` numbers.
pub(crate) fn arguments<'a>(count: usize) -> impl Parser<'a, &'a [Token], Vec<f64>, TokenExtra<'a>> {
    number().repeated().exactly(count).collect::<Vec<f64>>()
}

/// Strips spans from lexed tokens for the grammar.
pub(crate) fn bare_tokens(spanned: &[SpannedToken]) -> Vec<Token> {
    spanned.iter().map(|spanned| spanned.token).collect()
}

/// Converts the first chumsky error into a [`ConvertError::Grammar`] whose
/// context starts at the offending token in `source`.
pub(crate) fn grammar_error(
    attribute: &str,
    source: &str,
    spanned: &[SpannedToken],
    errors: &[Rich<'_, Token>],
) -> ConvertError {
    let Some(error) = errors.first() else {
        return ConvertError::grammar(attribute, "rejected without diagnostics", source);
    };

    let offset = spanned
        .get(error.span().start)
        .map_or(source.len(), |token| token.offset);

    let message = match error.reason() {
        RichReason::Custom(message) => message.clone(),
        _ => match error.found() {
            Some(token) => format!("unexpected {token}"),
            None => "unexpected end of input".to_string(),
        },
    };

    ConvertError::grammar(attribute, message, source.get(offset..).unwrap_or_default())
}
