use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of characters kept after an error position for diagnostics.
pub const CONTEXT_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConvertErrorCode {
    #[default]
    Lex,
    Grammar,
    UnsupportedValue,
    Document,
    Internal,
}

impl ConvertErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lex => "vecsub/error/lex",
            Self::Grammar => "vecsub/error/grammar",
            Self::UnsupportedValue => "vecsub/error/unsupported-value",
            Self::Document => "vecsub/error/document",
            Self::Internal => "vecsub/error/internal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("illegal character {found:?} in `{attribute}` attribute, followed by {context:?}")]
    Lex {
        attribute: String,
        found: char,
        context: String,
    },
    #[error("malformed `{attribute}` attribute: {message} (at {context:?})")]
    Grammar {
        attribute: String,
        message: String,
        context: String,
    },
    #[error("unsupported {what} value {value:?}")]
    UnsupportedValue { what: String, value: String },
    #[error("unreadable document: {message}")]
    Document { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ConvertError {
    #[must_use]
    pub fn lex(attribute: &str, found: char, rest: &str) -> Self {
        Self::Lex {
            attribute: attribute.to_string(),
            found,
            context: leading_chars(rest),
        }
    }

    #[must_use]
    pub fn grammar(attribute: &str, message: impl Into<String>, rest: &str) -> Self {
        Self::Grammar {
            attribute: attribute.to_string(),
            message: message.into(),
            context: leading_chars(rest),
        }
    }

    #[must_use]
    pub fn unsupported(what: &str, value: &str) -> Self {
        Self::UnsupportedValue {
            what: what.to_string(),
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ConvertErrorCode {
        match self {
            Self::Lex { .. } => ConvertErrorCode::Lex,
            Self::Grammar { .. } => ConvertErrorCode::Grammar,
            Self::UnsupportedValue { .. } => ConvertErrorCode::UnsupportedValue,
            Self::Document { .. } => ConvertErrorCode::Document,
            Self::Internal { .. } => ConvertErrorCode::Internal,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

fn leading_chars(rest: &str) -> String {
    rest.chars().take(CONTEXT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_keeps_ten_characters_of_context() {
        let err = ConvertError::lex("d", '#', "0123456789abcdef");
        assert_eq!(err.code(), ConvertErrorCode::Lex);
        match err {
            ConvertError::Lex { context, found, .. } => {
                assert_eq!(found, '#');
                assert_eq!(context, "0123456789");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ConvertError::unsupported("color", "url(#g)").code().as_str(),
            "vecsub/error/unsupported-value"
        );
        assert_eq!(
            ConvertError::internal("boom").code().as_str(),
            "vecsub/error/internal"
        );
    }

    #[test]
    fn messages_name_the_attribute() {
        let err = ConvertError::grammar("transform", "unexpected token", "foo(1)");
        assert!(err.to_string().contains("`transform`"));
        assert!(err.to_string().contains("foo(1)"));
    }
}
