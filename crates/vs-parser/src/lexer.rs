//! Lazy tokenizer shared by path data and transform lists.

use std::fmt;

use vs_core::{ConvertError, ConvertResult, TransformKind};

/// Alphabetic runs shorter than this are never identifiers.
const MIN_KEYWORD_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Single-character command or structural literal.
    Literal(char),
    Number(f64),
    /// Transform function name.
    Keyword(TransformKind),
    /// Alphabetic run that names no transform function.
    Identifier,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(c) => write!(f, "'{c}'"),
            Self::Number(n) => write!(f, "number {n}"),
            Self::Keyword(kind) => write!(f, "`{kind}`"),
            Self::Identifier => f.write_str("identifier"),
        }
    }
}

/// Alphabet accepted by one attribute's lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexicon {
    /// Attribute name used in diagnostics.
    pub attribute: &'static str,
    /// Characters emitted as [`Token::Literal`].
    pub literals: &'static str,
    /// Characters skipped like whitespace.
    pub ignored: &'static str,
    /// Whether alphabetic runs lex as identifiers and transform keywords.
    pub keywords: bool,
}

/// Path data: command letters; closepath is skipped.
pub const PATH_LEXICON: Lexicon = Lexicon {
    attribute: "d",
    literals: "MmLlHhVvCcSsQqTtAa",
    ignored: "Zz",
    keywords: false,
};

pub const TRANSFORM_LEXICON: Lexicon = Lexicon {
    attribute: "transform",
    literals: "()",
    ignored: "",
    keywords: true,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    /// Byte offset of the token in the input.
    pub offset: usize,
}

/// Length in bytes of the number at the start of `s`, if any.
///
/// Accepts `[+-]?((digits?.digits | digits.)exponent? | digits exponent)`,
/// falling back to a signed integer.
#[must_use]
pub fn scan_number(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut fractional = false;
    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_from(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
            fractional = true;
        }
    }

    if int_digits == 0 && !fractional {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    Some(end)
}

/// Parses the number at the start of `s`, returning it with its length.
/// Literals that overflow `f64` yield `None`.
#[must_use]
pub fn parse_number_prefix(s: &str) -> Option<(f64, usize)> {
    let len = scan_number(s)?;
    let value = s[..len].parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some((value, len))
}

/// Iterator over the tokens of one attribute value. Stops after the first
/// error.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    lexicon: &'a Lexicon,
    failed: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str, lexicon: &'a Lexicon) -> Self {
        Self {
            input,
            offset: 0,
            lexicon,
            failed: false,
        }
    }

    fn fail(&mut self, found: char, rest: &str) -> ConvertError {
        self.failed = true;
        ConvertError::lex(self.lexicon.attribute, found, &rest[found.len_utf8()..])
    }

    fn identifier(&self, rest: &str) -> Option<(Token, usize)> {
        if !self.lexicon.keywords {
            return None;
        }
        let len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if len < MIN_KEYWORD_LEN {
            return None;
        }
        let token = rest[..len]
            .parse()
            .map_or(Token::Identifier, Token::Keyword);
        Some((token, len))
    }
}

impl Iterator for Lexer<'_> {
    type Item = ConvertResult<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let input = self.input;
        loop {
            let rest = &input[self.offset..];
            let ch = rest.chars().next()?;
            let offset = self.offset;

            if ch.is_ascii_whitespace() || ch == ',' || self.lexicon.ignored.contains(ch) {
                self.offset += ch.len_utf8();
                continue;
            }

            if let Some(len) = scan_number(rest) {
                let Ok(value) = rest[..len].parse::<f64>() else {
                    return Some(Err(self.fail(ch, rest)));
                };
                if !value.is_finite() {
                    self.failed = true;
                    return Some(Err(ConvertError::unsupported("number", &rest[..len])));
                }
                self.offset += len;
                return Some(Ok(SpannedToken {
                    token: Token::Number(value),
                    offset,
                }));
            }

            if self.lexicon.literals.contains(ch) {
                self.offset += ch.len_utf8();
                return Some(Ok(SpannedToken {
                    token: Token::Literal(ch),
                    offset,
                }));
            }

            if let Some((token, len)) = self.identifier(rest) {
                self.offset += len;
                return Some(Ok(SpannedToken {
                    token,
                    offset,
                }));
            }

            return Some(Err(self.fail(ch, rest)));
        }
    }
}

/// Tokenizes `input` completely, failing on the first illegal character.
pub fn tokenize(input: &str, lexicon: &Lexicon) -> ConvertResult<Vec<SpannedToken>> {
    Lexer::new(input, lexicon).collect()
}
