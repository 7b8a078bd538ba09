#![forbid(unsafe_code)]

//! Parsers for the SVG micro-languages used by vecsub: path data, transform
//! lists and lengths, plus the document walker that collects raw
//! attributes for groups and paths.

mod grammar;
mod length;
mod lexer;
mod path_data;
mod svg_document;
mod transform_list;

pub use length::parse_length;
pub use lexer::{
    Lexer, Lexicon, PATH_LEXICON, SpannedToken, TRANSFORM_LEXICON, Token, parse_number_prefix,
    scan_number, tokenize,
};
pub use path_data::parse_path_data;
pub use svg_document::{
    ElementKind, RawAttributes, RawElement, STYLE_ATTRIBUTES, SvgDocument, parse_svg_document,
    unpack_style,
};
pub use transform_list::parse_transform_list;
