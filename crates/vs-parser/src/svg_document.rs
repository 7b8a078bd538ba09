//! Extraction of groups, paths and their raw attributes from an SVG file.

use std::collections::BTreeMap;

use roxmltree::{Node, ParsingOptions};
use serde::Serialize;
use vs_core::{ConvertError, ConvertResult};

/// Presentation attributes understood on both groups and paths.
pub const STYLE_ATTRIBUTES: [&str; 7] = [
    "color",
    "fill",
    "stroke",
    "opacity",
    "fill-opacity",
    "stroke-opacity",
    "stroke-width",
];

/// Subtrees that never paint directly.
const SKIPPED_ELEMENTS: [&str; 9] = [
    "defs", "clipPath", "mask", "symbol", "pattern", "marker", "metadata", "title", "desc",
];

/// Attribute name to raw value, restricted to the element's vocabulary.
pub type RawAttributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ElementKind {
    Group,
    Path,
}

impl ElementKind {
    #[must_use]
    pub fn accepts(self, name: &str) -> bool {
        let own = match self {
            Self::Group => name == "transform",
            Self::Path => matches!(name, "d" | "id" | "transform"),
        };
        own || STYLE_ATTRIBUTES.contains(&name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RawElement {
    pub kind: ElementKind,
    pub attributes: RawAttributes,
    pub children: Vec<RawElement>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SvgDocument {
    pub width: Option<String>,
    pub height: Option<String>,
    pub children: Vec<RawElement>,
}

impl SvgDocument {
    /// Number of path elements anywhere in the tree.
    #[must_use]
    pub fn path_count(&self) -> usize {
        fn count(elements: &[RawElement]) -> usize {
            elements
                .iter()
                .map(|element| match element.kind {
                    ElementKind::Path => 1,
                    ElementKind::Group => count(&element.children),
                })
                .sum()
        }
        count(&self.children)
    }
}

/// Reads an SVG document into a tree of groups and paths.
pub fn parse_svg_document(text: &str) -> ConvertResult<SvgDocument> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)
        .map_err(|err| ConvertError::document(err.to_string()))?;

    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ConvertError::document(format!(
            "root element is <{}>, expected <svg>",
            root.tag_name().name()
        )));
    }

    let mut children = Vec::new();
    collect_children(root, &mut children);

    Ok(SvgDocument {
        width: root.attribute("width").map(str::to_string),
        height: root.attribute("height").map(str::to_string),
        children,
    })
}

fn collect_children(node: Node<'_, '_>, out: &mut Vec<RawElement>) {
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "g" | "svg" => {
                let mut children = Vec::new();
                collect_children(child, &mut children);
                out.push(RawElement {
                    kind: ElementKind::Group,
                    attributes: raw_attributes(child, ElementKind::Group),
                    children,
                });
            }
            "path" => out.push(RawElement {
                kind: ElementKind::Path,
                attributes: raw_attributes(child, ElementKind::Path),
                children: Vec::new(),
            }),
            name if SKIPPED_ELEMENTS.contains(&name) => {}
            _ => collect_children(child, out),
        }
    }
}

fn raw_attributes(node: Node<'_, '_>, kind: ElementKind) -> RawAttributes {
    let mut attributes: RawAttributes = node
        .attributes()
        .filter(|attr| attr.namespace().is_none() && kind.accepts(attr.name()))
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();

    if let Some(style) = node.attribute("style") {
        for (name, value) in unpack_style(style) {
            if STYLE_ATTRIBUTES.contains(&name.as_str()) {
                attributes.insert(name, value);
            }
        }
    }

    attributes.retain(|_, value| value != "inherit");
    attributes
}

/// Splits `key:value;...` declarations, dropping all whitespace.
#[must_use]
pub fn unpack_style(style: &str) -> Vec<(String, String)> {
    let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
