use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tags that never have children and never need a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A node of a DOM-like tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomNode {
    /// Element with attributes and children
    Element(DomElement),

    /// Text node (entities already decoded)
    Text { content: String },

    /// Comment node, kept so readers can report it but never interpreted
    Comment { content: String },

    /// `<!DOCTYPE ...>` or any other `<!...>` declaration
    Doctype { content: String },
}

impl DomNode {
    pub fn text(content: impl Into<String>) -> Self {
        DomNode::Text {
            content: content.into(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        DomNode::Comment {
            content: content.into(),
        }
    }

    pub fn as_element(&self) -> Option<&DomElement> {
        match self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DomNode::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, DomNode::Element(_))
    }

    /// True for text nodes made only of whitespace
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, DomNode::Text { content } if content.chars().all(char::is_whitespace))
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            DomNode::Element(element) => element.text_content(),
            DomNode::Text { content } => content.clone(),
            DomNode::Comment { .. } | DomNode::Doctype { .. } => String::new(),
        }
    }
}

impl From<DomElement> for DomNode {
    fn from(element: DomElement) -> Self {
        DomNode::Element(element)
    }
}

/// Element node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DomElement {
    /// Lowercase tag name
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<DomNode>,
}

impl DomElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<DomNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(DomNode::text(content))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Declarations of the `style` attribute, keyed by lowercase property name
    pub fn styles(&self) -> BTreeMap<String, String> {
        self.attr("style").map(parse_style).unwrap_or_default()
    }

    /// Value of a single property of the `style` attribute
    pub fn style(&self, property: &str) -> Option<String> {
        self.styles().remove(property)
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }

    /// Child elements, skipping text, comments and declarations
    pub fn child_elements(&self) -> impl Iterator<Item = &DomElement> {
        self.children.iter().filter_map(DomNode::as_element)
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(DomNode::text_content).collect()
    }
}

/// Split a `style` attribute value into `property -> value` pairs.
///
/// Empty declarations and declarations without a `:` are skipped.
pub fn parse_style(declarations: &str) -> BTreeMap<String, String> {
    declarations
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value.to_string()))
        })
        .collect()
}
