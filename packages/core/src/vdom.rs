use quire_dom::{DomElement, DomNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Presentational element produced by components and formatters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub children: Vec<VNode>,
}

/// Presentational node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// Element node
    Element(VElement),

    /// Text node
    Text { content: String },
}

impl VElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, new_children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(new_children);
        self
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(VNode::text(content))
    }

    /// Append a child, joining it with a trailing text node when both are text
    pub fn push_child(&mut self, child: VNode) {
        if let VNode::Text { content } = &child {
            if content.is_empty() {
                return;
            }
            if let Some(VNode::Text { content: last }) = self.children.last_mut() {
                last.push_str(content);
                return;
            }
        }
        self.children.push(child);
    }

    /// Copy attributes and styles onto this element, overwriting existing keys
    pub fn merge_decorations(
        &mut self,
        attributes: &BTreeMap<String, String>,
        styles: &BTreeMap<String, String>,
    ) {
        self.attributes
            .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.styles
            .extend(styles.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(VNode::text_content).collect()
    }

    /// Convert a DOM element, moving its `style` attribute into `styles`
    pub fn from_dom(element: &DomElement) -> Self {
        let mut attributes = element.attributes.clone();
        attributes.remove("style");

        Self {
            tag: element.tag.clone(),
            attributes,
            styles: element.styles(),
            children: element
                .children
                .iter()
                .filter_map(VNode::from_dom)
                .collect(),
        }
    }

    /// Join adjacent text nodes and drop empty ones, recursively
    pub fn normalized(&self) -> Self {
        let mut out = Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            styles: self.styles.clone(),
            children: Vec::with_capacity(self.children.len()),
        };
        for child in &self.children {
            match child {
                VNode::Element(el) => out.children.push(VNode::Element(el.normalized())),
                text => out.push_child(text.clone()),
            }
        }
        out
    }

    /// Same as [`normalized`](Self::normalized), also dropping whitespace-only text
    pub fn without_whitespace_text(&self) -> Self {
        let mut out = self.normalized();
        out.children.retain(|child| !child.is_whitespace_text());
        for child in &mut out.children {
            if let VNode::Element(el) = child {
                *el = el.without_whitespace_text();
            }
        }
        out
    }
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element(VElement::new(tag))
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(el) => Some(el),
            VNode::Text { .. } => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text { content } => Some(content),
            VNode::Element(_) => None,
        }
    }

    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, VNode::Text { content } if content.chars().all(char::is_whitespace))
    }

    pub fn text_content(&self) -> String {
        match self {
            VNode::Element(el) => el.text_content(),
            VNode::Text { content } => content.clone(),
        }
    }

    /// Convert a DOM node; comments and declarations have no presentational form
    pub fn from_dom(node: &DomNode) -> Option<Self> {
        match node {
            DomNode::Element(el) => Some(VNode::Element(VElement::from_dom(el))),
            DomNode::Text { content } => Some(VNode::text(content.clone())),
            DomNode::Comment { .. } | DomNode::Doctype { .. } => None,
        }
    }
}

impl From<VElement> for VNode {
    fn from(element: VElement) -> Self {
        VNode::Element(element)
    }
}
