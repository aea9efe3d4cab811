//! Block, line break, image and list components with their translators.

use quire_core::{
    ComponentRef, ComponentView, DomElement, DomNode, Slot, TemplateTranslator, VElement,
    ViewData,
};
use std::collections::BTreeMap;

/// Elements read as a [`BlockView`] branch
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
];

/// Attributes kept on a component; `style` is left to block formats
fn plain_attributes(element: &DomElement) -> BTreeMap<String, String> {
    element
        .attributes
        .iter()
        .filter(|(name, _)| name.as_str() != "style")
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn element_with(tag: &str, attributes: &BTreeMap<String, String>) -> VElement {
    let mut element = VElement::new(tag);
    element.attributes = attributes.clone();
    element
}

/// Paragraphs, headings and other single-slot blocks
#[derive(Debug, Clone)]
pub struct BlockView {
    tag: String,
    attributes: BTreeMap<String, String>,
}

impl BlockView {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl ComponentView for BlockView {
    fn name(&self) -> &str {
        &self.tag
    }

    fn render(&self) -> VElement {
        element_with(&self.tag, &self.attributes)
    }

    fn clone_view(&self) -> Box<dyn ComponentView> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTranslator;

impl TemplateTranslator for BlockTranslator {
    fn name(&self) -> &str {
        "block"
    }

    fn matches(&self, element: &DomElement) -> bool {
        BLOCK_TAGS.contains(&element.tag.as_str())
    }

    fn from_element<'a>(&self, element: &'a DomElement) -> ViewData<'a> {
        let view = BlockView {
            tag: element.tag.clone(),
            attributes: plain_attributes(element),
        };
        ViewData::new(ComponentRef::branch(view)).with_slot(element, 0)
    }
}

/// `<br>`
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakView;

impl ComponentView for BreakView {
    fn name(&self) -> &str {
        "br"
    }

    fn render(&self) -> VElement {
        VElement::new("br")
    }

    fn clone_view(&self) -> Box<dyn ComponentView> {
        Box::new(*self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BreakTranslator;

impl TemplateTranslator for BreakTranslator {
    fn name(&self) -> &str {
        "break"
    }

    fn matches(&self, element: &DomElement) -> bool {
        element.tag == "br"
    }

    fn from_element<'a>(&self, _element: &'a DomElement) -> ViewData<'a> {
        ViewData::new(ComponentRef::leaf(BreakView))
    }
}

/// `<img>` with its attributes
#[derive(Debug, Clone, Default)]
pub struct ImageView {
    attributes: BTreeMap<String, String>,
}

impl ImageView {
    pub fn new(src: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("src".to_string(), src.into());
        Self { attributes }
    }

    pub fn src(&self) -> Option<&str> {
        self.attributes.get("src").map(String::as_str)
    }
}

impl ComponentView for ImageView {
    fn name(&self) -> &str {
        "image"
    }

    fn render(&self) -> VElement {
        element_with("img", &self.attributes)
    }

    fn clone_view(&self) -> Box<dyn ComponentView> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTranslator;

impl TemplateTranslator for ImageTranslator {
    fn name(&self) -> &str {
        "image"
    }

    fn matches(&self, element: &DomElement) -> bool {
        element.tag == "img"
    }

    fn from_element<'a>(&self, element: &'a DomElement) -> ViewData<'a> {
        let view = ImageView {
            attributes: plain_attributes(element),
        };
        ViewData::new(ComponentRef::leaf(view))
    }
}

/// `<ul>` / `<ol>` with one slot per item, roles `item-0`, `item-1`, ...
#[derive(Debug, Clone)]
pub struct ListView {
    tag: String,
    attributes: BTreeMap<String, String>,
}

impl ListView {
    pub fn ordered() -> Self {
        Self {
            tag: "ol".to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn unordered() -> Self {
        Self {
            tag: "ul".to_string(),
            attributes: BTreeMap::new(),
        }
    }

    /// A list component with `items` empty item slots
    pub fn component(self, items: usize) -> ComponentRef {
        ComponentRef::division(self, (0..items).map(item_role))
    }
}

fn item_role(index: usize) -> String {
    format!("item-{index}")
}

impl ComponentView for ListView {
    fn name(&self) -> &str {
        &self.tag
    }

    fn render(&self) -> VElement {
        element_with(&self.tag, &self.attributes)
    }

    fn slot_render(&self, _slot: &Slot) -> VElement {
        VElement::new("li")
    }

    fn clone_view(&self) -> Box<dyn ComponentView> {
        Box::new(self.clone())
    }
}

/// Claims lists whose only content is `<li>` items
#[derive(Debug, Clone, Copy, Default)]
pub struct ListTranslator;

impl TemplateTranslator for ListTranslator {
    fn name(&self) -> &str {
        "list"
    }

    fn matches(&self, element: &DomElement) -> bool {
        matches!(element.tag.as_str(), "ul" | "ol")
            && element.children.iter().all(|child| match child {
                DomNode::Element(item) => item.tag == "li",
                DomNode::Text { .. } => child.is_whitespace_text(),
                DomNode::Comment { .. } | DomNode::Doctype { .. } => true,
            })
    }

    fn from_element<'a>(&self, element: &'a DomElement) -> ViewData<'a> {
        let items: Vec<&'a DomElement> = element.child_elements().collect();
        let view = ListView {
            tag: element.tag.clone(),
            attributes: plain_attributes(element),
        };

        let mut data = ViewData::new(view.component(items.len()));
        for (index, item) in items.into_iter().enumerate() {
            data = data.with_slot(item, index);
        }
        data
    }
}
