//! Tag, link and style formats with their translators.

use crate::components::BLOCK_TAGS;
use quire_core::{
    DomElement, FormatClass, FormatData, FormatEffect, FormatOutput, FormatTranslator, Formatter,
    FormatterRef, VElement,
};
use std::rc::Rc;

/// Format expressed by wrapping content in one of a few equivalent tags.
///
/// The tag that was read is kept, so `<b>` and `<strong>` both round-trip.
#[derive(Debug, Clone)]
pub struct TagFormatter {
    name: &'static str,
    tags: &'static [&'static str],
}

impl TagFormatter {
    pub const fn new(name: &'static str, tags: &'static [&'static str]) -> Self {
        Self { name, tags }
    }

    pub fn bold() -> Self {
        Self::new("bold", &["strong", "b"])
    }

    pub fn italic() -> Self {
        Self::new("italic", &["em", "i"])
    }

    pub fn underline() -> Self {
        Self::new("underline", &["u"])
    }

    pub fn strike() -> Self {
        Self::new("strike", &["s", "del", "strike"])
    }

    pub fn code() -> Self {
        Self::new("code", &["code"])
    }

    pub fn superscript() -> Self {
        Self::new("superscript", &["sup"])
    }

    pub fn subscript() -> Self {
        Self::new("subscript", &["sub"])
    }

    pub fn tags(&self) -> &[&'static str] {
        self.tags
    }

    fn default_tag(&self) -> &str {
        self.tags.first().copied().unwrap_or("span")
    }
}

impl Formatter for TagFormatter {
    fn name(&self) -> &str {
        self.name
    }

    fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
        a.tag == b.tag
    }

    fn render(&self, _effect: FormatEffect, data: &FormatData) -> FormatOutput {
        let tag = data.tag.as_deref().unwrap_or(self.default_tag());
        FormatOutput::Wrap(VElement::new(tag))
    }
}

#[derive(Debug, Clone)]
pub struct TagFormatTranslator {
    formatter: Rc<TagFormatter>,
}

impl TagFormatTranslator {
    pub fn new(formatter: TagFormatter) -> Self {
        Self {
            formatter: Rc::new(formatter),
        }
    }
}

impl FormatTranslator for TagFormatTranslator {
    fn name(&self) -> &str {
        self.formatter.name
    }

    fn matches(&self, element: &DomElement) -> FormatEffect {
        if self.formatter.tags.contains(&element.tag.as_str()) {
            FormatEffect::Valid
        } else {
            FormatEffect::Invalid
        }
    }

    fn read(&self, element: &DomElement) -> FormatData {
        FormatData::new().with_tag(element.tag.clone())
    }

    fn formatter(&self) -> FormatterRef {
        self.formatter.clone()
    }
}

const LINK_ATTRIBUTES: &[&str] = &["href", "target", "title", "rel"];

/// `<a href>`; two links coalesce only when all their attributes agree
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkFormatter;

impl Formatter for LinkFormatter {
    fn name(&self) -> &str {
        "link"
    }

    fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
        a.attributes == b.attributes
    }

    fn render(&self, _effect: FormatEffect, data: &FormatData) -> FormatOutput {
        let mut anchor = VElement::new("a");
        anchor.attributes = data.attributes.clone();
        FormatOutput::Wrap(anchor)
    }
}

#[derive(Debug, Clone)]
pub struct LinkTranslator {
    formatter: Rc<LinkFormatter>,
}

impl Default for LinkTranslator {
    fn default() -> Self {
        Self {
            formatter: Rc::new(LinkFormatter),
        }
    }
}

impl FormatTranslator for LinkTranslator {
    fn name(&self) -> &str {
        "link"
    }

    fn matches(&self, element: &DomElement) -> FormatEffect {
        if element.tag == "a" && element.has_attr("href") {
            FormatEffect::Valid
        } else {
            FormatEffect::Invalid
        }
    }

    fn read(&self, element: &DomElement) -> FormatData {
        LINK_ATTRIBUTES
            .iter()
            .filter_map(|name| element.attr(name).map(|value| (*name, value)))
            .fold(FormatData::new(), |data, (name, value)| {
                data.with_attr(name, value)
            })
    }

    fn formatter(&self) -> FormatterRef {
        self.formatter.clone()
    }
}

/// One CSS property carried by a `<span>` (inline) or by the block
/// element itself (block)
#[derive(Debug, Clone)]
pub struct StyleFormatter {
    property: &'static str,
    class: FormatClass,
}

impl StyleFormatter {
    pub const fn inline(property: &'static str) -> Self {
        Self {
            property,
            class: FormatClass::Inline,
        }
    }

    pub const fn block(property: &'static str) -> Self {
        Self {
            property,
            class: FormatClass::Block,
        }
    }

    pub fn property(&self) -> &str {
        self.property
    }
}

impl Formatter for StyleFormatter {
    fn name(&self) -> &str {
        self.property
    }

    fn class(&self) -> FormatClass {
        self.class
    }

    fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
        a.styles.get(self.property) == b.styles.get(self.property)
    }

    fn render(&self, _effect: FormatEffect, data: &FormatData) -> FormatOutput {
        match self.class {
            FormatClass::Inline => {
                let mut span = VElement::new("span");
                span.styles = data.styles.clone();
                FormatOutput::Wrap(span)
            }
            FormatClass::Block => FormatOutput::Decorate {
                attributes: Default::default(),
                styles: data.styles.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleTranslator {
    formatter: Rc<StyleFormatter>,
}

impl StyleTranslator {
    pub fn new(formatter: StyleFormatter) -> Self {
        Self {
            formatter: Rc::new(formatter),
        }
    }

    fn applies_to(&self, element: &DomElement) -> bool {
        match self.formatter.class {
            FormatClass::Inline => element.tag == "span",
            FormatClass::Block => {
                element.tag == "li" || BLOCK_TAGS.contains(&element.tag.as_str())
            }
        }
    }
}

impl FormatTranslator for StyleTranslator {
    fn name(&self) -> &str {
        self.formatter.property
    }

    /// `inherit` values are read with the `Inherit` effect
    fn matches(&self, element: &DomElement) -> FormatEffect {
        if !self.applies_to(element) {
            return FormatEffect::Invalid;
        }
        match element.style(self.formatter.property) {
            Some(value) if value == "inherit" => FormatEffect::Inherit,
            Some(_) => FormatEffect::Valid,
            None => FormatEffect::Invalid,
        }
    }

    fn read(&self, element: &DomElement) -> FormatData {
        let property = self.formatter.property;
        match element.style(property) {
            Some(value) => FormatData::new().with_style(property, value),
            None => FormatData::new(),
        }
    }

    fn formatter(&self) -> FormatterRef {
        self.formatter.clone()
    }
}
