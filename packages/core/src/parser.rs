//! DOM to fragment conversion driven by configured translators.

use crate::component::ComponentRef;
use crate::format::{FormatData, FormatEffect, FormatRange, FormatterRef};
use crate::fragment::Fragment;
use quire_dom::{DomElement, DomNode};
use std::fmt;
use std::ptr;
use std::rc::Rc;
use tracing::{debug, instrument, trace, warn};

/// Maps a DOM element onto a component
pub trait TemplateTranslator: fmt::Debug {
    fn name(&self) -> &str;

    fn matches(&self, element: &DomElement) -> bool;

    /// Build the component and say which DOM subtrees fill which slot
    fn from_element<'a>(&self, element: &'a DomElement) -> ViewData<'a>;
}

/// Maps a DOM element onto a format range over the content it contains
pub trait FormatTranslator: fmt::Debug {
    fn name(&self) -> &str;

    /// `Invalid` means the element does not carry this format
    fn matches(&self, element: &DomElement) -> FormatEffect;

    fn read(&self, element: &DomElement) -> FormatData;

    fn formatter(&self) -> FormatterRef;
}

/// A DOM subtree to read into slot `to` of the produced component.
///
/// When `from` is the matched element itself its children are read as
/// formatted content; any other element is read as a template.
#[derive(Debug, Clone, Copy)]
pub struct SlotMap<'a> {
    pub from: &'a DomElement,
    pub to: usize,
}

/// Output of a template translator
#[derive(Debug, Clone)]
pub struct ViewData<'a> {
    pub component: ComponentRef,
    pub slots: Vec<SlotMap<'a>>,
}

impl<'a> ViewData<'a> {
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, from: &'a DomElement, to: usize) -> Self {
        self.slots.push(SlotMap { from, to });
        self
    }
}

/// Translator configuration.
///
/// Template translators are tried in order and the first match wins, so
/// more specific translators must come first. Every format translator is
/// evaluated independently on every element that no template claims.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    pub template_translators: Vec<Rc<dyn TemplateTranslator>>,
    pub format_translators: Vec<Rc<dyn FormatTranslator>>,
    /// Drop text nodes made only of whitespace
    pub ignore_whitespace_text: bool,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, translator: impl TemplateTranslator + 'static) -> Self {
        self.template_translators.push(Rc::new(translator));
        self
    }

    pub fn with_format(mut self, translator: impl FormatTranslator + 'static) -> Self {
        self.format_translators.push(Rc::new(translator));
        self
    }

    pub fn ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace_text = ignore;
        self
    }
}

struct FormatMatch {
    formatter: FormatterRef,
    effect: FormatEffect,
    data: FormatData,
}

pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Read `root` into a new root fragment.
    ///
    /// Never fails: elements no translator claims still have their children
    /// read, and comments or declarations are skipped.
    #[instrument(skip(self, root), fields(root = %root.tag, templates = self.options.template_translators.len(), formats = self.options.format_translators.len()))]
    pub fn parse(&self, root: &DomElement) -> Fragment {
        let mut fragment = Fragment::new();
        self.read_template(root, &mut fragment);
        debug!(length = fragment.len(), "Parsed fragment");
        fragment
    }

    /// Read a list of sibling nodes into one root fragment
    pub fn parse_nodes(&self, nodes: &[DomNode]) -> Fragment {
        let mut fragment = Fragment::new();
        for node in nodes {
            self.read_node(node, &mut fragment);
        }
        fragment
    }

    fn read_node(&self, node: &DomNode, target: &mut Fragment) {
        match node {
            DomNode::Element(element) => self.read_template(element, target),
            DomNode::Text { content } => {
                if self.options.ignore_whitespace_text && node.is_whitespace_text() {
                    return;
                }
                if let Err(error) = target.append(content.as_str()) {
                    warn!(%error, "Dropped text");
                }
            }
            DomNode::Comment { .. } | DomNode::Doctype { .. } => {
                trace!("Skipping non-content node");
            }
        }
    }

    fn read_template(&self, element: &DomElement, target: &mut Fragment) {
        let Some(translator) = self
            .options
            .template_translators
            .iter()
            .find(|translator| translator.matches(element))
        else {
            self.read_formats(element, target);
            return;
        };

        let view = translator.from_element(element);
        trace!(
            tag = %element.tag,
            translator = translator.name(),
            component = view.component.name(),
            "Matched template"
        );

        if let Err(error) = target.append(view.component.clone()) {
            warn!(%error, tag = %element.tag, "Dropped component");
            return;
        }

        for map in &view.slots {
            let Some(mut slot) = view.component.slot_mut(map.to) else {
                warn!(
                    slot = map.to,
                    component = view.component.name(),
                    "Translator mapped content to a missing slot"
                );
                continue;
            };
            if ptr::eq(map.from, element) {
                self.read_formats(map.from, &mut slot);
            } else {
                self.read_template(map.from, &mut slot);
            }
        }
    }

    fn read_formats(&self, element: &DomElement, target: &mut Fragment) {
        let matches: Vec<FormatMatch> = self
            .options
            .format_translators
            .iter()
            .filter_map(|translator| {
                let effect = translator.matches(element);
                (effect != FormatEffect::Invalid).then(|| FormatMatch {
                    formatter: translator.formatter(),
                    effect,
                    data: translator.read(element),
                })
            })
            .collect();

        let start = target.len();
        for child in &element.children {
            self.read_node(child, target);
        }
        let end = target.len();

        for found in matches {
            trace!(
                format = found.formatter.name(),
                start,
                end,
                "Merging parsed format"
            );
            let range = FormatRange::new(start, end, found.effect, found.data);
            if let Err(error) = target.merge_format(&found.formatter, range) {
                warn!(%error, format = found.formatter.name(), "Dropped parsed format");
            }
        }
    }
}
