//! # Quire Presets
//!
//! The standard translator set: blocks, line breaks, images and lists as
//! components; bold, italic, underline, strike, code, superscript,
//! subscript, links and a handful of CSS properties as formats.
//!
//! ## Order
//!
//! Template translators are tried in this order, first match wins:
//!
//! | name    | claims                                             |
//! |---------|----------------------------------------------------|
//! | `break` | `<br>`                                             |
//! | `image` | `<img>`                                            |
//! | `list`  | `<ul>`/`<ol>` holding only `<li>` items            |
//! | `block` | `<p>`, `<div>`, `<h1>`..`<h6>`, `<blockquote>`, `<pre>` |
//!
//! Format translators are all evaluated on every element no template
//! claims, so their order only decides which kind wraps outermost when
//! two ranges cover the same span.
//!
//! ```rust
//! use quire_core::{render_fragment, Parser, VElement};
//! use quire_dom::parse_fragment;
//!
//! let root = parse_fragment("<p>Hello <b>world</b></p>", "body").unwrap();
//! let fragment = Parser::new(quire_presets::default_options()).parse(&root);
//! let tree = render_fragment(&fragment, VElement::new("body"));
//! assert_eq!(tree, VElement::from_dom(&root));
//! ```

pub mod components;
pub mod error;
pub mod formats;

pub use components::{
    BlockTranslator, BlockView, BreakTranslator, BreakView, ImageTranslator, ImageView,
    ListTranslator, ListView, BLOCK_TAGS,
};
pub use error::{PresetError, PresetResult};
pub use formats::{
    LinkFormatter, LinkTranslator, StyleFormatter, StyleTranslator, TagFormatTranslator,
    TagFormatter,
};

use quire_core::{FormatTranslator, ParserOptions, TemplateTranslator};
use std::rc::Rc;
use tracing::debug;

/// Inline CSS properties read from `<span style>`
pub const INLINE_STYLE_PROPERTIES: &[&str] =
    &["color", "background-color", "font-size", "font-family"];

/// CSS properties read from block elements' own `style`
pub const BLOCK_STYLE_PROPERTIES: &[&str] = &["text-align", "text-indent", "line-height"];

/// Named, ordered collection of the standard translators
#[derive(Debug, Clone)]
pub struct PresetSet {
    templates: Vec<Rc<dyn TemplateTranslator>>,
    formats: Vec<Rc<dyn FormatTranslator>>,
}

impl Default for PresetSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl PresetSet {
    pub fn standard() -> Self {
        let templates: Vec<Rc<dyn TemplateTranslator>> = vec![
            Rc::new(BreakTranslator),
            Rc::new(ImageTranslator),
            Rc::new(ListTranslator),
            Rc::new(BlockTranslator),
        ];

        let mut formats: Vec<Rc<dyn FormatTranslator>> = [
            TagFormatter::bold(),
            TagFormatter::italic(),
            TagFormatter::underline(),
            TagFormatter::strike(),
            TagFormatter::code(),
            TagFormatter::superscript(),
            TagFormatter::subscript(),
        ]
        .into_iter()
        .map(|formatter| Rc::new(TagFormatTranslator::new(formatter)) as Rc<dyn FormatTranslator>)
        .collect();
        formats.push(Rc::new(LinkTranslator::default()));
        for property in INLINE_STYLE_PROPERTIES {
            formats.push(Rc::new(StyleTranslator::new(StyleFormatter::inline(*property))));
        }
        for property in BLOCK_STYLE_PROPERTIES {
            formats.push(Rc::new(StyleTranslator::new(StyleFormatter::block(*property))));
        }

        Self { templates, formats }
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name()).collect()
    }

    pub fn format_names(&self) -> Vec<&str> {
        self.formats.iter().map(|f| f.name()).collect()
    }

    pub fn template(&self, name: &str) -> Option<Rc<dyn TemplateTranslator>> {
        self.templates.iter().find(|t| t.name() == name).cloned()
    }

    pub fn format(&self, name: &str) -> Option<Rc<dyn FormatTranslator>> {
        self.formats.iter().find(|f| f.name() == name).cloned()
    }

    /// Every translator, in the documented order
    pub fn options(&self) -> ParserOptions {
        ParserOptions {
            template_translators: self.templates.clone(),
            format_translators: self.formats.clone(),
            ignore_whitespace_text: false,
        }
    }

    /// Options holding only the named translators, in the given order
    pub fn options_from_names<T, F>(&self, templates: &[T], formats: &[F]) -> PresetResult<ParserOptions>
    where
        T: AsRef<str>,
        F: AsRef<str>,
    {
        let mut options = ParserOptions::new();

        for name in templates {
            let name = name.as_ref();
            let translator = self.template(name).ok_or_else(|| PresetError::UnknownTemplate {
                name: name.to_string(),
                available: self.template_names().join(", "),
            })?;
            options.template_translators.push(translator);
        }

        for name in formats {
            let name = name.as_ref();
            let translator = self.format(name).ok_or_else(|| PresetError::UnknownFormat {
                name: name.to_string(),
                available: self.format_names().join(", "),
            })?;
            options.format_translators.push(translator);
        }

        debug!(
            templates = options.template_translators.len(),
            formats = options.format_translators.len(),
            "Built parser options from names"
        );
        Ok(options)
    }
}

/// All standard translators in the documented order
pub fn default_options() -> ParserOptions {
    PresetSet::standard().options()
}

/// Standard translators picked by name, see [`PresetSet::options_from_names`]
pub fn options_from_names<T, F>(templates: &[T], formats: &[F]) -> PresetResult<ParserOptions>
where
    T: AsRef<str>,
    F: AsRef<str>,
{
    PresetSet::standard().options_from_names(templates, formats)
}
