//! # Quire Core
//!
//! Document model of the Quire rich-text editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dom: DomElement tree (input)                │
//! └─────────────────────────────────────────────┘
//!                     ↓  Parser + translators
//! ┌─────────────────────────────────────────────┐
//! │ Fragment: text + components                 │
//! │  - one index space per fragment             │
//! │  - FormatRangeIndex per format kind         │
//! │  - components own slot fragments            │
//! └─────────────────────────────────────────────┘
//!                     ↓  Renderer
//! ┌─────────────────────────────────────────────┐
//! │ VElement tree (output)                      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Components are atomic**: a component is one position wide in its
//!    parent, whatever its slots hold
//! 2. **Formats stay minimal**: ranges of a kind are sorted, disjoint and
//!    coalesced after every operation
//! 3. **Validate, then mutate**: a failing operation changes nothing
//! 4. **Configuration, not registries**: translators are passed to the
//!    parser explicitly
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_core::{render_fragment, Parser, ParserOptions, VElement};
//!
//! let options = ParserOptions::new()
//!     .with_template(BlockTranslator)
//!     .with_format(BoldTranslator);
//!
//! let fragment = Parser::new(options).parse(&root);
//! let tree = render_fragment(&fragment, VElement::new("body"));
//! ```

pub mod component;
pub mod error;
pub mod format;
pub mod format_index;
pub mod fragment;
pub mod parser;
pub mod renderer;
pub mod snapshot;
pub mod vdom;

#[cfg(test)]
mod tests_properties;

pub use component::{ComponentId, ComponentKind, ComponentRef, ComponentView, Slot, DEFAULT_SLOT_ROLE};
pub use error::{FragmentError, FragmentResult};
pub use format::{
    FormatClass, FormatData, FormatEffect, FormatOutput, FormatRange, Formatter, FormatterRef,
};
pub use format_index::FormatRangeIndex;
pub use fragment::{Content, Fragment, FragmentId};
pub use parser::{
    FormatTranslator, Parser, ParserOptions, SlotMap, TemplateTranslator, ViewData,
};
pub use renderer::{render_component, render_fragment};
pub use snapshot::{ContentSnapshot, FormatSnapshot, FragmentSnapshot, SlotSnapshot};
pub use vdom::{VElement, VNode};

// Re-export the input tree for translator implementations
pub use quire_dom::{DomElement, DomNode};
