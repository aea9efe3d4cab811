//! Format kinds, format ranges and their abstract data.

use crate::vdom::VElement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Whether a format is applied, suppressed, or inherited from context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatEffect {
    Valid,
    Invalid,
    Inherit,
}

/// Inline formats cover any sub-interval of a container; block formats
/// always cover the whole container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatClass {
    Inline,
    Block,
}

/// Opaque payload carried by a format range (tag, attributes, styles).
///
/// Only the owning [`Formatter`] decides whether two payloads are equal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub styles: BTreeMap<String, String>,
}

impl FormatData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }
}

/// Interval `[start, end)` of a container's index space carrying a format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRange {
    pub start: usize,
    pub end: usize,
    pub effect: FormatEffect,
    pub data: FormatData,
}

impl FormatRange {
    pub fn new(start: usize, end: usize, effect: FormatEffect, data: FormatData) -> Self {
        Self {
            start,
            end,
            effect,
            data,
        }
    }

    pub fn valid(start: usize, end: usize, data: FormatData) -> Self {
        Self::new(start, end, FormatEffect::Valid, data)
    }

    pub fn invalid(start: usize, end: usize, data: FormatData) -> Self {
        Self::new(start, end, FormatEffect::Invalid, data)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when the two intervals share a position or touch end to start
    pub fn touches(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Copy with new bounds and the same effect and data
    pub fn with_bounds(&self, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inconsistent format range {start}..{end}");
        Self {
            start,
            end,
            effect: self.effect,
            data: self.data.clone(),
        }
    }

    /// Copy moved by `delta` positions towards the start
    pub(crate) fn rebased(&self, delta: usize) -> Self {
        self.with_bounds(self.start - delta, self.end - delta)
    }
}

/// How a formatter presents one of its ranges
#[derive(Debug, Clone, PartialEq)]
pub enum FormatOutput {
    /// Wrap the covered content in this element
    Wrap(VElement),

    /// Merge attributes and styles into the element hosting the container
    Decorate {
        attributes: BTreeMap<String, String>,
        styles: BTreeMap<String, String>,
    },

    /// Render nothing for this range
    Skip,
}

/// A format kind: identity, class, payload equality and rendering.
///
/// Kinds are keyed by [`name`](Formatter::name) inside a container.
pub trait Formatter: fmt::Debug {
    fn name(&self) -> &str;

    fn class(&self) -> FormatClass {
        FormatClass::Inline
    }

    /// Equality of abstract data used when coalescing ranges
    fn same_data(&self, a: &FormatData, b: &FormatData) -> bool;

    fn render(&self, effect: FormatEffect, data: &FormatData) -> FormatOutput;
}

pub type FormatterRef = Rc<dyn Formatter>;

/// Two ranges can be coalesced when effect and data agree
pub(crate) fn same_format(formatter: &dyn Formatter, a: &FormatRange, b: &FormatRange) -> bool {
    a.effect == b.effect && formatter.same_data(&a.data, &b.data)
}
