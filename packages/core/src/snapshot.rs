//! Serializable, read-only view of a fragment tree.

use crate::component::ComponentKind;
use crate::format::{FormatClass, FormatRange};
use crate::fragment::{Content, Fragment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSnapshot {
    pub id: u64,
    pub length: usize,
    pub contents: Vec<ContentSnapshot>,
    pub formats: Vec<FormatSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentSnapshot {
    Text {
        content: String,
    },
    Component {
        id: u64,
        name: String,
        kind: ComponentKind,
        slots: Vec<SlotSnapshot>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub role: String,
    pub fragment: FragmentSnapshot,
}

/// Ranges of one format kind, block ranges already spanning the fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSnapshot {
    pub kind: String,
    pub class: FormatClass,
    pub ranges: Vec<FormatRange>,
}

impl Fragment {
    pub fn snapshot(&self) -> FragmentSnapshot {
        FragmentSnapshot {
            id: self.id().get(),
            length: self.len(),
            contents: self.contents().iter().map(content_snapshot).collect(),
            formats: self
                .format_indexes()
                .iter()
                .map(|formats| FormatSnapshot {
                    kind: formats.name().to_string(),
                    class: formats.class(),
                    ranges: formats.resolved(self.len()),
                })
                .collect(),
        }
    }
}

fn content_snapshot(content: &Content) -> ContentSnapshot {
    match content {
        Content::Text(text) => ContentSnapshot::Text {
            content: text.clone(),
        },
        Content::Component(component) => ContentSnapshot::Component {
            id: component.id().get(),
            name: component.name().to_string(),
            kind: component.kind(),
            slots: component
                .slots()
                .iter()
                .map(|slot| SlotSnapshot {
                    role: slot.role().to_string(),
                    fragment: slot.fragment().snapshot(),
                })
                .collect(),
        },
    }
}
