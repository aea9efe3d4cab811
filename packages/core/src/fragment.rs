//! The content container: an ordered run of text and components plus the
//! format ranges laid over it.
//!
//! Positions are counted in `char`s for text and as exactly one position
//! per component. Every mutating operation validates its bounds first, so
//! a failing call leaves the fragment untouched.
//!
//! A component sits in at most one fragment. Inserting one that another
//! fragment still holds fails with [`FragmentError::AlreadyAttached`]; move
//! it by deleting or cutting it out first. Dropping a fragment releases the
//! components it holds.

use crate::component::{ComponentRef, OwnerLink};
use crate::error::{FragmentError, FragmentResult};
use crate::format::{FormatClass, FormatRange, FormatterRef};
use crate::format_index::FormatRangeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use std::ops::{Bound, RangeBounds};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_FRAGMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique fragment identity, used for parent back-references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentId(u64);

impl FragmentId {
    fn next() -> Self {
        Self(NEXT_FRAGMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fragment#{}", self.0)
    }
}

/// One unit of fragment content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Component(ComponentRef),
}

impl Content {
    pub fn width(&self) -> usize {
        match self {
            Content::Text(text) => text.chars().count(),
            Content::Component(component) => component.width(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Component(_) => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Content::Component(component) => Some(component),
            Content::Text(_) => None,
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<ComponentRef> for Content {
    fn from(component: ComponentRef) -> Self {
        Content::Component(component)
    }
}

impl From<&ComponentRef> for Content {
    fn from(component: &ComponentRef) -> Self {
        Content::Component(component.clone())
    }
}

#[derive(Debug)]
pub struct Fragment {
    id: FragmentId,
    contents: Vec<Content>,
    len: usize,
    formats: Vec<FormatRangeIndex>,
    owner: OwnerLink,
}

impl Default for Fragment {
    fn default() -> Self {
        Self::new()
    }
}

impl Fragment {
    pub fn new() -> Self {
        Self {
            id: FragmentId::next(),
            contents: Vec::new(),
            len: 0,
            formats: Vec::new(),
            owner: OwnerLink::default(),
        }
    }

    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// Size of the index space: chars of text plus one per component
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Content units in order; adjacent text is always joined
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Components held directly by this fragment
    pub fn components(&self) -> impl Iterator<Item = &ComponentRef> {
        self.contents.iter().filter_map(Content::as_component)
    }

    // ---- content mutation -------------------------------------------------

    pub fn append(&mut self, content: impl Into<Content>) -> FragmentResult<()> {
        let len = self.len;
        self.insert(content, len)
    }

    /// Insert a unit at `index`.
    ///
    /// Format ranges starting at or after `index` move right by the unit's
    /// width, ranges with `start < index <= end` grow by it. Empty text is a
    /// no-op. A component must not be held by any fragment yet.
    pub fn insert(&mut self, content: impl Into<Content>, index: usize) -> FragmentResult<()> {
        let content = content.into();
        if index > self.len {
            return Err(FragmentError::bad_index(index, self.len));
        }
        if let Content::Component(component) = &content {
            self.check_attachable(component, None)?;
        }

        let width = content.width();
        if width == 0 {
            return Ok(());
        }

        let at = self.split_at(index);
        if let Content::Component(component) = &content {
            component.attach(self.id, &self.owner);
        }
        self.contents.insert(at, content);
        self.len += width;
        for formats in &mut self.formats {
            formats.shift_for_insert(index, width);
        }
        self.coalesce_text();

        trace!(fragment = %self.id, index, width, "Inserted content");
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        content: impl Into<Content>,
        anchor: &ComponentRef,
    ) -> FragmentResult<()> {
        let index = self.require_index_of(anchor)?;
        self.insert(content, index)
    }

    pub fn insert_after(
        &mut self,
        content: impl Into<Content>,
        anchor: &ComponentRef,
    ) -> FragmentResult<()> {
        let index = self.require_index_of(anchor)?;
        self.insert(content, index + 1)
    }

    /// Paste another fragment at `index`, bringing its format ranges along.
    ///
    /// Pasted inline ranges override this fragment's ranges of the same
    /// kind over the pasted span; pasted block formats only fill kinds this
    /// fragment does not have yet. Its components must be free or held by
    /// `fragment` itself, so a snapshot [`Clone`] of a live fragment cannot
    /// be pasted while the original still holds them.
    pub fn insert_fragment(&mut self, mut fragment: Fragment, index: usize) -> FragmentResult<()> {
        if index > self.len {
            return Err(FragmentError::bad_index(index, self.len));
        }
        for component in fragment.components() {
            self.check_attachable(component, Some(fragment.id))?;
        }

        let contents = mem::take(&mut fragment.contents);
        let formats = mem::take(&mut fragment.formats);
        let width = fragment.len;

        let at = self.split_at(index);
        for component in contents.iter().filter_map(Content::as_component) {
            component.attach(self.id, &self.owner);
        }
        self.contents.splice(at..at, contents);
        self.len += width;
        for existing in &mut self.formats {
            existing.shift_for_insert(index, width);
        }

        let len = self.len;
        for pasted in formats {
            let formatter = pasted.formatter().clone();
            let target = self.index_for(&formatter);
            for range in pasted.ranges() {
                match formatter.class() {
                    FormatClass::Inline => {
                        target.apply(range.with_bounds(range.start + index, range.end + index))
                    }
                    FormatClass::Block => target.merge(range.with_bounds(0, len)),
                }
            }
        }
        self.formats.retain(|formats| !formats.is_empty());
        self.coalesce_text();

        trace!(fragment = %self.id, index, width, "Inserted fragment");
        Ok(())
    }

    /// Remove `[from, to)`. Format ranges are clipped, emptied ones dropped.
    pub fn delete(&mut self, from: usize, to: usize) -> FragmentResult<()> {
        self.check_range(from, to)?;
        if from == to {
            return Ok(());
        }

        for content in self.take_contents(from, to) {
            if let Content::Component(component) = content {
                if component.parent() == Some(self.id) {
                    component.detach();
                }
            }
        }

        trace!(fragment = %self.id, from, to, "Deleted content");
        Ok(())
    }

    /// Remove `[from, to)` and return it as a new fragment, format ranges
    /// rebased to start at 0.
    pub fn cut(&mut self, from: usize, to: usize) -> FragmentResult<Fragment> {
        self.check_range(from, to)?;

        let mut cut = Fragment::new();
        if from == to {
            return Ok(cut);
        }

        cut.formats = self
            .formats
            .iter()
            .filter_map(|formats| {
                let mut sliced = FormatRangeIndex::new(formats.formatter().clone());
                for range in formats.slice(from, to) {
                    sliced.apply(range);
                }
                (!sliced.is_empty()).then_some(sliced)
            })
            .collect();

        cut.contents = self.take_contents(from, to);
        cut.len = to - from;
        for component in cut.components() {
            component.attach(cut.id, &cut.owner);
        }

        trace!(fragment = %self.id, from, to, "Cut content");
        Ok(cut)
    }

    /// Remove a directly held component
    pub fn remove_component(&mut self, component: &ComponentRef) -> FragmentResult<()> {
        let index = self.require_index_of(component)?;
        self.delete(index, index + 1)
    }

    /// Replace everything in this fragment with `fragment`'s content and
    /// formats, keeping this fragment's identity.
    ///
    /// Components of `fragment` may be free, held by `fragment`, or held by
    /// this fragment, which makes restoring a snapshot [`Clone`] work.
    pub fn replace_with(&mut self, mut fragment: Fragment) -> FragmentResult<()> {
        for component in fragment.components() {
            self.check_cycle(component)?;
            match component.parent() {
                Some(parent) if parent != fragment.id && parent != self.id => {
                    return Err(FragmentError::AlreadyAttached {
                        component: component.id(),
                        parent,
                    });
                }
                _ => {}
            }
        }

        self.clean();
        let contents = mem::take(&mut fragment.contents);
        for component in contents.iter().filter_map(Content::as_component) {
            component.attach(self.id, &self.owner);
        }
        self.contents = contents;
        self.len = fragment.len;
        self.formats = mem::take(&mut fragment.formats);
        Ok(())
    }

    /// Drop all content and formats
    pub fn clean(&mut self) {
        self.release_components();
        self.contents.clear();
        self.formats.clear();
        self.len = 0;
    }

    // ---- content queries --------------------------------------------------

    /// Copy of the units covering `range`, text cut at the bounds.
    ///
    /// `..` returns everything.
    pub fn slice_contents(&self, range: impl RangeBounds<usize>) -> FragmentResult<Vec<Content>> {
        let (from, to) = self.resolve_range(range)?;
        let mut out = Vec::new();
        let mut offset = 0;

        for content in &self.contents {
            let width = content.width();
            let start = from.max(offset);
            let end = to.min(offset + width);
            if start < end {
                match content {
                    Content::Text(text) => out.push(Content::Text(char_slice(
                        text,
                        start - offset,
                        end - offset,
                    ))),
                    Content::Component(component) => {
                        out.push(Content::Component(component.clone()))
                    }
                }
            }
            offset += width;
            if offset >= to {
                break;
            }
        }

        Ok(out)
    }

    /// The unit at `index`: a one-char text run or a component
    pub fn content_at(&self, index: usize) -> FragmentResult<Content> {
        let mut offset = 0;
        for content in &self.contents {
            let width = content.width();
            if index < offset + width {
                return Ok(match content {
                    Content::Text(text) => {
                        Content::Text(char_slice(text, index - offset, index - offset + 1))
                    }
                    Content::Component(component) => Content::Component(component.clone()),
                });
            }
            offset += width;
        }
        Err(FragmentError::OutOfRange {
            index,
            length: self.len,
        })
    }

    /// Position of a directly held component
    pub fn index_of(&self, component: &ComponentRef) -> Option<usize> {
        let mut offset = 0;
        for content in &self.contents {
            if let Content::Component(held) = content {
                if held.ptr_eq(component) {
                    return Some(offset);
                }
            }
            offset += content.width();
        }
        None
    }

    /// Text of this fragment and, in order, of every nested slot
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain_text(&mut out);
        out
    }

    fn write_plain_text(&self, out: &mut String) {
        for content in &self.contents {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Component(component) => {
                    for slot in component.slots().iter() {
                        slot.fragment().write_plain_text(out);
                    }
                }
            }
        }
    }

    // ---- formats ----------------------------------------------------------

    /// Names of the format kinds present, in first-use order
    pub fn format_keys(&self) -> Vec<&str> {
        self.formats.iter().map(FormatRangeIndex::name).collect()
    }

    pub fn format_index(&self, name: &str) -> Option<&FormatRangeIndex> {
        self.formats.iter().find(|formats| formats.name() == name)
    }

    /// Every non-empty format index, in first-use order
    pub fn format_indexes(&self) -> &[FormatRangeIndex] {
        &self.formats
    }

    /// Ranges of one kind sorted by start then end; block ranges span the
    /// whole fragment.
    pub fn format_ranges(&self, name: &str) -> Vec<FormatRange> {
        self.format_index(name)
            .map(|formats| formats.resolved(self.len))
            .unwrap_or_default()
    }

    /// Apply a range of `formatter`'s kind, overriding that kind inside the
    /// range. `Invalid` ranges subtract.
    pub fn apply_format(&mut self, formatter: &FormatterRef, range: FormatRange) -> FragmentResult<()> {
        self.check_range(range.start, range.end)?;
        self.index_for(formatter).apply(range);
        self.formats.retain(|formats| !formats.is_empty());
        Ok(())
    }

    /// Apply a range underneath what this kind already holds: where an
    /// existing range carries different data it is kept.
    pub fn merge_format(&mut self, formatter: &FormatterRef, range: FormatRange) -> FragmentResult<()> {
        self.check_range(range.start, range.end)?;
        self.index_for(formatter).merge(range);
        self.formats.retain(|formats| !formats.is_empty());
        Ok(())
    }

    /// Drop every range of one kind; returns whether the kind was present
    pub fn remove_format(&mut self, name: &str) -> bool {
        let before = self.formats.len();
        self.formats.retain(|formats| formats.name() != name);
        self.formats.len() != before
    }

    // ---- copies and lookup ------------------------------------------------

    /// Copy with a new identity whose components are copied as well
    pub fn deep_clone(&self) -> Fragment {
        let id = FragmentId::next();
        let contents = self
            .contents
            .iter()
            .map(|content| match content {
                Content::Text(text) => Content::Text(text.clone()),
                Content::Component(component) => {
                    let copy = component.deep_clone();
                    copy.attach(id, &OwnerLink::default());
                    Content::Component(copy)
                }
            })
            .collect();

        Fragment {
            id,
            contents,
            len: self.len,
            formats: self.formats.clone(),
            owner: OwnerLink::default(),
        }
    }

    /// Run `f` on this fragment or the nested slot fragment with `id`
    pub fn with_fragment_mut<R>(
        &mut self,
        id: FragmentId,
        f: impl FnOnce(&mut Fragment) -> R,
    ) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        self.visit_mut(id, &mut |fragment: &mut Fragment| {
            if let Some(f) = f.take() {
                out = Some(f(fragment));
            }
        });
        out
    }

    fn visit_mut(&mut self, id: FragmentId, visit: &mut dyn FnMut(&mut Fragment)) -> bool {
        if self.id == id {
            visit(self);
            return true;
        }
        for component in self.contents.iter().filter_map(Content::as_component) {
            for slot in 0..component.slot_count() {
                if let Some(mut fragment) = component.slot_mut(slot) {
                    if fragment.visit_mut(id, visit) {
                        return true;
                    }
                }
            }
        }
        false
    }

    // ---- internals --------------------------------------------------------

    pub(crate) fn owner(&self) -> &OwnerLink {
        &self.owner
    }

    /// Link this fragment to the component owning it as a slot
    pub(crate) fn set_owner(&mut self, owner: OwnerLink) {
        for component in self.components() {
            if component.parent() == Some(self.id) {
                component.attach(self.id, &owner);
            }
        }
        self.owner = owner;
    }

    fn release_components(&self) {
        for component in self.components() {
            if component.parent() == Some(self.id) {
                component.detach();
            }
        }
    }

    fn check_range(&self, from: usize, to: usize) -> FragmentResult<()> {
        if from > to || to > self.len {
            return Err(FragmentError::bad_range(from, to, self.len));
        }
        Ok(())
    }

    fn resolve_range(&self, range: impl RangeBounds<usize>) -> FragmentResult<(usize, usize)> {
        let from = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start
                .checked_add(1)
                .ok_or_else(|| FragmentError::bad_range(start, start, self.len))?,
            Bound::Unbounded => 0,
        };
        let to = match range.end_bound() {
            Bound::Included(&end) => end
                .checked_add(1)
                .ok_or_else(|| FragmentError::bad_range(from, end, self.len))?,
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len,
        };
        self.check_range(from, to)?;
        Ok((from, to))
    }

    fn check_cycle(&self, component: &ComponentRef) -> FragmentResult<()> {
        if component.encloses(&self.owner) {
            return Err(FragmentError::CycleDetected(component.id()));
        }
        Ok(())
    }

    /// `component` may come in if it is free or held by `source`, the
    /// fragment being pasted.
    fn check_attachable(
        &self,
        component: &ComponentRef,
        source: Option<FragmentId>,
    ) -> FragmentResult<()> {
        self.check_cycle(component)?;
        if self.index_of(component).is_some() {
            return Err(FragmentError::AlreadyAttached {
                component: component.id(),
                parent: self.id,
            });
        }
        match component.parent() {
            Some(parent) if Some(parent) != source => Err(FragmentError::AlreadyAttached {
                component: component.id(),
                parent,
            }),
            _ => Ok(()),
        }
    }

    fn require_index_of(&self, component: &ComponentRef) -> FragmentResult<usize> {
        self.index_of(component)
            .ok_or_else(|| FragmentError::ComponentNotFound(component.id()))
    }

    fn index_for(&mut self, formatter: &FormatterRef) -> &mut FormatRangeIndex {
        let pos = match self
            .formats
            .iter()
            .position(|formats| formats.name() == formatter.name())
        {
            Some(pos) => pos,
            None => {
                self.formats.push(FormatRangeIndex::new(formatter.clone()));
                self.formats.len() - 1
            }
        };
        &mut self.formats[pos]
    }

    /// Make `index` fall between two units and return the vector position
    /// of that boundary.
    fn split_at(&mut self, index: usize) -> usize {
        let mut offset = 0;
        for i in 0..self.contents.len() {
            if offset == index {
                return i;
            }
            let width = self.contents[i].width();
            if index < offset + width {
                if let Content::Text(text) = &mut self.contents[i] {
                    let tail = text.split_off(byte_offset(text, index - offset));
                    self.contents.insert(i + 1, Content::Text(tail));
                }
                return i + 1;
            }
            offset += width;
        }
        self.contents.len()
    }

    /// Remove the units in `[from, to)` and update length and formats
    fn take_contents(&mut self, from: usize, to: usize) -> Vec<Content> {
        let start = self.split_at(from);
        let end = self.split_at(to);
        let removed: Vec<Content> = self.contents.drain(start..end).collect();

        self.len -= to - from;
        for formats in &mut self.formats {
            formats.clip_for_delete(from, to);
        }
        self.formats.retain(|formats| !formats.is_empty());
        self.coalesce_text();
        removed
    }

    fn coalesce_text(&mut self) {
        let mut out: Vec<Content> = Vec::with_capacity(self.contents.len());
        for content in self.contents.drain(..) {
            if let Content::Text(text) = &content {
                if text.is_empty() {
                    continue;
                }
                if let Some(Content::Text(last)) = out.last_mut() {
                    last.push_str(text);
                    continue;
                }
            }
            out.push(content);
        }
        self.contents = out;
    }
}

/// Snapshot copy: new identity, same text and formats, shared components.
///
/// Components keep their parent back-reference pointing at the original,
/// so the copy can be handed back through [`Fragment::replace_with`] but not
/// inserted into another fragment while the original holds them.
impl Clone for Fragment {
    fn clone(&self) -> Self {
        Self {
            id: FragmentId::next(),
            contents: self.contents.clone(),
            len: self.len,
            formats: self.formats.clone(),
            owner: OwnerLink::default(),
        }
    }
}

impl Drop for Fragment {
    fn drop(&mut self) {
        self.release_components();
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

/// `text[from..to]` counted in chars
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> String {
    text[byte_offset(text, from)..byte_offset(text, to)].to_string()
}
