//! Per-kind sorted set of format ranges.
//!
//! Inline ranges of one kind are kept disjoint, sorted by start, and
//! minimal: two ranges that touch and carry the same effect and data are
//! always coalesced. Block kinds hold at most one range, which readers
//! re-derive as `[0, length]` of the owning container.

use crate::format::{same_format, FormatClass, FormatEffect, FormatRange, FormatterRef};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct FormatRangeIndex {
    formatter: FormatterRef,
    ranges: Vec<FormatRange>,
}

impl FormatRangeIndex {
    pub fn new(formatter: FormatterRef) -> Self {
        Self {
            formatter,
            ranges: Vec::new(),
        }
    }

    pub fn formatter(&self) -> &FormatterRef {
        &self.formatter
    }

    pub fn name(&self) -> &str {
        self.formatter.name()
    }

    pub fn class(&self) -> FormatClass {
        self.formatter.class()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Stored ranges, sorted by start (ties by end)
    pub fn ranges(&self) -> &[FormatRange] {
        &self.ranges
    }

    /// Ranges as seen by a container of `length` positions.
    ///
    /// Block ranges are re-derived to cover the whole container.
    pub fn resolved(&self, length: usize) -> Vec<FormatRange> {
        match self.class() {
            FormatClass::Inline => self.ranges.clone(),
            FormatClass::Block => self
                .ranges
                .iter()
                .map(|range| range.with_bounds(0, length))
                .collect(),
        }
    }

    /// Ranges sharing at least one position with `[from, to)`, in start order
    pub fn overlapping(&self, from: usize, to: usize) -> impl Iterator<Item = &FormatRange> {
        self.ranges
            .iter()
            .filter(move |range| range.start < to && from < range.end)
    }

    /// Range covering `index`, if any
    pub fn at(&self, index: usize) -> Option<&FormatRange> {
        self.ranges.iter().find(|range| range.contains(index))
    }

    /// Insert `incoming`, overriding whatever this kind had inside its span.
    ///
    /// An `Invalid` range only subtracts: overlapped ranges are split and
    /// nothing new is stored.
    pub fn apply(&mut self, incoming: FormatRange) {
        debug_assert!(incoming.start <= incoming.end, "inconsistent format range");

        if self.class() == FormatClass::Block {
            self.apply_block(incoming);
            return;
        }
        if incoming.is_empty() {
            return;
        }

        let mut next = Vec::with_capacity(self.ranges.len() + 2);
        for existing in self.ranges.drain(..) {
            if existing.end <= incoming.start || existing.start >= incoming.end {
                next.push(existing);
                continue;
            }
            if existing.start < incoming.start {
                next.push(existing.with_bounds(existing.start, incoming.start));
            }
            if existing.end > incoming.end {
                next.push(existing.with_bounds(incoming.end, existing.end));
            }
        }
        if incoming.effect != FormatEffect::Invalid {
            next.push(incoming);
        }

        self.ranges = next;
        self.normalize();
    }

    /// Insert `incoming` underneath what is already stored.
    ///
    /// Equal ranges still coalesce, but where an existing range carries
    /// different data the existing one is kept.
    pub fn merge(&mut self, incoming: FormatRange) {
        if incoming.effect == FormatEffect::Invalid {
            self.apply(incoming);
            return;
        }
        if self.class() == FormatClass::Block {
            if self.ranges.is_empty() {
                self.apply_block(incoming);
            }
            return;
        }
        if incoming.is_empty() {
            return;
        }

        let formatter = self.formatter.clone();
        let mut pieces = vec![(incoming.start, incoming.end)];
        for existing in &self.ranges {
            if same_format(formatter.as_ref(), existing, &incoming) {
                continue;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|(start, end)| subtract((start, end), (existing.start, existing.end)))
                .collect();
        }

        trace!(
            format = %formatter.name(),
            pieces = pieces.len(),
            "Merging format range"
        );

        self.ranges.extend(
            pieces
                .into_iter()
                .map(|(start, end)| incoming.with_bounds(start, end)),
        );
        self.normalize();
    }

    fn apply_block(&mut self, incoming: FormatRange) {
        self.ranges.clear();
        if incoming.effect != FormatEffect::Invalid {
            self.ranges.push(incoming);
        }
    }

    /// Remove every range
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Account for `width` positions inserted at `index`.
    ///
    /// Ranges starting at or after `index` move; ranges with
    /// `start < index <= end` grow.
    pub(crate) fn shift_for_insert(&mut self, index: usize, width: usize) {
        if self.class() == FormatClass::Block || width == 0 {
            return;
        }
        for range in &mut self.ranges {
            if range.start >= index {
                range.start += width;
                range.end += width;
            } else if index <= range.end {
                range.end += width;
            }
        }
    }

    /// Account for positions `[from, to)` being removed
    pub(crate) fn clip_for_delete(&mut self, from: usize, to: usize) {
        if self.class() == FormatClass::Block || from >= to {
            return;
        }
        let removed = to - from;
        let map = |pos: usize| {
            if pos <= from {
                pos
            } else if pos <= to {
                from
            } else {
                pos - removed
            }
        };
        for range in &mut self.ranges {
            range.start = map(range.start);
            range.end = map(range.end);
        }
        self.normalize();
    }

    /// Ranges clipped to `[from, to)` and moved so that `from` becomes 0
    pub(crate) fn slice(&self, from: usize, to: usize) -> Vec<FormatRange> {
        match self.class() {
            FormatClass::Block => self
                .ranges
                .iter()
                .map(|range| range.with_bounds(0, to - from))
                .collect(),
            FormatClass::Inline => self
                .overlapping(from, to)
                .map(|range| {
                    range
                        .with_bounds(range.start.max(from), range.end.min(to))
                        .rebased(from)
                })
                .collect(),
        }
    }

    /// Sort, drop empty ranges and coalesce touching equal ones
    fn normalize(&mut self) {
        let formatter = self.formatter.clone();
        self.ranges.retain(|range| !range.is_empty());
        self.ranges
            .sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

        let mut out: Vec<FormatRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            if let Some(last) = out.last_mut() {
                if last.touches(&range) && same_format(formatter.as_ref(), last, &range) {
                    last.end = last.end.max(range.end);
                    continue;
                }
            }
            out.push(range);
        }

        debug_assert!(
            out.iter().all(|range| range.start <= range.end),
            "inconsistent format range after normalize"
        );
        self.ranges = out;
    }
}

/// `a` minus `b`, as zero, one or two intervals
fn subtract(a: (usize, usize), b: (usize, usize)) -> Vec<(usize, usize)> {
    if b.1 <= a.0 || b.0 >= a.1 {
        return vec![a];
    }
    let mut out = Vec::with_capacity(2);
    if a.0 < b.0 {
        out.push((a.0, b.0));
    }
    if b.1 < a.1 {
        out.push((b.1, a.1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatData, FormatOutput, Formatter};
    use crate::vdom::VElement;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Color;

    impl Formatter for Color {
        fn name(&self) -> &str {
            "color"
        }

        fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
            a.styles.get("color") == b.styles.get("color")
        }

        fn render(&self, _effect: FormatEffect, data: &FormatData) -> FormatOutput {
            let mut el = VElement::new("span");
            el.styles = data.styles.clone();
            FormatOutput::Wrap(el)
        }
    }

    #[derive(Debug)]
    struct Align;

    impl Formatter for Align {
        fn name(&self) -> &str {
            "align"
        }

        fn class(&self) -> FormatClass {
            FormatClass::Block
        }

        fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
            a == b
        }

        fn render(&self, _effect: FormatEffect, data: &FormatData) -> FormatOutput {
            FormatOutput::Decorate {
                attributes: Default::default(),
                styles: data.styles.clone(),
            }
        }
    }

    fn color(value: &str) -> FormatData {
        FormatData::new().with_style("color", value)
    }

    fn index() -> FormatRangeIndex {
        FormatRangeIndex::new(Rc::new(Color))
    }

    fn bounds(index: &FormatRangeIndex) -> Vec<(usize, usize)> {
        index.ranges().iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_apply_coalesces_adjacent() {
        let mut idx = index();
        idx.apply(FormatRange::valid(0, 3, color("red")));
        idx.apply(FormatRange::valid(3, 6, color("red")));
        assert_eq!(idx.ranges(), &[FormatRange::valid(0, 6, color("red"))]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut once = index();
        once.apply(FormatRange::valid(1, 4, color("red")));

        let mut twice = index();
        twice.apply(FormatRange::valid(1, 4, color("red")));
        twice.apply(FormatRange::valid(1, 4, color("red")));

        assert_eq!(once.ranges(), twice.ranges());
    }

    #[test]
    fn test_apply_overrides_different_data() {
        let mut idx = index();
        idx.apply(FormatRange::valid(0, 10, color("red")));
        idx.apply(FormatRange::valid(3, 6, color("blue")));

        assert_eq!(
            idx.ranges(),
            &[
                FormatRange::valid(0, 3, color("red")),
                FormatRange::valid(3, 6, color("blue")),
                FormatRange::valid(6, 10, color("red")),
            ]
        );
    }

    #[test]
    fn test_invalid_splits() {
        let mut idx = index();
        idx.apply(FormatRange::valid(0, 10, color("red")));
        idx.apply(FormatRange::invalid(3, 6, color("red")));
        assert_eq!(bounds(&idx), vec![(0, 3), (6, 10)]);

        idx.apply(FormatRange::invalid(0, 10, color("red")));
        assert!(idx.is_empty());
    }

    #[test]
    fn test_merge_keeps_existing_data() {
        let mut idx = index();
        idx.merge(FormatRange::valid(3, 5, color("blue")));
        idx.merge(FormatRange::valid(0, 10, color("red")));

        assert_eq!(
            idx.ranges(),
            &[
                FormatRange::valid(0, 3, color("red")),
                FormatRange::valid(3, 5, color("blue")),
                FormatRange::valid(5, 10, color("red")),
            ]
        );
    }

    #[test]
    fn test_merge_coalesces_equal_overlap() {
        let mut idx = index();
        idx.merge(FormatRange::valid(2, 4, color("red")));
        idx.merge(FormatRange::valid(0, 10, color("red")));
        assert_eq!(bounds(&idx), vec![(0, 10)]);
    }

    #[test]
    fn test_different_effects_do_not_coalesce() {
        let mut idx = index();
        idx.apply(FormatRange::valid(0, 3, color("red")));
        idx.apply(FormatRange::new(3, 6, FormatEffect::Inherit, color("red")));
        assert_eq!(bounds(&idx), vec![(0, 3), (3, 6)]);
    }

    #[test]
    fn test_shift_for_insert() {
        let mut idx = index();
        idx.apply(FormatRange::valid(2, 5, color("red")));

        idx.shift_for_insert(1, 1);
        assert_eq!(bounds(&idx), vec![(3, 6)]);

        idx.shift_for_insert(4, 2);
        assert_eq!(bounds(&idx), vec![(3, 8)]);

        idx.shift_for_insert(8, 1);
        assert_eq!(bounds(&idx), vec![(3, 9)]);
    }

    #[test]
    fn test_clip_for_delete() {
        let mut idx = index();
        idx.apply(FormatRange::valid(2, 8, color("red")));
        idx.clip_for_delete(3, 5);
        assert_eq!(bounds(&idx), vec![(2, 6)]);

        idx.clip_for_delete(0, 3);
        assert_eq!(bounds(&idx), vec![(0, 3)]);

        idx.clip_for_delete(0, 3);
        assert!(idx.is_empty());
    }

    #[test]
    fn test_delete_recoalesces() {
        let mut idx = index();
        idx.apply(FormatRange::valid(0, 2, color("red")));
        idx.apply(FormatRange::valid(2, 4, color("blue")));
        idx.apply(FormatRange::valid(4, 6, color("red")));

        idx.clip_for_delete(2, 4);
        assert_eq!(idx.ranges(), &[FormatRange::valid(0, 4, color("red"))]);
    }

    #[test]
    fn test_overlapping_query() {
        let mut idx = index();
        idx.apply(FormatRange::valid(0, 2, color("red")));
        idx.apply(FormatRange::valid(4, 6, color("blue")));
        idx.apply(FormatRange::valid(8, 9, color("red")));

        let hits: Vec<_> = idx.overlapping(1, 5).map(|r| r.start).collect();
        assert_eq!(hits, vec![0, 4]);
        assert_eq!(idx.at(5).map(|r| r.start), Some(4));
        assert!(idx.at(6).is_none());
    }

    #[test]
    fn test_block_single_canonical_range() {
        let mut idx = FormatRangeIndex::new(Rc::new(Align));
        let centered = FormatData::new().with_style("text-align", "center");

        idx.apply(FormatRange::valid(0, 3, centered.clone()));
        idx.apply(FormatRange::valid(0, 5, centered.clone()));
        assert_eq!(idx.ranges().len(), 1);

        assert_eq!(idx.resolved(12), vec![FormatRange::valid(0, 12, centered.clone())]);

        idx.shift_for_insert(0, 4);
        idx.clip_for_delete(0, 2);
        assert_eq!(idx.resolved(7), vec![FormatRange::valid(0, 7, centered.clone())]);

        idx.apply(FormatRange::invalid(0, 7, centered));
        assert!(idx.is_empty());
    }

    #[test]
    fn test_slice_rebases() {
        let mut idx = index();
        idx.apply(FormatRange::valid(2, 8, color("red")));
        let sliced = idx.slice(4, 10);
        assert_eq!(sliced, vec![FormatRange::valid(0, 4, color("red"))]);
    }
}
