//! Fragment and component rendering into a presentational tree.
//!
//! Block formats act on the host element: `Decorate` merges into it and
//! `Wrap` adds a wrapper directly inside it, the first kind outermost.
//! Inline ranges become nested wrappers. They are sorted by start, then
//! longest first, then with the kind first used last outermost: the
//! parser merges inner elements before outer ones, so `<b><i>x</i></b>`
//! comes back nested the same way. A range crossing the end of an
//! enclosing wrapper is split at that end.

use crate::component::{ComponentKind, ComponentRef};
use crate::format::{FormatClass, FormatOutput};
use crate::fragment::{Content, Fragment};
use crate::vdom::{VElement, VNode};
use tracing::instrument;

/// Render a component and, recursively, the content of its slots
pub fn render_component(component: &ComponentRef) -> VElement {
    let view = component.view();
    match component.kind() {
        ComponentKind::Leaf => view.render(),
        ComponentKind::Branch => match component.slot(0) {
            Some(slot) => render_fragment(slot.fragment(), view.render()),
            None => view.render(),
        },
        ComponentKind::Division => {
            let mut element = view.render();
            for slot in component.slots().iter() {
                let host = view.slot_render(slot);
                element.push_child(render_fragment(slot.fragment(), host).into());
            }
            element
        }
    }
}

/// Render `fragment`'s content and formats into `host`
#[instrument(level = "trace", skip_all, fields(fragment = %fragment.id(), length = fragment.len()))]
pub fn render_fragment(fragment: &Fragment, mut host: VElement) -> VElement {
    let length = fragment.len();
    let mut block_wrappers = Vec::new();
    let mut spans = Vec::new();

    for (kind, formats) in fragment.format_indexes().iter().enumerate() {
        let formatter = formats.formatter();
        for range in formats.resolved(length) {
            let output = formatter.render(range.effect, &range.data);
            match (formats.class(), output) {
                (_, FormatOutput::Skip) => {}
                (FormatClass::Block, FormatOutput::Decorate { attributes, styles }) => {
                    host.merge_decorations(&attributes, &styles)
                }
                (FormatClass::Block, FormatOutput::Wrap(wrapper)) => block_wrappers.push(wrapper),
                (FormatClass::Inline, _) if range.is_empty() => {}
                (FormatClass::Inline, FormatOutput::Decorate { attributes, styles }) => {
                    if range.start == 0 && range.end == length {
                        host.merge_decorations(&attributes, &styles);
                    } else {
                        let mut wrapper = VElement::new("span");
                        wrapper.merge_decorations(&attributes, &styles);
                        spans.push(Span::new(range.start, range.end, kind, wrapper));
                    }
                }
                (FormatClass::Inline, FormatOutput::Wrap(wrapper)) => {
                    spans.push(Span::new(range.start, range.end, kind, wrapper))
                }
            }
        }
    }

    sort_spans(&mut spans);
    let mut body = VElement::default();
    let mut cursor = ContentCursor::new(fragment.contents());
    nest(&mut cursor, &mut body, spans, 0, length);

    let mut children = body.children;
    for mut wrapper in block_wrappers.into_iter().rev() {
        for child in children {
            wrapper.push_child(child);
        }
        children = vec![wrapper.into()];
    }
    for child in children {
        host.push_child(child);
    }
    host
}

#[derive(Debug, Clone)]
struct Span {
    start: usize,
    end: usize,
    kind: usize,
    wrapper: VElement,
}

impl Span {
    fn new(start: usize, end: usize, kind: usize, wrapper: VElement) -> Self {
        Self {
            start,
            end,
            kind,
            wrapper,
        }
    }

    fn with_bounds(&self, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind: self.kind,
            wrapper: self.wrapper.clone(),
        }
    }
}

fn sort_spans(spans: &mut [Span]) {
    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(b.kind.cmp(&a.kind))
    });
}

/// Emit `[from, to)` into `parent`, opening a wrapper for each span.
///
/// `spans` must be sorted and lie within `[from, to)`.
fn nest(
    cursor: &mut ContentCursor<'_>,
    parent: &mut VElement,
    mut spans: Vec<Span>,
    from: usize,
    to: usize,
) {
    let mut position = from;

    while !spans.is_empty() {
        let outer = spans.remove(0);
        cursor.emit(parent, position, outer.start);

        let mut inner = Vec::new();
        let mut rest = Vec::new();
        for span in spans.drain(..) {
            if span.start >= outer.end {
                rest.push(span);
            } else if span.end > outer.end {
                inner.push(span.with_bounds(span.start, outer.end));
                rest.push(span.with_bounds(outer.end, span.end));
            } else {
                inner.push(span);
            }
        }
        sort_spans(&mut rest);
        spans = rest;

        let mut wrapper = outer.wrapper;
        nest(cursor, &mut wrapper, inner, outer.start, outer.end);
        parent.push_child(wrapper.into());
        position = outer.end;
    }

    cursor.emit(parent, position, to);
}

/// Forward-only walk over a fragment's content units.
///
/// Nesting emits positions in increasing order, so each unit is visited
/// once and text is cut without rescanning from its start.
struct ContentCursor<'a> {
    contents: &'a [Content],
    unit: usize,
    position: usize,
    /// Byte offset of `position` inside the current text unit
    byte: usize,
}

impl<'a> ContentCursor<'a> {
    fn new(contents: &'a [Content]) -> Self {
        Self {
            contents,
            unit: 0,
            position: 0,
            byte: 0,
        }
    }

    /// Push the units covering `[from, to)`, cutting text at the bounds.
    /// `from` must not lie before the end of the previous call.
    fn emit(&mut self, parent: &mut VElement, from: usize, to: usize) {
        while self.position < to {
            let Some(content) = self.contents.get(self.unit) else {
                break;
            };
            match content {
                Content::Text(text) => {
                    let wanted = from.saturating_sub(self.position);
                    let (start, skipped) = take_chars(text, self.byte, wanted);
                    self.position += skipped;
                    let (end, taken) = take_chars(text, start, to.saturating_sub(self.position));
                    if taken > 0 {
                        parent.push_child(VNode::text(&text[start..end]));
                    }
                    self.position += taken;
                    if end == text.len() {
                        self.unit += 1;
                        self.byte = 0;
                    } else {
                        self.byte = end;
                    }
                }
                Content::Component(component) => {
                    if self.position >= from {
                        parent.push_child(render_component(component).into());
                    }
                    self.position += component.width();
                    self.unit += 1;
                }
            }
        }
    }
}

/// Byte offset `count` chars past `byte`, clamped to the end of `text`,
/// and the number of chars actually passed
fn take_chars(text: &str, byte: usize, count: usize) -> (usize, usize) {
    let mut passed = 0;
    for (offset, _) in text[byte..].char_indices() {
        if passed == count {
            return (byte + offset, passed);
        }
        passed += 1;
    }
    (text.len(), passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentView, Slot};
    use crate::format::{FormatData, FormatEffect, FormatRange, Formatter, FormatterRef};
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    struct Tag(&'static str);

    impl ComponentView for Tag {
        fn name(&self) -> &str {
            self.0
        }

        fn render(&self) -> VElement {
            VElement::new(self.0)
        }

        fn slot_render(&self, slot: &Slot) -> VElement {
            VElement::new("cell").with_attr("role", slot.role())
        }

        fn clone_view(&self) -> Box<dyn ComponentView> {
            Box::new(self.clone())
        }
    }

    #[derive(Debug)]
    struct Wrap(&'static str, FormatClass);

    impl Formatter for Wrap {
        fn name(&self) -> &str {
            self.0
        }

        fn class(&self) -> FormatClass {
            self.1
        }

        fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
            a == b
        }

        fn render(&self, _effect: FormatEffect, _data: &FormatData) -> FormatOutput {
            FormatOutput::Wrap(VElement::new(self.0))
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

    fn inline(tag: &'static str) -> FormatterRef {
        Rc::new(Wrap(tag, FormatClass::Inline))
    }

    fn apply(fragment: &mut Fragment, formatter: &FormatterRef, start: usize, end: usize) {
        fragment
            .apply_format(formatter, FormatRange::valid(start, end, FormatData::new()))
            .unwrap();
    }

    fn text_fragment(text: &str) -> Fragment {
        let mut fragment = Fragment::new();
        fragment.append(text).unwrap();
        fragment
    }

    #[test]
    fn test_plain_text() {
        let el = render_fragment(&text_fragment("hello"), VElement::new("p"));
        assert_eq!(el, VElement::new("p").with_text("hello"));
    }

    #[test]
    fn test_inline_wrapper_splits_text() {
        let mut fragment = text_fragment("hello world");
        apply(&mut fragment, &inline("b"), 6, 11);

        let el = render_fragment(&fragment, VElement::new("p"));
        assert_eq!(
            el,
            VElement::new("p")
                .with_text("hello ")
                .with_child(VElement::new("b").with_text("world"))
        );
    }

    #[test]
    fn test_nested_and_crossing_ranges() {
        let mut fragment = text_fragment("abcdef");
        let b = inline("b");
        let i = inline("i");
        apply(&mut fragment, &b, 0, 4);
        apply(&mut fragment, &i, 2, 6);

        let el = render_fragment(&fragment, VElement::new("p"));
        assert_eq!(
            el,
            VElement::new("p")
                .with_child(
                    VElement::new("b")
                        .with_text("ab")
                        .with_child(VElement::new("i").with_text("cd"))
                )
                .with_child(VElement::new("i").with_text("ef"))
        );
        assert_eq!(el.text_content(), "abcdef");
    }

    #[test]
    fn test_spans_cut_multibyte_text_and_components() {
        let mut fragment = text_fragment("añ");
        fragment.append(ComponentRef::leaf(Tag("br"))).unwrap();
        fragment.append("ü€x").unwrap();
        let b = inline("b");
        apply(&mut fragment, &b, 1, 2);
        apply(&mut fragment, &inline("i"), 2, 4);
        apply(&mut fragment, &b, 4, 5);

        let el = render_fragment(&fragment, VElement::new("p"));
        assert_eq!(
            el,
            VElement::new("p")
                .with_text("a")
                .with_child(VElement::new("b").with_text("ñ"))
                .with_child(
                    VElement::new("i")
                        .with_child(VElement::new("br"))
                        .with_text("ü")
                )
                .with_child(VElement::new("b").with_text("€"))
                .with_text("x")
        );
    }

    #[test]
    fn test_many_spans_over_one_text_unit() {
        let text = "é".repeat(40);
        let mut fragment = text_fragment(&text);
        let b = inline("b");
        for start in (0..40).step_by(2) {
            apply(&mut fragment, &b, start, start + 1);
        }

        let el = render_fragment(&fragment, VElement::new("p"));
        let mut expected = VElement::new("p");
        for _ in 0..20 {
            expected = expected
                .with_child(VElement::new("b").with_text("é"))
                .with_text("é");
        }
        assert_eq!(el, expected);
        assert_eq!(el.text_content(), text);
    }

    #[test]
    fn test_equal_spans_put_later_kind_outside() {
        let mut fragment = text_fragment("x");
        apply(&mut fragment, &inline("i"), 0, 1);
        apply(&mut fragment, &inline("b"), 0, 1);

        let el = render_fragment(&fragment, VElement::new("p"));
        assert_eq!(
            el,
            VElement::new("p").with_child(
                VElement::new("b").with_child(VElement::new("i").with_text("x"))
            )
        );
    }

    #[test]
    fn test_block_decorate_and_wrap() {
        let mut fragment = text_fragment("centered");
        let align: FormatterRef = Rc::new(Align);
        fragment
            .apply_format(
                &align,
                FormatRange::valid(0, 8, FormatData::new().with_style("text-align", "center")),
            )
            .unwrap();
        let quote: FormatterRef = Rc::new(Wrap("q", FormatClass::Block));
        apply(&mut fragment, &quote, 0, 0);

        let el = render_fragment(&fragment, VElement::new("p"));
        assert_eq!(
            el,
            VElement::new("p")
                .with_style("text-align", "center")
                .with_child(VElement::new("q").with_text("centered"))
        );
    }

    #[test]
    fn test_components_render_recursively() {
        let p = ComponentRef::branch(Tag("p"));
        {
            let mut slot = p.slot_mut(0).unwrap();
            slot.append("a").unwrap();
            slot.append(ComponentRef::leaf(Tag("br"))).unwrap();
            slot.append("b").unwrap();
            apply(&mut slot, &inline("em"), 0, 3);
        }

        let el = render_component(&p);
        assert_eq!(
            el,
            VElement::new("p").with_child(
                VElement::new("em")
                    .with_text("a")
                    .with_child(VElement::new("br"))
                    .with_text("b")
            )
        );
    }

    #[test]
    fn test_division_renders_slot_hosts() {
        let table = ComponentRef::division(Tag("row"), ["left", "right"]);
        table.slot_mut(0).unwrap().append("L").unwrap();
        table.slot_mut(1).unwrap().append("R").unwrap();

        let el = render_component(&table);
        assert_eq!(
            el,
            VElement::new("row")
                .with_child(VElement::new("cell").with_attr("role", "left").with_text("L"))
                .with_child(VElement::new("cell").with_attr("role", "right").with_text("R"))
        );
    }
}
