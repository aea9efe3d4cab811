//! Behavioural properties of fragments, format ranges and rendering.
//!
//! Edit sequences and range bounds are generated with proptest, so a
//! failure shrinks to a minimal case.

use crate::*;
use proptest::prelude::*;
use std::rc::Rc;

#[cfg(test)]
mod property_tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Tag(&'static str);

    impl ComponentView for Tag {
        fn name(&self) -> &str {
            self.0
        }

        fn render(&self) -> VElement {
            VElement::new(self.0)
        }

        fn clone_view(&self) -> Box<dyn ComponentView> {
            Box::new(self.clone())
        }
    }

    #[derive(Debug)]
    struct Mark(&'static str);

    impl Formatter for Mark {
        fn name(&self) -> &str {
            self.0
        }

        fn same_data(&self, a: &FormatData, b: &FormatData) -> bool {
            a.styles == b.styles
        }

        fn render(&self, _effect: FormatEffect, data: &FormatData) -> FormatOutput {
            let mut wrapper = VElement::new(self.0);
            wrapper.styles = data.styles.clone();
            FormatOutput::Wrap(wrapper)
        }
    }

    #[derive(Debug)]
    struct Indent;

    impl Formatter for Indent {
        fn name(&self) -> &str {
            "indent"
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

    fn mark(name: &'static str) -> FormatterRef {
        Rc::new(Mark(name))
    }

    fn x() -> FormatData {
        FormatData::new().with_style("color", "red")
    }

    fn ten_chars() -> Fragment {
        let mut fragment = Fragment::new();
        fragment.append("0123456789").unwrap();
        fragment
    }

    fn chars(len: usize) -> Fragment {
        let mut fragment = Fragment::new();
        fragment.append("é".repeat(len)).unwrap();
        fragment
    }

    fn unit_widths(fragment: &Fragment) -> usize {
        fragment
            .slice_contents(..)
            .unwrap()
            .iter()
            .map(Content::width)
            .sum()
    }

    /// Fold two raw numbers onto an ordered pair of positions in `[0, len]`
    fn span(len: usize, a: usize, b: usize) -> (usize, usize) {
        let (a, b) = (a % (len + 1), b % (len + 1));
        (a.min(b), a.max(b))
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    #[derive(Debug, Clone)]
    enum Edit {
        InsertText(String, usize),
        InsertComponent(usize),
        Delete(usize, usize),
        Apply(usize, usize),
        ApplyInvalid(usize, usize),
    }

    fn edit_strategy() -> impl Strategy<Value = Edit> {
        prop_oneof![
            ("[a-zñ€]{1,4}", any::<usize>()).prop_map(|(text, at)| Edit::InsertText(text, at)),
            any::<usize>().prop_map(Edit::InsertComponent),
            (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::Delete(a, b)),
            (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::Apply(a, b)),
            (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::ApplyInvalid(a, b)),
        ]
    }

    fn run_edit(fragment: &mut Fragment, bold: &FormatterRef, edit: &Edit) {
        let len = fragment.len();
        match edit {
            Edit::InsertText(text, at) => fragment.insert(text.as_str(), at % (len + 1)).unwrap(),
            Edit::InsertComponent(at) => fragment
                .insert(ComponentRef::leaf(Tag("br")), at % (len + 1))
                .unwrap(),
            Edit::Delete(a, b) => {
                let (from, to) = span(len, *a, *b);
                fragment.delete(from, to).unwrap();
            }
            Edit::Apply(a, b) => {
                let (from, to) = span(len, *a, *b);
                fragment
                    .apply_format(bold, FormatRange::valid(from, to, x()))
                    .unwrap();
            }
            Edit::ApplyInvalid(a, b) => {
                let (from, to) = span(len, *a, *b);
                fragment
                    .apply_format(bold, FormatRange::invalid(from, to, x()))
                    .unwrap();
            }
        }
    }

    // ========================================================================
    // Edit sequences
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Length, text joining and range shape hold after every edit.
        #[test]
        fn length_and_ranges_hold_after_edits(edits in prop::collection::vec(edit_strategy(), 1..60)) {
            let mut fragment = Fragment::new();
            let bold = mark("b");

            for (step, edit) in edits.iter().enumerate() {
                run_edit(&mut fragment, &bold, edit);

                prop_assert_eq!(fragment.len(), unit_widths(&fragment), "step {}", step);
                for pair in fragment.contents().windows(2) {
                    prop_assert!(
                        pair[0].as_text().is_none() || pair[1].as_text().is_none(),
                        "adjacent text units at step {}", step
                    );
                }
                prop_assert!(fragment.contents().iter().all(|content| content.width() > 0));

                let ranges = fragment.format_ranges("b");
                for range in &ranges {
                    prop_assert!(range.start < range.end && range.end <= fragment.len(), "step {}", step);
                }
                for pair in ranges.windows(2) {
                    prop_assert!(pair[0].end < pair[1].start, "uncoalesced ranges at step {}", step);
                }
            }
        }

        /// Applying a range a second time changes nothing.
        #[test]
        fn apply_twice_is_apply_once(
            len in 1usize..30,
            prior in prop::collection::vec((any::<usize>(), any::<usize>()), 0..4),
            a in any::<usize>(),
            b in any::<usize>(),
        ) {
            let bold = mark("b");
            let mut fragment = chars(len);
            for (pa, pb) in prior {
                let (from, to) = span(len, pa, pb);
                let data = FormatData::new().with_style("color", "blue");
                fragment.apply_format(&bold, FormatRange::valid(from, to, data)).unwrap();
            }
            let (from, to) = span(len, a, b);

            fragment.apply_format(&bold, FormatRange::valid(from, to, x())).unwrap();
            let once = fragment.format_ranges("b");
            fragment.apply_format(&bold, FormatRange::valid(from, to, x())).unwrap();

            prop_assert_eq!(fragment.format_ranges("b"), once);
        }

        /// `[a, b)` then `[b, c)` with equal data is one range `[a, c)`.
        #[test]
        fn adjacent_ranges_merge(
            len in 1usize..30,
            cuts in prop::array::uniform3(any::<usize>()),
        ) {
            let mut cuts = cuts.map(|cut| cut % (len + 1));
            cuts.sort_unstable();
            let [a, b, c] = cuts;
            let bold = mark("b");
            let mut fragment = chars(len);

            fragment.apply_format(&bold, FormatRange::valid(a, b, x())).unwrap();
            fragment.apply_format(&bold, FormatRange::valid(b, c, x())).unwrap();

            let expected = if a < c { vec![FormatRange::valid(a, c, x())] } else { Vec::new() };
            prop_assert_eq!(fragment.format_ranges("b"), expected);
        }

        /// An `Invalid` range cuts a hole, leaving the pieces on either side.
        #[test]
        fn invalid_range_splits(len in 1usize..30, a in any::<usize>(), b in any::<usize>()) {
            let bold = mark("b");
            let mut fragment = chars(len);
            fragment.apply_format(&bold, FormatRange::valid(0, len, x())).unwrap();
            let (from, to) = span(len, a, b);

            fragment.apply_format(&bold, FormatRange::invalid(from, to, x())).unwrap();

            let expected: Vec<FormatRange> = if from == to {
                vec![FormatRange::valid(0, len, x())]
            } else {
                [(0, from), (to, len)]
                    .into_iter()
                    .filter(|(start, end)| start < end)
                    .map(|(start, end)| FormatRange::valid(start, end, x()))
                    .collect()
            };
            prop_assert_eq!(fragment.format_ranges("b"), expected);
        }

        /// A component inserted before a range moves it, one inside grows it.
        #[test]
        fn component_insert_shifts_range(
            len in 1usize..30,
            a in any::<usize>(),
            b in any::<usize>(),
            at in any::<usize>(),
        ) {
            let (start, end) = span(len, a, b);
            prop_assume!(start < end);
            let at = at % (len + 1);
            let bold = mark("b");
            let mut fragment = chars(len);
            fragment.apply_format(&bold, FormatRange::valid(start, end, x())).unwrap();

            fragment.insert(ComponentRef::leaf(Tag("img")), at).unwrap();

            let expected = if at <= start {
                (start + 1, end + 1)
            } else if at <= end {
                (start, end + 1)
            } else {
                (start, end)
            };
            prop_assert_eq!(
                fragment.format_ranges("b"),
                vec![FormatRange::valid(expected.0, expected.1, x())]
            );
            prop_assert_eq!(fragment.len(), len + 1);
        }

        /// Deleting moves each bound onto the surviving positions.
        #[test]
        fn delete_shrinks_range(
            len in 1usize..30,
            range in (any::<usize>(), any::<usize>()),
            removed in (any::<usize>(), any::<usize>()),
        ) {
            let (start, end) = span(len, range.0, range.1);
            prop_assume!(start < end);
            let (from, to) = span(len, removed.0, removed.1);
            let bold = mark("b");
            let mut fragment = chars(len);
            fragment.apply_format(&bold, FormatRange::valid(start, end, x())).unwrap();

            fragment.delete(from, to).unwrap();

            let moved = |pos: usize| {
                if pos <= from {
                    pos
                } else if pos <= to {
                    from
                } else {
                    pos - (to - from)
                }
            };
            let (start, end) = (moved(start), moved(end));
            let expected = if start < end {
                vec![FormatRange::valid(start, end, x())]
            } else {
                Vec::new()
            };
            prop_assert_eq!(fragment.format_ranges("b"), expected);
            prop_assert_eq!(fragment.len(), len - (to - from));
        }
    }

    #[test]
    fn test_component_is_one_position_wide() {
        let quote = ComponentRef::branch(Tag("blockquote"));
        {
            let mut slot = quote.slot_mut(0).unwrap();
            slot.append("a long quotation with plenty of text").unwrap();
            slot.append(ComponentRef::leaf(Tag("br"))).unwrap();
        }

        let mut fragment = Fragment::new();
        fragment.append("ab").unwrap();
        fragment.append(quote.clone()).unwrap();
        fragment.append("cd").unwrap();

        assert_eq!(fragment.len(), 5);
        assert_eq!(fragment.index_of(&quote), Some(2));
        assert_eq!(fragment.content_at(2).unwrap(), Content::Component(quote));
    }

    #[test]
    fn test_block_range_follows_length() {
        let indent: FormatterRef = Rc::new(Indent);
        let data = FormatData::new().with_style("padding-left", "2em");
        let mut fragment = ten_chars();
        fragment
            .apply_format(&indent, FormatRange::valid(0, 10, data.clone()))
            .unwrap();

        fragment.delete(0, 4).unwrap();
        fragment.append("more").unwrap();
        assert_eq!(
            fragment.format_ranges("indent"),
            vec![FormatRange::valid(0, 10, data.clone())]
        );

        fragment.delete(0, 10).unwrap();
        assert_eq!(
            fragment.format_ranges("indent"),
            vec![FormatRange::valid(0, 0, data)]
        );
    }

    #[test]
    fn test_rendered_text_matches_contents() {
        let bold = mark("b");
        let italic = mark("i");
        let mut fragment = Fragment::new();
        fragment.append("Lorem ipsum ").unwrap();
        fragment.append(ComponentRef::leaf(Tag("br"))).unwrap();
        fragment.append("dolor sit amet").unwrap();
        fragment.apply_format(&bold, FormatRange::valid(3, 15, x())).unwrap();
        fragment.apply_format(&italic, FormatRange::valid(8, 20, x())).unwrap();
        fragment
            .apply_format(&bold, FormatRange::invalid(10, 11, x()))
            .unwrap();

        let expected: String = fragment
            .slice_contents(..)
            .unwrap()
            .iter()
            .filter_map(Content::as_text)
            .collect();
        let tree = render_fragment(&fragment, VElement::new("p"));
        assert_eq!(tree.text_content(), expected);
    }

    #[test]
    fn test_each_range_renders_one_wrapper_when_nested() {
        let bold = mark("b");
        let italic = mark("i");
        let mut fragment = ten_chars();
        fragment.apply_format(&bold, FormatRange::valid(1, 9, x())).unwrap();
        fragment.apply_format(&italic, FormatRange::valid(3, 5, x())).unwrap();

        let tree = render_fragment(&fragment, VElement::new("p"));
        let bolds: Vec<&VElement> = tree
            .children
            .iter()
            .filter_map(VNode::as_element)
            .filter(|el| el.tag == "b")
            .collect();
        assert_eq!(bolds.len(), 1);
        assert_eq!(bolds[0].text_content(), "12345678");
        assert!(bolds[0]
            .children
            .iter()
            .filter_map(VNode::as_element)
            .any(|el| el.tag == "i" && el.text_content() == "34"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let bold = mark("b");
        let mut fragment = ten_chars();
        fragment.append(ComponentRef::branch(Tag("p"))).unwrap();
        fragment.apply_format(&bold, FormatRange::valid(0, 2, x())).unwrap();

        let json = serde_json::to_value(fragment.snapshot()).unwrap();
        assert_eq!(json["length"], 11);
        assert_eq!(json["contents"][0]["type"], "Text");
        assert_eq!(json["contents"][1]["type"], "Component");
        assert_eq!(json["contents"][1]["slots"][0]["role"], "default");
        assert_eq!(json["formats"][0]["kind"], "b");
        assert_eq!(json["formats"][0]["ranges"][0]["end"], 2);
    }
}
