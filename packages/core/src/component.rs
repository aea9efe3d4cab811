//! Components: atomic units of a fragment that may own nested fragments.
//!
//! A component always occupies exactly one position in the fragment that
//! holds it. Its slots are separate index spaces. Handles are shared
//! (`Rc`), so a fragment snapshot can point at the same components as the
//! live tree; ownership in the document sense is tracked through the
//! parent back-reference, which is a plain [`FragmentId`] and never keeps
//! anything alive. A component is attached to at most one fragment.
//!
//! Slot fragments keep a weak link to the component owning them and every
//! attached component keeps a weak link to the owner of the fragment
//! holding it, so ancestry is answered by walking up without borrowing any
//! slot.

use crate::fragment::{Fragment, FragmentId};
use crate::vdom::VElement;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique component identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// No slots
    Leaf,
    /// Exactly one slot
    Branch,
    /// Slots keyed by role
    Division,
}

/// Rendering hooks of a component.
///
/// `render` produces the component's own element. For a branch that
/// element hosts the single slot's content. For a division each slot is
/// rendered into the element returned by `slot_render`, and the hosts are
/// appended to `render`'s element in slot order.
pub trait ComponentView: fmt::Debug {
    fn name(&self) -> &str;

    fn render(&self) -> VElement;

    fn slot_render(&self, slot: &Slot) -> VElement {
        let _ = slot;
        VElement::new("div")
    }

    fn clone_view(&self) -> Box<dyn ComponentView>;
}

/// Role used for the only slot of a branch component
pub const DEFAULT_SLOT_ROLE: &str = "default";

/// A named content container owned by a component
#[derive(Debug)]
pub struct Slot {
    role: String,
    fragment: Fragment,
}

impl Slot {
    fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            fragment: Fragment::new(),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn fragment_mut(&mut self) -> &mut Fragment {
        &mut self.fragment
    }
}

#[derive(Debug)]
pub(crate) struct ComponentNode {
    id: ComponentId,
    kind: ComponentKind,
    parent: Cell<Option<FragmentId>>,
    /// Owner of the fragment in `parent`, empty for a root fragment
    holder: RefCell<OwnerLink>,
    view: Box<dyn ComponentView>,
    slots: RefCell<Vec<Slot>>,
}

/// Weak link from a slot fragment to the component owning it
#[derive(Debug, Clone, Default)]
pub(crate) struct OwnerLink(Weak<ComponentNode>);

impl OwnerLink {
    fn upgrade(&self) -> Option<ComponentRef> {
        self.0.upgrade().map(ComponentRef)
    }
}

/// Shared handle to a component
#[derive(Debug, Clone)]
pub struct ComponentRef(Rc<ComponentNode>);

impl ComponentRef {
    fn with_slots(kind: ComponentKind, view: Box<dyn ComponentView>, mut slots: Vec<Slot>) -> Self {
        Self(Rc::new_cyclic(|node| {
            for slot in &mut slots {
                slot.fragment.set_owner(OwnerLink(node.clone()));
            }
            ComponentNode {
                id: ComponentId::next(),
                kind,
                parent: Cell::new(None),
                holder: RefCell::new(OwnerLink::default()),
                view,
                slots: RefCell::new(slots),
            }
        }))
    }

    /// Atomic component without slots
    pub fn leaf(view: impl ComponentView + 'static) -> Self {
        Self::with_slots(ComponentKind::Leaf, Box::new(view), Vec::new())
    }

    /// Component with exactly one slot, role [`DEFAULT_SLOT_ROLE`]
    pub fn branch(view: impl ComponentView + 'static) -> Self {
        Self::with_slots(
            ComponentKind::Branch,
            Box::new(view),
            vec![Slot::new(DEFAULT_SLOT_ROLE)],
        )
    }

    /// Component with one slot per role; duplicate roles are dropped
    pub fn division<I, S>(view: impl ComponentView + 'static, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<Slot> = Vec::new();
        for role in roles {
            let role = role.into();
            if slots.iter().all(|slot| slot.role != role) {
                slots.push(Slot::new(role));
            }
        }
        Self::with_slots(ComponentKind::Division, Box::new(view), slots)
    }

    pub fn id(&self) -> ComponentId {
        self.0.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.0.kind
    }

    pub fn name(&self) -> &str {
        self.0.view.name()
    }

    pub fn view(&self) -> &dyn ComponentView {
        self.0.view.as_ref()
    }

    /// Width in the parent's index space, always 1
    pub fn width(&self) -> usize {
        1
    }

    /// Fragment currently holding this component
    pub fn parent(&self) -> Option<FragmentId> {
        self.0.parent.get()
    }

    pub(crate) fn attach(&self, parent: FragmentId, holder: &OwnerLink) {
        self.0.parent.set(Some(parent));
        *self.0.holder.borrow_mut() = holder.clone();
    }

    pub(crate) fn detach(&self) {
        self.0.parent.set(None);
        *self.0.holder.borrow_mut() = OwnerLink::default();
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn slot_count(&self) -> usize {
        self.0.slots.borrow().len()
    }

    pub fn slots(&self) -> Ref<'_, [Slot]> {
        Ref::map(self.0.slots.borrow(), Vec::as_slice)
    }

    pub fn slot(&self, index: usize) -> Option<Ref<'_, Slot>> {
        Ref::filter_map(self.0.slots.borrow(), |slots| slots.get(index)).ok()
    }

    pub fn slot_index(&self, role: &str) -> Option<usize> {
        self.0.slots.borrow().iter().position(|slot| slot.role == role)
    }

    pub fn slot_by_role(&self, role: &str) -> Option<Ref<'_, Slot>> {
        self.slot(self.slot_index(role)?)
    }

    /// Mutable access to a slot's fragment.
    ///
    /// Panics if the slots are already borrowed, as any `RefCell` would.
    pub fn slot_mut(&self, index: usize) -> Option<RefMut<'_, Fragment>> {
        RefMut::filter_map(self.0.slots.borrow_mut(), |slots| {
            slots.get_mut(index).map(Slot::fragment_mut)
        })
        .ok()
    }

    /// True if `fragment` is one of this component's slots or nested below them.
    ///
    /// Walks up from the fragment, so slots borrowed elsewhere do not matter.
    pub fn contains_fragment(&self, fragment: &Fragment) -> bool {
        self.encloses(fragment.owner())
    }

    /// True if this component is `owner` or one of its ancestors
    pub(crate) fn encloses(&self, owner: &OwnerLink) -> bool {
        let mut current = owner.upgrade();
        while let Some(component) = current {
            if component.ptr_eq(self) {
                return true;
            }
            let next = component.0.holder.borrow().upgrade();
            current = next;
        }
        false
    }

    /// Copy with a fresh identity, cloned view and deep-cloned slots
    pub fn deep_clone(&self) -> Self {
        let slots = self
            .0
            .slots
            .borrow()
            .iter()
            .map(|slot| Slot {
                role: slot.role.clone(),
                fragment: slot.fragment.deep_clone(),
            })
            .collect();
        Self::with_slots(self.0.kind, self.0.view.clone_view(), slots)
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ComponentRef {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Block(&'static str);

    impl ComponentView for Block {
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

    #[test]
    fn test_kinds_and_slots() {
        let leaf = ComponentRef::leaf(Block("br"));
        assert_eq!(leaf.kind(), ComponentKind::Leaf);
        assert_eq!(leaf.slot_count(), 0);
        assert!(leaf.slot_mut(0).is_none());

        let branch = ComponentRef::branch(Block("p"));
        assert_eq!(branch.kind(), ComponentKind::Branch);
        assert_eq!(branch.slot_index(DEFAULT_SLOT_ROLE), Some(0));

        let division = ComponentRef::division(Block("table"), ["head", "body", "head"]);
        assert_eq!(division.kind(), ComponentKind::Division);
        assert_eq!(division.slot_count(), 2);
        assert_eq!(division.slot_index("body"), Some(1));
        assert!(division.slot_by_role("foot").is_none());
    }

    #[test]
    fn test_identity() {
        let a = ComponentRef::leaf(Block("br"));
        let b = ComponentRef::leaf(Block("br"));
        assert_ne!(a.id(), b.id());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_deep_clone_copies_slots() {
        let p = ComponentRef::branch(Block("p"));
        p.slot_mut(0).unwrap().append("hello").unwrap();

        let copy = p.deep_clone();
        assert_ne!(copy.id(), p.id());
        copy.slot_mut(0).unwrap().append("!").unwrap();

        assert_eq!(p.slot(0).unwrap().fragment().plain_text(), "hello");
        assert_eq!(copy.slot(0).unwrap().fragment().plain_text(), "hello!");
    }

    #[test]
    fn test_contains_fragment() {
        let outer = ComponentRef::branch(Block("div"));
        let inner = ComponentRef::branch(Block("p"));
        outer.slot_mut(0).unwrap().append(inner.clone()).unwrap();

        assert_eq!(inner.parent(), Some(outer.slot(0).unwrap().fragment().id()));
        assert!(outer.contains_fragment(inner.slot(0).unwrap().fragment()));
        assert!(inner.contains_fragment(inner.slot(0).unwrap().fragment()));
        assert!(!inner.contains_fragment(outer.slot(0).unwrap().fragment()));
        assert!(!inner.contains_fragment(&Fragment::new()));
    }

    #[test]
    fn test_contains_fragment_while_slot_is_borrowed() {
        let outer = ComponentRef::branch(Block("div"));
        let inner = ComponentRef::branch(Block("p"));
        outer.slot_mut(0).unwrap().append(inner.clone()).unwrap();
        let elsewhere = ComponentRef::branch(Block("section"));

        let inner_slot = inner.slot_mut(0).unwrap();
        assert!(outer.contains_fragment(&inner_slot));
        assert!(!elsewhere.contains_fragment(&inner_slot));
    }

    #[test]
    fn test_deep_clone_links_slot_owner() {
        let outer = ComponentRef::branch(Block("div"));
        outer
            .slot_mut(0)
            .unwrap()
            .append(ComponentRef::branch(Block("p")))
            .unwrap();

        let copy = outer.deep_clone();
        let slots = copy.slots();
        let nested = slots[0].fragment().components().next().unwrap().clone();
        let nested_slot = nested.slot(0).unwrap();
        assert!(copy.contains_fragment(nested_slot.fragment()));
        assert!(!outer.contains_fragment(nested_slot.fragment()));
    }
}
