// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop targets.
//!
//! A droppable claims a pointer's drag when the pointer is released over it
//! and the drag class is one it accepts. Claiming only reserves the drop; the
//! target's [`DropPolicy`] still gets the final say when the drag resolves.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use hashbrown::HashSet;

use crate::pointer::{PointerEvent, PointerSession};
use crate::session::DragContext;
use crate::tree::WidgetTree;

/// Final veto of a drop target.
pub trait DropPolicy<Id> {
    /// Whether the claimed drop of `draggable` is accepted.
    fn accepts_drag(&self, event: &PointerEvent, context: &DragContext<Id>, draggable: Id) -> bool {
        let _ = (event, context, draggable);
        true
    }
}

/// Accepts every drop it claims.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl<Id> DropPolicy<Id> for AcceptAll {}

impl<Id, F> DropPolicy<Id> for F
where
    F: Fn(&PointerEvent, &DragContext<Id>, Id) -> bool,
{
    fn accepts_drag(&self, event: &PointerEvent, context: &DragContext<Id>, draggable: Id) -> bool {
        self(event, context, draggable)
    }
}

/// Collect drag class names into a set.
pub fn classes<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// A registered drop target.
pub struct Droppable<Id> {
    accepted: HashSet<String>,
    policy: Box<dyn DropPolicy<Id>>,
}

impl<Id: Copy + PartialEq> Droppable<Id> {
    pub(crate) fn new(accepted: HashSet<String>, policy: Box<dyn DropPolicy<Id>>) -> Self {
        Self { accepted, policy }
    }

    /// Drag classes this target accepts.
    pub fn accepted_classes(&self) -> &HashSet<String> {
        &self.accepted
    }

    /// Whether drags of `class` may be dropped here.
    pub fn accepts_class(&self, class: &str) -> bool {
        self.accepted.contains(class)
    }

    pub(crate) fn policy(&self) -> &dyn DropPolicy<Id> {
        &*self.policy
    }

    /// Claim the session's drag if it is over `target` and of an accepted
    /// class. Returns `true` if this target now holds the claim.
    pub(crate) fn offer<T: WidgetTree<Id = Id>>(
        &self,
        tree: &T,
        target: Id,
        session: &mut PointerSession<Id>,
    ) -> bool {
        let Some(class) = session.drag_class() else {
            return false;
        };
        self.accepts_class(class)
            && tree.collides(target, session.position())
            && session.try_claim(target, None)
    }
}

impl<Id> fmt::Debug for Droppable<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Droppable")
            .field("accepted", &self.accepted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{PointerDrag, PointerId};
    use crate::snapshot::save_widget_state;
    use crate::test_tree::{TestTree, Wid};
    use alloc::string::ToString;
    use kurbo::{Point, Rect};

    fn dragging(at: Point, class: &str, draggable: Wid) -> PointerSession<Wid> {
        let mut s = PointerSession::new(&PointerEvent::new(PointerId(1), at, 0));
        s.begin_drag(PointerDrag {
            class: class.to_string(),
            draggable,
        });
        s
    }

    #[test]
    fn claims_only_matching_classes_under_the_pointer() {
        let mut tree = TestTree::new();
        let target = tree.spawn(Rect::new(0.0, 0.0, 100.0, 100.0));
        let item = tree.spawn(Rect::new(0.0, 0.0, 10.0, 10.0));
        let drop = Droppable::new(classes(["card"]), Box::new(AcceptAll));

        let mut wrong_class = dragging(Point::new(50.0, 50.0), "chip", item);
        assert!(!drop.offer(&tree, target, &mut wrong_class));
        assert_eq!(wrong_class.claim(), None);

        let mut outside = dragging(Point::new(150.0, 50.0), "card", item);
        assert!(!drop.offer(&tree, target, &mut outside));

        let mut inside = dragging(Point::new(50.0, 50.0), "card", item);
        assert!(drop.offer(&tree, target, &mut inside));
        assert_eq!(inside.accepting_droppable(), Some(target));
        assert_eq!(inside.drop_insertion_index(), None);
    }

    #[test]
    fn a_second_target_cannot_steal_the_claim() {
        let mut tree = TestTree::new();
        let front = tree.spawn(Rect::new(0.0, 0.0, 100.0, 100.0));
        let back = tree.spawn(Rect::new(0.0, 0.0, 100.0, 100.0));
        let item = tree.spawn(Rect::new(0.0, 0.0, 10.0, 10.0));
        let drop = Droppable::new(classes(["card"]), Box::new(AcceptAll));

        let mut s = dragging(Point::new(50.0, 50.0), "card", item);
        assert!(drop.offer(&tree, front, &mut s));
        assert!(!drop.offer(&tree, back, &mut s));
        assert_eq!(s.accepting_droppable(), Some(front));
    }

    #[test]
    fn no_drag_means_no_claim() {
        let mut tree = TestTree::new();
        let target = tree.spawn(Rect::new(0.0, 0.0, 100.0, 100.0));
        let drop = Droppable::new(classes(["card"]), Box::new(AcceptAll));
        let mut s = PointerSession::new(&PointerEvent::new(PointerId(1), Point::new(5.0, 5.0), 0));
        assert!(!drop.offer(&tree, target, &mut s));
    }

    #[test]
    fn closures_are_policies() {
        let mut tree = TestTree::new();
        let item = tree.spawn(Rect::new(0.0, 0.0, 10.0, 10.0));
        let context = DragContext::new(Point::ZERO, save_widget_state(&tree, item, false));
        let event = PointerEvent::new(PointerId(1), Point::new(5.0, 5.0), 0);

        let reject_left_half = |e: &PointerEvent, _: &DragContext<Wid>, _: Wid| e.position.x >= 50.0;
        let drop = Droppable::new(classes(["card"]), Box::new(reject_left_half));
        assert!(!drop.policy().accepts_drag(&event, &context, item));
        assert!(AcceptAll.accepts_drag(&event, &context, item));
    }
}
