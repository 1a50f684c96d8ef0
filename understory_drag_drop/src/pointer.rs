// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer events and the per-pointer shared session.
//!
//! A [`PointerSession`] lives from the press of one physical pointer contact
//! until every widget interested in it has reacted to the release. It is the
//! only state shared between draggables, droppables and reorderables: the
//! active drag writes the drag fields, and drop targets read them and write
//! the single first-claim slot.

use alloc::string::String;
use smallvec::SmallVec;

use kurbo::Point;

/// Identity of one physical pointer contact (mouse button, finger, pen).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

/// A raw pointer sample delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Which pointer this sample belongs to.
    pub pointer: PointerId,
    /// Window-space position.
    pub position: Point,
    /// Host timestamp in milliseconds.
    pub time: u64,
    /// Whether this is a wheel/scroll gesture rather than a press.
    pub is_scroll: bool,
}

impl PointerEvent {
    /// A plain (non-scroll) sample.
    pub fn new(pointer: PointerId, position: Point, time: u64) -> Self {
        Self {
            pointer,
            position,
            time,
            is_scroll: false,
        }
    }
}

/// The drag travelling through a pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerDrag<Id> {
    /// Drag class of the dragged widget.
    pub class: String,
    /// The dragged widget. Its context is available through
    /// [`DragDrop::drag_context`](crate::DragDrop::drag_context).
    pub draggable: Id,
}

/// A drop target's claim on a pointer's drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claim<Id> {
    /// The accepting droppable or reorderable.
    pub droppable: Id,
    /// Insertion index for ordered targets.
    pub index: Option<usize>,
}

/// Shared state of one pointer contact.
#[derive(Clone, Debug)]
pub struct PointerSession<Id> {
    pointer: PointerId,
    origin: Point,
    position: Point,
    ended: bool,
    drag: Option<PointerDrag<Id>>,
    claim: Option<Claim<Id>>,
    /// Draggables that already looked at this pointer's press.
    pressed_by: SmallVec<[Id; 4]>,
    /// Reorderables that already looked at this pointer's drag.
    observed_by: SmallVec<[Id; 4]>,
    /// Reorderables currently showing a spacer for this pointer, in start order.
    watchers: SmallVec<[Id; 2]>,
}

impl<Id: Copy + PartialEq> PointerSession<Id> {
    pub(crate) fn new(event: &PointerEvent) -> Self {
        Self {
            pointer: event.pointer,
            origin: event.position,
            position: event.position,
            ended: false,
            drag: None,
            claim: None,
            pressed_by: SmallVec::new(),
            observed_by: SmallVec::new(),
            watchers: SmallVec::new(),
        }
    }

    /// The pointer this session belongs to.
    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    /// Where the pointer went down.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Latest known position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Whether the pointer has been released.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Drag class of the drag travelling through this pointer, if any.
    pub fn drag_class(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.class.as_str())
    }

    /// The widget being dragged by this pointer, if any.
    pub fn active_draggable(&self) -> Option<Id> {
        self.drag.as_ref().map(|d| d.draggable)
    }

    /// The drag travelling through this pointer, if any.
    pub fn drag(&self) -> Option<&PointerDrag<Id>> {
        self.drag.as_ref()
    }

    /// The first drop target that claimed this pointer's drag.
    pub fn claim(&self) -> Option<Claim<Id>> {
        self.claim
    }

    /// The claiming droppable, if any.
    pub fn accepting_droppable(&self) -> Option<Id> {
        self.claim.map(|c| c.droppable)
    }

    /// The claimed insertion index, if any.
    pub fn drop_insertion_index(&self) -> Option<usize> {
        self.claim.and_then(|c| c.index)
    }

    /// Claim the drag for `droppable` unless someone already did.
    ///
    /// Returns `true` if this call recorded the claim.
    pub(crate) fn try_claim(&mut self, droppable: Id, index: Option<usize>) -> bool {
        if self.claim.is_some() {
            return false;
        }
        self.claim = Some(Claim { droppable, index });
        true
    }

    pub(crate) fn moved_to(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn end(&mut self, position: Point) {
        self.position = position;
        self.ended = true;
    }

    pub(crate) fn begin_drag(&mut self, drag: PointerDrag<Id>) {
        self.drag = Some(drag);
        self.claim = None;
    }

    pub(crate) fn clear_drag(&mut self) {
        self.drag = None;
        self.claim = None;
    }

    /// Mark the press as seen by `draggable`; returns `false` if it already was.
    pub(crate) fn mark_pressed_by(&mut self, draggable: Id) -> bool {
        if self.pressed_by.contains(&draggable) {
            return false;
        }
        self.pressed_by.push(draggable);
        true
    }

    pub(crate) fn is_observed_by(&self, container: Id) -> bool {
        self.observed_by.contains(&container)
    }

    pub(crate) fn mark_observed_by(&mut self, container: Id) {
        if !self.observed_by.contains(&container) {
            self.observed_by.push(container);
        }
    }

    pub(crate) fn unmark_observed_by(&mut self, container: Id) {
        self.observed_by.retain(|c| *c != container);
    }

    pub(crate) fn watchers(&self) -> &[Id] {
        &self.watchers
    }

    pub(crate) fn add_watcher(&mut self, container: Id) {
        self.watchers.push(container);
    }

    pub(crate) fn remove_watcher(&mut self, container: Id) {
        self.watchers.retain(|c| *c != container);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn session() -> PointerSession<u32> {
        PointerSession::new(&PointerEvent::new(PointerId(1), Point::new(3.0, 4.0), 0))
    }

    #[test]
    fn first_claim_wins() {
        let mut s = session();
        s.begin_drag(PointerDrag {
            class: "x".to_string(),
            draggable: 7,
        });

        assert!(s.try_claim(10, None));
        assert!(!s.try_claim(11, Some(2)));
        assert_eq!(s.accepting_droppable(), Some(10));
        assert_eq!(s.drop_insertion_index(), None);
    }

    #[test]
    fn clearing_the_drag_clears_every_drag_field() {
        let mut s = session();
        s.begin_drag(PointerDrag {
            class: "x".to_string(),
            draggable: 7,
        });
        s.try_claim(10, Some(1));

        s.clear_drag();

        assert_eq!(s.drag_class(), None);
        assert_eq!(s.active_draggable(), None);
        assert_eq!(s.claim(), None);
    }

    #[test]
    fn press_marks_are_per_widget() {
        let mut s = session();
        assert!(s.mark_pressed_by(1));
        assert!(!s.mark_pressed_by(1));
        assert!(s.mark_pressed_by(2));
        assert!(!s.mark_pressed_by(2));
        assert!(s.mark_pressed_by(3));
    }
}
