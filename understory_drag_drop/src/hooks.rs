// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle hooks of a draggable.
//!
//! Every hook receives a [`DragCx`] with mutable access to the host tree and
//! a read-only view of the drag. The defaults implement the usual behavior:
//!
//! - success reparents the widget into the drop target,
//! - failure animates the widget back to where it started and restores it,
//! - cancellation restores it immediately.
//!
//! Override only what you need; the default bodies are exposed as free
//! functions ([`reparent_into_droppable`], [`snap_back`], [`restore_origin`])
//! so an override can extend them instead of starting from scratch.

use core::fmt;

use crate::error::Error;
use crate::pointer::{Claim, PointerEvent};
use crate::session::{AfterSettle, DragContext, SNAP_BACK_DURATION, Settle};
use crate::snapshot::restore_widget_state;
use crate::tree::{WidgetTree, detach};

/// Everything a lifecycle hook can see and touch.
pub struct DragCx<'a, T: WidgetTree> {
    /// The host tree.
    pub tree: &'a mut T,
    /// The dragged widget.
    pub widget: T::Id,
    /// The pointer event that caused this transition.
    pub event: &'a PointerEvent,
    /// The drag as of this transition.
    pub context: &'a DragContext<T::Id>,
    /// The drop target's claim, if any.
    pub claim: Option<Claim<T::Id>>,
    cancel_requested: bool,
}

impl<'a, T: WidgetTree> DragCx<'a, T> {
    pub(crate) fn new(
        tree: &'a mut T,
        widget: T::Id,
        event: &'a PointerEvent,
        context: &'a DragContext<T::Id>,
        claim: Option<Claim<T::Id>>,
    ) -> Self {
        Self {
            tree,
            widget,
            event,
            context,
            claim,
            cancel_requested: false,
        }
    }

    /// Where the drop target wants the widget inserted; `0` without an index.
    pub fn insertion_index(&self) -> usize {
        self.claim.and_then(|c| c.index).unwrap_or(0)
    }

    /// Ask for the drag to be cancelled once this hook returns.
    ///
    /// Honored from [`DragHooks::on_drag_start`]. After the pointer has been
    /// released the outcome is committed and the request is ignored.
    pub fn cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }
}

impl<T: WidgetTree> fmt::Debug for DragCx<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragCx")
            .field("widget", &self.widget)
            .field("event", self.event)
            .field("state", &self.context.state())
            .field("claim", &self.claim)
            .field("cancel_requested", &self.cancel_requested)
            .finish_non_exhaustive()
    }
}

/// Lifecycle hooks of a draggable widget.
pub trait DragHooks<T: WidgetTree> {
    /// The widget was lifted into the overlay.
    fn on_drag_start(&mut self, cx: &mut DragCx<'_, T>) {
        let _ = cx;
    }

    /// A drop target accepted the widget.
    fn on_drag_succeed(&mut self, cx: &mut DragCx<'_, T>) -> Result<Settle, Error> {
        reparent_into_droppable(cx)
    }

    /// Nobody accepted the widget.
    fn on_drag_fail(&mut self, cx: &mut DragCx<'_, T>) -> Result<Settle, Error> {
        Ok(snap_back(cx))
    }

    /// The drag was cancelled before it resolved.
    fn on_drag_cancel(&mut self, cx: &mut DragCx<'_, T>) -> Result<(), Error> {
        restore_origin(cx)
    }

    /// The drag is over, whatever its outcome.
    fn on_drag_end(&mut self, cx: &mut DragCx<'_, T>) {
        let _ = cx;
    }
}

/// The default hooks.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl<T: WidgetTree> DragHooks<T> for DefaultHooks {}

/// Move the widget under the claiming drop target at the claimed index.
///
/// The horizontal and vertical size hints and the positioning hints are put
/// back to their pre-drag values so the target's layout takes over again.
pub fn reparent_into_droppable<T: WidgetTree>(cx: &mut DragCx<'_, T>) -> Result<Settle, Error> {
    let Some(target) = cx.context.droppable() else {
        return Ok(Settle::Done);
    };
    if !cx.tree.is_alive(target) {
        return Err(Error::ParentGone);
    }
    let widget = cx.widget;
    detach(cx.tree, widget);
    let origin = &cx.context.origin_state().placement;
    let mut placement = cx.tree.placement(widget);
    placement.size_hint.x = origin.size_hint.x;
    placement.size_hint.y = origin.size_hint.y;
    placement.pos_hint = origin.pos_hint.clone();
    cx.tree.set_placement(widget, placement);
    let index = cx.insertion_index();
    cx.tree.insert_child(target, widget, index);
    Ok(Settle::Done)
}

/// Animate the widget back to its pre-drag window position, then restore it.
pub fn snap_back<T: WidgetTree>(cx: &DragCx<'_, T>) -> Settle {
    Settle::Animate {
        to: cx.context.origin_window_position(),
        duration: SNAP_BACK_DURATION,
        then: AfterSettle::RestoreOrigin,
    }
}

/// Restore the widget to the snapshot taken at drag start.
pub fn restore_origin<T: WidgetTree>(cx: &mut DragCx<'_, T>) -> Result<(), Error> {
    restore_widget_state(cx.tree, cx.widget, cx.context.origin_state(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::PointerId;
    use crate::session::DragState;
    use crate::snapshot::save_widget_state;
    use crate::test_tree::TestTree;
    use alloc::string::ToString;
    use kurbo::{Point, Rect};

    #[test]
    fn reparent_restores_layout_hints_and_uses_claimed_index() {
        let mut tree = TestTree::new();
        let origin = tree.spawn(Rect::new(0.0, 0.0, 100.0, 100.0));
        let target = tree.spawn(Rect::new(200.0, 0.0, 300.0, 100.0));
        tree.spawn_in(target, Rect::new(200.0, 0.0, 210.0, 10.0));
        tree.spawn_in(target, Rect::new(210.0, 0.0, 220.0, 10.0));
        let w = tree.spawn_in(origin, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut p = tree.placement(w);
        p.size_hint.x = Some(1.0);
        p.size_hint.min_y = Some(12.0);
        p.pos_hint.insert("x".to_string(), 0.25);
        tree.set_placement(w, p);

        let mut context = DragContext::new(Point::ZERO, save_widget_state(&tree, w, false));
        // Simulate the lift: hints stripped, widget in the overlay.
        crate::tree::detach(&mut tree, w);
        let mut lifted = tree.placement(w);
        lifted.size_hint.x = None;
        lifted.pos_hint.clear();
        tree.set_placement(w, lifted);
        let overlay = tree.overlay();
        tree.insert_child(overlay, w, 0);

        context.set_droppable(Some(target));
        context.set_state(DragState::Succeeded);
        let event = PointerEvent::new(PointerId(1), Point::new(250.0, 50.0), 0);
        let claim = Some(Claim {
            droppable: target,
            index: Some(1),
        });
        let mut cx = DragCx::new(&mut tree, w, &event, &context, claim);
        assert_eq!(reparent_into_droppable(&mut cx), Ok(Settle::Done));

        assert_eq!(tree.parent(w), Some(target));
        assert_eq!(tree.children(target)[1], w);
        let p = tree.placement(w);
        assert_eq!(p.size_hint.x, Some(1.0));
        assert_eq!(p.size_hint.min_y, Some(12.0));
        assert_eq!(p.pos_hint.get("x"), Some(&0.25));
    }

    #[test]
    fn snap_back_targets_the_origin_window_position() {
        let mut tree = TestTree::new();
        let w = tree.spawn(Rect::new(30.0, 40.0, 50.0, 60.0));
        let context = DragContext::new(Point::new(30.0, 40.0), save_widget_state(&tree, w, false));
        let event = PointerEvent::new(PointerId(1), Point::ZERO, 0);
        let cx = DragCx::new(&mut tree, w, &event, &context, None);

        assert_eq!(
            snap_back(&cx),
            Settle::Animate {
                to: Point::new(30.0, 40.0),
                duration: SNAP_BACK_DURATION,
                then: AfterSettle::RestoreOrigin,
            }
        );
        assert_eq!(cx.insertion_index(), 0);
    }

    #[test]
    fn cancel_is_recorded() {
        let mut tree = TestTree::new();
        let w = tree.spawn(Rect::new(0.0, 0.0, 1.0, 1.0));
        let context = DragContext::new(Point::ZERO, save_widget_state(&tree, w, false));
        let event = PointerEvent::new(PointerId(1), Point::ZERO, 0);
        let mut cx = DragCx::new(&mut tree, w, &event, &context, None);
        assert!(!cx.cancel_requested());
        cx.cancel();
        assert!(cx.cancel_requested());
    }
}
