// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One drag, from lift-off to settle.
//!
//! ```text
//!            start                move              release
//!   idle ──────────► Started ──────────► Tracking ──────────► Resolving
//!                       │                   │                    │
//!                       └──── cancel ───────┴──► Cancelled       ├──► Succeeded ─┐
//!                                                    │           └──► Failed ────┤
//!                                                    ▼                           ▼
//!                                                  ended ◄──── settle done ── (settling)
//! ```
//!
//! The session itself only records where the drag is; the transitions are
//! driven by [`DragDrop`](crate::DragDrop), which owns every session.

use core::time::Duration;

use kurbo::Point;

use crate::pointer::{PointerEvent, PointerId};
use crate::snapshot::WidgetState;
use crate::tracking::DragAnchor;

/// How long the default snap-back animation of a failed drag takes.
pub const SNAP_BACK_DURATION: Duration = Duration::from_millis(100);

/// Lifecycle state of a drag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragState {
    /// The widget was lifted into the overlay; no move seen yet.
    Started,
    /// The widget follows the pointer.
    Tracking,
    /// The pointer was released and drop targets are being consulted.
    Resolving,
    /// A drop target accepted the drag.
    Succeeded,
    /// Nobody accepted the drag.
    Failed,
    /// The drag was cancelled before it resolved.
    Cancelled,
}

impl DragState {
    /// Whether the drag can still be cancelled.
    ///
    /// Once resolution has started, the outcome is committed and the session
    /// only waits for its settle to finish.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Started | Self::Tracking)
    }
}

/// Read-only view of a drag, handed to lifecycle hooks and drop policies.
#[derive(Clone, Debug, PartialEq)]
pub struct DragContext<Id> {
    origin_window_position: Point,
    origin_state: WidgetState<Id>,
    droppable: Option<Id>,
    state: DragState,
}

impl<Id: Copy> DragContext<Id> {
    pub(crate) fn new(origin_window_position: Point, origin_state: WidgetState<Id>) -> Self {
        Self {
            origin_window_position,
            origin_state,
            droppable: None,
            state: DragState::Started,
        }
    }

    /// Window position of the widget when the drag started.
    pub fn origin_window_position(&self) -> Point {
        self.origin_window_position
    }

    /// Snapshot of the widget taken when the drag started.
    pub fn origin_state(&self) -> &WidgetState<Id> {
        &self.origin_state
    }

    /// The drop target consulted at release.
    ///
    /// Always `None` while started or cancelled, always set when succeeded,
    /// and set on failure only if a target claimed the drop but rejected it.
    pub fn droppable(&self) -> Option<Id> {
        self.droppable
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DragState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: DragState) {
        self.state = state;
    }

    pub(crate) fn set_droppable(&mut self, droppable: Option<Id>) {
        self.droppable = droppable;
    }
}

/// What to do once a settle animation completes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AfterSettle {
    /// Nothing further.
    Nothing,
    /// Restore the snapshot taken at drag start.
    RestoreOrigin,
}

/// How a succeed or fail hook finishes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Settle {
    /// Finished synchronously; the drag ends right away.
    Done,
    /// Animate the widget to `to`, then apply `then` and end the drag.
    Animate {
        /// Window-space destination.
        to: Point,
        /// Animation length.
        duration: Duration,
        /// Follow-up once the host reports the animation finished.
        then: AfterSettle,
    },
    /// The hook started work of its own; the drag ends when the host calls
    /// [`DragDrop::finish_settle`](crate::DragDrop::finish_settle).
    Pending,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Settling {
    Animation(AfterSettle),
    External,
}

#[derive(Clone, Debug)]
pub(crate) struct DragSession<Id> {
    pub(crate) pointer: PointerId,
    pub(crate) context: DragContext<Id>,
    pub(crate) anchor: DragAnchor,
    pub(crate) last_event: PointerEvent,
    pub(crate) settling: Option<Settling>,
}

impl<Id: Copy> DragSession<Id> {
    pub(crate) fn new(
        pointer: PointerId,
        context: DragContext<Id>,
        anchor: DragAnchor,
        event: PointerEvent,
    ) -> Self {
        Self {
            pointer,
            context,
            anchor,
            last_event: event,
            settling: None,
        }
    }

    /// Follow a pointer move, returning the widget's new window position.
    pub(crate) fn track(&mut self, event: &PointerEvent) -> Point {
        self.last_event = *event;
        self.context.set_state(DragState::Tracking);
        self.anchor.widget_position(event.position)
    }
}
