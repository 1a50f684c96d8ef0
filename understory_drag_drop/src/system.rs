// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The coordinator tying pointers, drags and drop targets together.
//!
//! [`DragDrop`] owns every role registration and every piece of in-flight
//! state. The host feeds it pointer events in its own dispatch order and
//! drives time forward with [`DragDrop::tick`]; the coordinator mutates the
//! host tree through [`WidgetTree`] and reports presses that turned out not
//! to be drags as [`Signal`]s.
//!
//! ## Release ordering
//!
//! When a pointer is released, every drop target under it gets to claim the
//! drag first and only then does the drag read the claim and resolve. This
//! holds regardless of where the dragged widget sits in `hits`.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use kurbo::Point;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::droppable::{DropPolicy, Droppable};
use crate::error::Error;
use crate::gesture::{GestureClassifier, GestureConfig, Verdict};
use crate::hooks::{DefaultHooks, DragCx, DragHooks};
use crate::pointer::{PointerDrag, PointerEvent, PointerId, PointerSession};
use crate::reorderable::{ReorderConfig, Reorderable, SpacerPool};
use crate::session::{AfterSettle, DragContext, DragSession, DragState, Settle, Settling};
use crate::snapshot::{restore_widget_state, save_widget_state};
use crate::tracking::DragAnchor;
use crate::tree::{WidgetTree, detach};

/// Delay between a replayed press and its replayed release, in milliseconds.
pub const REPLAY_RELEASE_DELAY_MS: u64 = 100;

/// Configuration of a draggable widget.
#[derive(Clone, Debug, PartialEq)]
pub struct DragConfig {
    /// Class matched against drop targets' accepted classes.
    pub drag_class: String,
    /// Press classification settings.
    pub gesture: GestureConfig,
    /// Whether new presses may start a drag. Ongoing drags are unaffected.
    pub enabled: bool,
}

impl DragConfig {
    /// An enabled draggable of `drag_class` with default gesture settings.
    pub fn new(drag_class: impl Into<String>) -> Self {
        Self {
            drag_class: drag_class.into(),
            ..Self::default()
        }
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_class: String::new(),
            gesture: GestureConfig::default(),
            enabled: true,
        }
    }
}

/// Presses handed back to the host's ordinary input handling.
///
/// A press on a draggable is held back while it is being classified. If it
/// turns out not to be a drag, the host should deliver it again, bypassing
/// the drag layer, to `widget`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal<Id> {
    /// Deliver a press at `position`.
    ReplayPress {
        /// The pointer that pressed.
        pointer: PointerId,
        /// The draggable that held the press back.
        widget: Id,
        /// Window-space position of the original press.
        position: Point,
    },
    /// Deliver a release at `position`.
    ///
    /// Follows its press by [`REPLAY_RELEASE_DELAY_MS`], so the pressed state
    /// is visible for a moment.
    ReplayRelease {
        /// The pointer that was released.
        pointer: PointerId,
        /// The draggable that held the press back.
        widget: Id,
        /// Window-space position of the release.
        position: Point,
    },
}

struct Draggable<T: WidgetTree> {
    config: DragConfig,
    hooks: Box<dyn DragHooks<T>>,
}

#[derive(Clone, Copy, Debug)]
struct Press<Id> {
    widget: Id,
    classifier: GestureClassifier,
}

#[derive(Clone, Copy, Debug)]
struct PendingRelease<Id> {
    at: u64,
    pointer: PointerId,
    widget: Id,
    position: Point,
}

/// Drag-and-drop coordinator for one host tree.
pub struct DragDrop<T: WidgetTree> {
    pointers: HashMap<PointerId, PointerSession<T::Id>>,
    draggables: HashMap<T::Id, Draggable<T>>,
    droppables: HashMap<T::Id, Droppable<T::Id>>,
    reorderables: HashMap<T::Id, Reorderable<T::Id>>,
    drags: HashMap<T::Id, DragSession<T::Id>>,
    presses: HashMap<PointerId, Press<T::Id>>,
    releases: Vec<PendingRelease<T::Id>>,
    signals: Vec<Signal<T::Id>>,
}

impl<T: WidgetTree> Default for DragDrop<T> {
    fn default() -> Self {
        Self {
            pointers: HashMap::new(),
            draggables: HashMap::new(),
            droppables: HashMap::new(),
            reorderables: HashMap::new(),
            drags: HashMap::new(),
            presses: HashMap::new(),
            releases: Vec::new(),
            signals: Vec::new(),
        }
    }
}

impl<T: WidgetTree> fmt::Debug for DragDrop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDrop")
            .field("pointers", &self.pointers.len())
            .field("draggables", &self.draggables.len())
            .field("droppables", &self.droppables.len())
            .field("reorderables", &self.reorderables.len())
            .field("drags", &self.drags.len())
            .field("presses", &self.presses.len())
            .field("pending_releases", &self.releases.len())
            .finish_non_exhaustive()
    }
}

impl<T: WidgetTree> DragDrop<T> {
    /// An empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    // --- registration ---

    /// Make `widget` draggable. Re-registering replaces config and hooks.
    pub fn add_draggable(
        &mut self,
        widget: T::Id,
        config: DragConfig,
        hooks: impl DragHooks<T> + 'static,
    ) {
        self.draggables.insert(
            widget,
            Draggable {
                config,
                hooks: Box::new(hooks),
            },
        );
    }

    /// Stop treating `widget` as draggable, cancelling its drag if any.
    pub fn remove_draggable(&mut self, tree: &mut T, widget: T::Id) -> Result<(), Error> {
        if !self.draggables.contains_key(&widget) {
            return Err(Error::NotRegistered);
        }
        let result = self.supersede(tree, widget);
        self.presses.retain(|_, press| press.widget != widget);
        self.draggables.remove(&widget);
        result
    }

    /// Allow or forbid new drags of `widget`.
    pub fn set_drag_enabled(&mut self, widget: T::Id, enabled: bool) -> Result<(), Error> {
        let draggable = self
            .draggables
            .get_mut(&widget)
            .ok_or(Error::NotRegistered)?;
        draggable.config.enabled = enabled;
        Ok(())
    }

    /// Configuration of a draggable.
    pub fn drag_config(&self, widget: T::Id) -> Option<&DragConfig> {
        self.draggables.get(&widget).map(|d| &d.config)
    }

    /// Make `widget` a drop target for drags of the `accepted` classes.
    pub fn add_droppable(
        &mut self,
        widget: T::Id,
        accepted: HashSet<String>,
        policy: impl DropPolicy<T::Id> + 'static,
    ) {
        self.droppables
            .insert(widget, Droppable::new(accepted, Box::new(policy)));
    }

    /// Stop treating `widget` as a drop target.
    pub fn remove_droppable(&mut self, widget: T::Id) -> Result<(), Error> {
        self.droppables
            .remove(&widget)
            .map(drop)
            .ok_or(Error::NotRegistered)
    }

    /// Make `container` a reorderable drop target.
    pub fn add_reorderable(
        &mut self,
        container: T::Id,
        config: ReorderConfig<T::Id>,
        policy: impl DropPolicy<T::Id> + 'static,
    ) {
        self.reorderables
            .insert(container, Reorderable::new(config, Box::new(policy)));
    }

    /// Stop treating `container` as reorderable, taking down its spacers.
    pub fn remove_reorderable(&mut self, tree: &mut T, container: T::Id) -> Result<(), Error> {
        let mut role = self
            .reorderables
            .remove(&container)
            .ok_or(Error::NotRegistered)?;
        let watched: SmallVec<[PointerId; 2]> = role.watched_pointers().collect();
        for pointer in watched {
            if let Some(session) = self.pointers.get_mut(&pointer) {
                role.finish(tree, container, session, false);
                session.unmark_observed_by(container);
            }
        }
        Ok(())
    }

    /// Replace the spacers of `container`.
    ///
    /// Fails with [`Error::SpacersInUse`] while a spacer is shown. An empty
    /// list leaves the container without spacers, so it stops previewing and
    /// claiming drops.
    pub fn set_spacers(&mut self, container: T::Id, spacers: Vec<T::Id>) -> Result<(), Error> {
        self.reorderables
            .get_mut(&container)
            .ok_or(Error::NotRegistered)?
            .set_spacers(spacers)
    }

    // --- queries ---

    /// Whether `widget` has a drag in progress, including one that is
    /// settling.
    pub fn is_being_dragged(&self, widget: T::Id) -> bool {
        self.drags.contains_key(&widget)
    }

    /// Lifecycle state of `widget`'s drag.
    pub fn drag_state(&self, widget: T::Id) -> Option<DragState> {
        self.drags.get(&widget).map(|d| d.context.state())
    }

    /// Context of `widget`'s drag.
    pub fn drag_context(&self, widget: T::Id) -> Option<&DragContext<T::Id>> {
        self.drags.get(&widget).map(|d| &d.context)
    }

    /// Shared session of a pointer.
    pub fn pointer_session(&self, pointer: PointerId) -> Option<&PointerSession<T::Id>> {
        self.pointers.get(&pointer)
    }

    /// Whether a press of `pointer` is still being classified.
    pub fn is_classifying(&self, pointer: PointerId) -> bool {
        self.presses.contains_key(&pointer)
    }

    /// A registered drop target.
    pub fn droppable(&self, widget: T::Id) -> Option<&Droppable<T::Id>> {
        self.droppables.get(&widget)
    }

    /// A registered reorderable container.
    pub fn reorderable(&self, container: T::Id) -> Option<&Reorderable<T::Id>> {
        self.reorderables.get(&container)
    }

    /// Spacers of a reorderable container.
    pub fn spacer_pool(&self, container: T::Id) -> Option<&SpacerPool<T::Id>> {
        self.reorderables.get(&container).map(Reorderable::pool)
    }

    /// Earliest host time at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        let presses = self.presses.values().map(|p| p.classifier.deadline());
        let releases = self.releases.iter().map(|r| r.at);
        presses.chain(releases).min()
    }

    /// Drain the signals emitted so far.
    pub fn take_signals(&mut self) -> Vec<Signal<T::Id>> {
        core::mem::take(&mut self.signals)
    }

    // --- input ---

    /// Feed a pointer press.
    ///
    /// `hits` lists the widgets under the pointer in the host's dispatch
    /// order. The first draggable that is eligible takes the press: either
    /// it starts a drag right away (zero timeout) or it starts classifying.
    /// Returns `true` if the press was taken.
    pub fn pointer_down(
        &mut self,
        tree: &mut T,
        event: &PointerEvent,
        hits: &[T::Id],
    ) -> Result<bool, Error> {
        if self
            .pointers
            .get(&event.pointer)
            .is_none_or(PointerSession::is_ended)
        {
            self.pointers
                .insert(event.pointer, PointerSession::new(event));
        }
        let Some(session) = self.pointers.get_mut(&event.pointer) else {
            return Ok(false);
        };

        let mut taken = None;
        for &widget in hits {
            let Some(draggable) = self.draggables.get(&widget) else {
                continue;
            };
            let eligible = !event.is_scroll
                && draggable.config.enabled
                && !self.drags.contains_key(&widget)
                && tree.collides(widget, session.origin());
            // Every draggable marks the press, eligible or not.
            if session.mark_pressed_by(widget) && eligible {
                taken = Some((widget, draggable.config.gesture));
                break;
            }
        }
        let Some((widget, gesture)) = taken else {
            return Ok(false);
        };

        if gesture.is_immediate() {
            self.start_drag(tree, widget, event, false)?;
        } else {
            trace!(?widget, pointer = ?event.pointer, "classifying press");
            self.presses.insert(
                event.pointer,
                Press {
                    widget,
                    classifier: GestureClassifier::new(gesture, event.position, event.time),
                },
            );
        }
        Ok(true)
    }

    /// Feed a pointer move.
    ///
    /// Returns `true` if the move belonged to a press being classified or to
    /// an active drag.
    pub fn pointer_move(
        &mut self,
        tree: &mut T,
        event: &PointerEvent,
        hits: &[T::Id],
    ) -> Result<bool, Error> {
        let pointer = event.pointer;
        let Some(session) = self.pointers.get_mut(&pointer) else {
            return Ok(false);
        };
        if session.is_ended() {
            return Ok(false);
        }
        session.moved_to(event.position);

        let mut consumed = false;
        let mut result = Ok(());
        if let Some(press) = self.presses.get_mut(&pointer) {
            consumed = true;
            let widget = press.widget;
            let origin = press.classifier.origin();
            match press.classifier.on_move(event.position, event.time) {
                Verdict::Pending => {}
                Verdict::Drag => {
                    self.presses.remove(&pointer);
                    result = self.promote(tree, widget, event);
                }
                Verdict::Ordinary { .. } => {
                    self.presses.remove(&pointer);
                    self.replay_press(pointer, widget, origin);
                }
            }
        }

        if let Some(widget) = self
            .pointers
            .get(&pointer)
            .and_then(PointerSession::active_draggable)
            && let Some(drag) = self.drags.get_mut(&widget)
            && drag.pointer == pointer
            && drag.context.state().is_cancellable()
        {
            let pos = drag.track(event);
            let mut placement = tree.placement(widget);
            placement.pos = pos;
            tree.set_placement(widget, placement);
            trace!(?widget, x = pos.x, y = pos.y, "drag moved");
            consumed = true;
        }

        self.track_reorder(tree, event, hits);
        result.map(|()| consumed)
    }

    /// Feed a pointer release.
    ///
    /// Drop targets in `hits` claim the drag before it resolves. Returns
    /// `true` if the release belonged to a press being classified or to an
    /// active drag.
    pub fn pointer_up(
        &mut self,
        tree: &mut T,
        event: &PointerEvent,
        hits: &[T::Id],
    ) -> Result<bool, Error> {
        let pointer = event.pointer;
        let Some(session) = self.pointers.get_mut(&pointer) else {
            return Ok(false);
        };
        if session.is_ended() {
            return Ok(false);
        }
        session.end(event.position);

        let mut consumed = false;
        let mut result = Ok(());
        if let Some(mut press) = self.presses.remove(&pointer) {
            consumed = true;
            match press.classifier.on_up(event.time) {
                Verdict::Drag => result = self.promote(tree, press.widget, event),
                Verdict::Ordinary { .. } | Verdict::Pending => {
                    self.replay_press(pointer, press.widget, press.classifier.origin());
                    self.schedule_release(pointer, press.widget, event);
                }
            }
        }

        self.collect_claims(tree, pointer, hits);

        if let Some(widget) = self
            .pointers
            .get(&pointer)
            .and_then(PointerSession::active_draggable)
            && self
                .drags
                .get(&widget)
                .is_some_and(|d| d.pointer == pointer && d.context.state().is_cancellable())
        {
            consumed = true;
            let resolved = self.resolve(tree, widget, event);
            if result.is_ok() {
                result = resolved;
            }
        }

        self.release_pointer_if_idle(pointer);
        result.map(|()| consumed)
    }

    /// Advance the host clock.
    ///
    /// Presses held past their timeout become drags, and replayed releases
    /// that are due are emitted.
    pub fn tick(&mut self, tree: &mut T, now: u64) -> Result<(), Error> {
        let mut due: Vec<(PointerId, T::Id)> = self
            .presses
            .iter_mut()
            .filter_map(|(&pointer, press)| {
                (press.classifier.on_tick(now) == Verdict::Drag).then_some((pointer, press.widget))
            })
            .collect();
        due.sort_unstable_by_key(|&(pointer, _)| pointer);

        let mut result = Ok(());
        for (pointer, widget) in due {
            self.presses.remove(&pointer);
            let Some(position) = self.pointers.get(&pointer).map(PointerSession::position) else {
                continue;
            };
            let started = self.promote(tree, widget, &PointerEvent::new(pointer, position, now));
            if result.is_ok() {
                result = started;
            }
        }

        let mut fired = Vec::new();
        self.releases.retain(|release| {
            if release.at <= now {
                fired.push(*release);
                false
            } else {
                true
            }
        });
        for release in fired {
            trace!(widget = ?release.widget, "replaying release");
            self.signals.push(Signal::ReplayRelease {
                pointer: release.pointer,
                widget: release.widget,
                position: release.position,
            });
            self.release_pointer_if_idle(release.pointer);
        }
        result
    }

    // --- drag control ---

    /// Start dragging `widget` with a pointer that was pressed on `receiver`.
    ///
    /// `widget` must be a registered draggable that is not in the tree yet;
    /// it is centered under the pointer's press position. Does nothing if the
    /// pointer was already released.
    pub fn start_dragging_from_others_pointer(
        &mut self,
        tree: &mut T,
        widget: T::Id,
        receiver: T::Id,
        event: &PointerEvent,
    ) -> Result<(), Error> {
        if !self.draggables.contains_key(&widget) {
            return Err(Error::NotRegistered);
        }
        if tree.parent(widget).is_some() {
            return Err(Error::AlreadyParented);
        }
        let session = self
            .pointers
            .entry(event.pointer)
            .or_insert_with(|| PointerSession::new(event));
        if session.is_ended() {
            trace!(?widget, "pointer already released, hand-over skipped");
            return Ok(());
        }
        session.moved_to(event.position);
        session.mark_pressed_by(widget);
        if self
            .presses
            .get(&event.pointer)
            .is_some_and(|p| p.widget == receiver)
        {
            self.presses.remove(&event.pointer);
        }
        debug!(?widget, ?receiver, "drag handed over");
        self.start_drag(tree, widget, event, true)
    }

    /// Cancel `widget`'s drag.
    ///
    /// Does nothing without a drag. Once the pointer was released the
    /// outcome is committed and the request is ignored.
    pub fn cancel(&mut self, tree: &mut T, widget: T::Id) -> Result<(), Error> {
        let Some(drag) = self.drags.get_mut(&widget) else {
            return Ok(());
        };
        let state = drag.context.state();
        if !state.is_cancellable() {
            debug!(?widget, ?state, "cancel ignored, drag already resolved");
            return Ok(());
        }
        drag.context.set_state(DragState::Cancelled);
        debug!(?widget, "drag cancelled");
        let result = self
            .run_hook(tree, widget, |hooks, cx| hooks.on_drag_cancel(cx))
            .map_or(Ok(()), |(r, _)| r);
        if let Err(err) = &result {
            warn!(?widget, %err, "cancel hook failed");
            self.recover(tree, widget);
        }
        self.end(tree, widget);
        result
    }

    /// Report that the settle animation of `widget` finished.
    pub fn animation_finished(&mut self, tree: &mut T, widget: T::Id) -> Result<(), Error> {
        let Some(drag) = self.drags.get(&widget) else {
            return Ok(());
        };
        let Some(Settling::Animation(then)) = drag.settling else {
            trace!(?widget, "no settle animation awaited");
            return Ok(());
        };
        let result = match then {
            AfterSettle::Nothing => Ok(()),
            AfterSettle::RestoreOrigin => {
                restore_widget_state(tree, widget, drag.context.origin_state(), false)
            }
        };
        if let Err(err) = &result {
            warn!(?widget, %err, "restoring after settle failed");
        }
        self.end(tree, widget);
        result
    }

    /// Report that the work started by a hook returning
    /// [`Settle::Pending`] is done.
    pub fn finish_settle(&mut self, tree: &mut T, widget: T::Id) -> Result<(), Error> {
        match self.drags.get(&widget).and_then(|d| d.settling) {
            Some(Settling::External) => {
                self.end(tree, widget);
                Ok(())
            }
            Some(Settling::Animation(_)) => self.animation_finished(tree, widget),
            None => Ok(()),
        }
    }

    /// Cancel every drag currently lifted into the overlay.
    ///
    /// Drags that are already settling are left to finish.
    pub fn cancel_ongoing_drags(&mut self, tree: &mut T) -> Result<(), Error> {
        let overlay = tree.overlay();
        let mut result = Ok(());
        for widget in crate::registry::ongoing_drags(&*tree, self, overlay) {
            let cancelled = self.cancel(tree, widget);
            if result.is_ok() {
                result = cancelled;
            }
        }
        result
    }

    // --- internals ---

    fn start_drag(
        &mut self,
        tree: &mut T,
        widget: T::Id,
        event: &PointerEvent,
        centered: bool,
    ) -> Result<(), Error> {
        self.supersede(tree, widget)?;
        // One drag per pointer: a hand-over replaces the pointer's current drag.
        if let Some(other) = self
            .pointers
            .get(&event.pointer)
            .and_then(PointerSession::active_draggable)
            && other != widget
        {
            debug!(?other, ?widget, "pointer drag replaced");
            self.supersede(tree, other)?;
        }
        let Some(draggable) = self.draggables.get(&widget) else {
            return Err(Error::NotRegistered);
        };
        let Some(session) = self.pointers.get_mut(&event.pointer) else {
            return Err(Error::UnknownPointer);
        };

        let origin_state = save_widget_state(tree, widget, false);
        let anchor = if centered {
            DragAnchor::centered(session.origin(), origin_state.placement.size)
        } else {
            DragAnchor::grab(session.origin(), tree.window_position(widget))
        };

        detach(tree, widget);
        let mut placement = origin_state.placement.clone();
        placement.size_hint.x = None;
        placement.size_hint.y = None;
        placement.pos_hint.clear();
        placement.pos = anchor.widget_position(session.position());
        tree.set_placement(widget, placement);
        let overlay = tree.overlay();
        tree.insert_child(overlay, widget, 0);

        session.begin_drag(PointerDrag {
            class: draggable.config.drag_class.clone(),
            draggable: widget,
        });
        let context = DragContext::new(anchor.origin_widget_position(), origin_state);
        self.drags.insert(
            widget,
            DragSession::new(event.pointer, context, anchor, *event),
        );
        debug!(?widget, pointer = ?event.pointer, "drag started");

        let cancel = self
            .run_hook(tree, widget, |hooks, cx| hooks.on_drag_start(cx))
            .is_some_and(|((), cancel)| cancel);
        if cancel {
            self.cancel(tree, widget)?;
        }
        Ok(())
    }

    /// A press was classified as a drag.
    fn promote(&mut self, tree: &mut T, widget: T::Id, event: &PointerEvent) -> Result<(), Error> {
        let enabled = self.draggables.get(&widget).is_some_and(|d| d.config.enabled);
        if enabled && !self.drags.contains_key(&widget) {
            return self.start_drag(tree, widget, event, false);
        }
        let session = self.pointers.get(&event.pointer);
        let origin = session.map_or(event.position, PointerSession::origin);
        let ended = session.is_some_and(PointerSession::is_ended);
        self.replay_press(event.pointer, widget, origin);
        if ended {
            self.schedule_release(event.pointer, widget, event);
        }
        Ok(())
    }

    /// End a drag that is in the way of a new one on the same widget.
    fn supersede(&mut self, tree: &mut T, widget: T::Id) -> Result<(), Error> {
        let Some(drag) = self.drags.get(&widget) else {
            return Ok(());
        };
        if drag.context.state().is_cancellable() {
            self.cancel(tree, widget)
        } else {
            debug!(?widget, "settling drag superseded");
            self.end(tree, widget);
            Ok(())
        }
    }

    fn resolve(&mut self, tree: &mut T, widget: T::Id, event: &PointerEvent) -> Result<(), Error> {
        let Some(drag) = self.drags.get_mut(&widget) else {
            return Ok(());
        };
        drag.last_event = *event;
        drag.context.set_state(DragState::Resolving);
        let claim = self
            .pointers
            .get(&drag.pointer)
            .and_then(PointerSession::claim);
        drag.context.set_droppable(claim.map(|c| c.droppable));

        let accepted = claim.is_some_and(|c| {
            let policy = self
                .droppables
                .get(&c.droppable)
                .map(|d| d.policy())
                .or_else(|| self.reorderables.get(&c.droppable).map(|r| r.policy()));
            policy.is_some_and(|p| p.accepts_drag(event, &drag.context, widget))
        });
        let state = if accepted {
            DragState::Succeeded
        } else {
            DragState::Failed
        };
        drag.context.set_state(state);
        debug!(?widget, ?state, droppable = ?claim.map(|c| c.droppable), "drag resolved");

        let outcome = self
            .run_hook(tree, widget, |hooks, cx| {
                if accepted {
                    hooks.on_drag_succeed(cx)
                } else {
                    hooks.on_drag_fail(cx)
                }
            })
            .map_or(Ok(Settle::Done), |(outcome, cancel)| {
                if cancel {
                    debug!(?widget, "cancel ignored, drag already resolved");
                }
                outcome
            });
        self.settle(tree, widget, outcome)
    }

    fn settle(
        &mut self,
        tree: &mut T,
        widget: T::Id,
        outcome: Result<Settle, Error>,
    ) -> Result<(), Error> {
        match outcome {
            Ok(Settle::Done) => {
                self.end(tree, widget);
                Ok(())
            }
            Ok(Settle::Animate { to, duration, then }) => {
                if let Some(drag) = self.drags.get_mut(&widget) {
                    drag.settling = Some(Settling::Animation(then));
                }
                tree.animate_position(widget, to, duration);
                Ok(())
            }
            Ok(Settle::Pending) => {
                if let Some(drag) = self.drags.get_mut(&widget) {
                    drag.settling = Some(Settling::External);
                }
                Ok(())
            }
            Err(err) => {
                warn!(?widget, %err, "drag hook failed");
                self.recover(tree, widget);
                self.end(tree, widget);
                Err(err)
            }
        }
    }

    /// Best-effort return to the origin after a failed hook.
    fn recover(&self, tree: &mut T, widget: T::Id) {
        if let Some(drag) = self.drags.get(&widget)
            && let Err(err) = restore_widget_state(tree, widget, drag.context.origin_state(), false)
        {
            warn!(?widget, %err, "could not restore dragged widget");
        }
    }

    fn end(&mut self, tree: &mut T, widget: T::Id) {
        self.run_hook(tree, widget, |hooks, cx| hooks.on_drag_end(cx));
        let Some(drag) = self.drags.remove(&widget) else {
            return;
        };
        let pointer = drag.pointer;
        let owns_pointer = self
            .pointers
            .get(&pointer)
            .is_some_and(|s| s.active_draggable() == Some(widget));
        if owns_pointer {
            self.stop_watching(tree, pointer);
            if let Some(session) = self.pointers.get_mut(&pointer) {
                session.clear_drag();
            }
        }
        debug!(?widget, state = ?drag.context.state(), "drag ended");
        self.release_pointer_if_idle(pointer);
    }

    fn run_hook<R>(
        &mut self,
        tree: &mut T,
        widget: T::Id,
        f: impl FnOnce(&mut dyn DragHooks<T>, &mut DragCx<'_, T>) -> R,
    ) -> Option<(R, bool)> {
        let drag = self.drags.get(&widget)?;
        let claim = self
            .pointers
            .get(&drag.pointer)
            .and_then(PointerSession::claim);
        let mut fallback = DefaultHooks;
        let hooks: &mut dyn DragHooks<T> = match self.draggables.get_mut(&widget) {
            Some(draggable) => draggable.hooks.as_mut(),
            None => &mut fallback,
        };
        let mut cx = DragCx::new(tree, widget, &drag.last_event, &drag.context, claim);
        let out = f(hooks, &mut cx);
        Some((out, cx.cancel_requested()))
    }

    fn collect_claims(&mut self, tree: &mut T, pointer: PointerId, hits: &[T::Id]) {
        let Some(session) = self.pointers.get_mut(&pointer) else {
            return;
        };
        if session.drag().is_none() {
            return;
        }
        for &target in hits {
            if let Some(droppable) = self.droppables.get(&target) {
                droppable.offer(&*tree, target, session);
            }
            if session.watchers().contains(&target)
                && let Some(role) = self.reorderables.get_mut(&target)
            {
                role.finish(tree, target, session, true);
            }
        }
        // Containers the pointer still hovers but the host did not list.
        let rest: SmallVec<[T::Id; 2]> = session.watchers().iter().copied().collect();
        for container in rest {
            match self.reorderables.get_mut(&container) {
                Some(role) => role.finish(tree, container, session, true),
                None => session.remove_watcher(container),
            }
        }
        if let Some(claim) = session.claim() {
            trace!(droppable = ?claim.droppable, index = ?claim.index, "drop claimed");
        }
    }

    fn track_reorder(&mut self, tree: &mut T, event: &PointerEvent, hits: &[T::Id]) {
        let Some(session) = self.pointers.get_mut(&event.pointer) else {
            return;
        };
        let watching: SmallVec<[T::Id; 2]> = session.watchers().iter().copied().collect();
        for container in watching {
            match self.reorderables.get_mut(&container) {
                Some(role) => {
                    role.track(tree, container, session);
                }
                None => session.remove_watcher(container),
            }
        }

        let Some(drag) = session.drag() else {
            return;
        };
        let class = drag.class.clone();
        let origin = self
            .drags
            .get(&drag.draggable)
            .map(|d| d.context.origin_state());
        for &container in hits {
            let Some(role) = self.reorderables.get_mut(&container) else {
                continue;
            };
            if session.is_observed_by(container) || !tree.collides(container, event.position) {
                continue;
            }
            role.ensure_spacers(tree);
            if role.pool().inactive().is_empty() {
                continue;
            }
            session.mark_observed_by(container);
            if role.accepts_class(&class) {
                role.begin_watch(tree, container, session, origin);
            }
        }
    }

    fn stop_watching(&mut self, tree: &mut T, pointer: PointerId) {
        let Some(session) = self.pointers.get_mut(&pointer) else {
            return;
        };
        let watching: SmallVec<[T::Id; 2]> = session.watchers().iter().copied().collect();
        for container in watching {
            match self.reorderables.get_mut(&container) {
                Some(role) => role.finish(tree, container, session, false),
                None => session.remove_watcher(container),
            }
        }
    }

    fn replay_press(&mut self, pointer: PointerId, widget: T::Id, position: Point) {
        trace!(?widget, ?pointer, "replaying press");
        self.signals.push(Signal::ReplayPress {
            pointer,
            widget,
            position,
        });
    }

    fn schedule_release(&mut self, pointer: PointerId, widget: T::Id, event: &PointerEvent) {
        self.releases.push(PendingRelease {
            at: event.time.saturating_add(REPLAY_RELEASE_DELAY_MS),
            pointer,
            widget,
            position: event.position,
        });
    }

    /// Forget a released pointer once nothing refers to it any more.
    fn release_pointer_if_idle(&mut self, pointer: PointerId) {
        let idle = self
            .pointers
            .get(&pointer)
            .is_some_and(|s| s.is_ended() && s.drag().is_none())
            && !self.presses.contains_key(&pointer)
            && !self.releases.iter().any(|r| r.pointer == pointer);
        if idle {
            self.pointers.remove(&pointer);
        }
    }
}
