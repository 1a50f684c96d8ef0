// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered drop targets with live placeholder feedback.
//!
//! While a drag of an accepted class hovers a reorderable container, one of
//! the container's spacers is placed among its children where the item would
//! land. The spacer follows the pointer and, on release, its index becomes
//! the drop's insertion index.
//!
//! Spacers come from a fixed [`SpacerPool`]: every configured spacer is either
//! inactive or shown for exactly one pointer, so at most `pool.len()` drags
//! can be previewed in one container at a time.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use kurbo::Point;
use smallvec::SmallVec;
use tracing::trace;

use crate::droppable::DropPolicy;
use crate::error::Error;
use crate::pointer::{PointerId, PointerSession};
use crate::snapshot::{WidgetState, restore_widget_state};
use crate::tree::{WidgetTree, index_in_parent};

/// Configuration of a reorderable container.
#[derive(Clone, Debug)]
pub struct ReorderConfig<Id> {
    /// Drag classes the container accepts.
    pub accepted_classes: HashSet<String>,
    /// Placeholder widgets. Left empty, one generic spacer is created through
    /// [`WidgetTree::create_spacer`] the first time a drag hovers the
    /// container.
    pub spacers: Vec<Id>,
}

impl<Id> ReorderConfig<Id> {
    /// Accept `accepted_classes`, with a lazily created spacer.
    pub fn new(accepted_classes: HashSet<String>) -> Self {
        Self {
            accepted_classes,
            spacers: Vec::new(),
        }
    }
}

/// Placeholder widgets of one container.
#[derive(Clone, Debug)]
pub struct SpacerPool<Id> {
    configured: Vec<Id>,
    inactive: Vec<Id>,
    active: Vec<Id>,
}

impl<Id: Copy + PartialEq> SpacerPool<Id> {
    /// A pool holding `spacers`, all inactive.
    pub fn new(spacers: Vec<Id>) -> Self {
        let inactive = spacers.iter().rev().copied().collect();
        Self {
            configured: spacers,
            inactive,
            active: Vec::new(),
        }
    }

    /// Every spacer of the pool, in configuration order.
    pub fn configured(&self) -> &[Id] {
        &self.configured
    }

    /// Spacers currently shown for a pointer.
    pub fn active(&self) -> &[Id] {
        &self.active
    }

    /// Spacers available for a new drag.
    pub fn inactive(&self) -> &[Id] {
        &self.inactive
    }

    /// Number of configured spacers.
    pub fn len(&self) -> usize {
        self.configured.len()
    }

    /// Whether no spacer is configured yet.
    pub fn is_empty(&self) -> bool {
        self.configured.is_empty()
    }

    /// Replace the configured spacers.
    ///
    /// Fails with [`Error::SpacersInUse`] while any spacer is shown.
    pub fn set(&mut self, spacers: Vec<Id>) -> Result<(), Error> {
        if !self.active.is_empty() {
            return Err(Error::SpacersInUse);
        }
        *self = Self::new(spacers);
        Ok(())
    }

    /// Take an inactive spacer, in configuration order.
    pub(crate) fn acquire(&mut self) -> Option<Id> {
        let spacer = self.inactive.pop()?;
        self.active.push(spacer);
        Some(spacer)
    }

    /// Return a shown spacer to the pool.
    pub(crate) fn release(&mut self, spacer: Id) {
        if let Some(i) = self.active.iter().position(|&s| s == spacer) {
            self.active.swap_remove(i);
            self.inactive.push(spacer);
        }
    }
}

/// The child of `container` under `point`, with its index.
///
/// Children are tested front-most first, so where siblings overlap the
/// front-most one wins.
pub fn widget_under_drag<T: WidgetTree>(
    tree: &T,
    container: T::Id,
    point: Point,
) -> Option<(T::Id, usize)> {
    tree.children(container)
        .into_iter()
        .enumerate()
        .find(|&(_, child)| tree.collides(child, point))
        .map(|(index, child)| (child, index))
}

/// Where the spacer should move to for a pointer at `point`.
///
/// `None` means "leave the spacer where it is": the pointer is over the
/// spacer itself or over a gap between children. An empty container yields
/// `Some(0)`.
pub fn insertion_index<T: WidgetTree>(
    tree: &T,
    container: T::Id,
    point: Point,
    spacer: T::Id,
) -> Option<usize> {
    if tree.children(container).is_empty() {
        return Some(0);
    }
    match widget_under_drag(tree, container, point) {
        Some((child, _)) if child == spacer => None,
        Some((_, index)) => Some(index),
        None => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Watch<Id> {
    pointer: PointerId,
    spacer: Id,
}

/// A registered reorderable container.
pub struct Reorderable<Id> {
    accepted: HashSet<String>,
    pool: SpacerPool<Id>,
    watches: SmallVec<[Watch<Id>; 2]>,
    policy: Box<dyn DropPolicy<Id>>,
    /// A generic spacer is still owed to an unconfigured pool.
    default_spacer_pending: bool,
}

impl<Id: Copy + PartialEq> Reorderable<Id> {
    pub(crate) fn new(config: ReorderConfig<Id>, policy: Box<dyn DropPolicy<Id>>) -> Self {
        Self {
            accepted: config.accepted_classes,
            default_spacer_pending: config.spacers.is_empty(),
            pool: SpacerPool::new(config.spacers),
            watches: SmallVec::new(),
            policy,
        }
    }

    /// Drag classes this container accepts.
    pub fn accepted_classes(&self) -> &HashSet<String> {
        &self.accepted
    }

    /// Whether drags of `class` may be dropped here.
    pub fn accepts_class(&self, class: &str) -> bool {
        self.accepted.contains(class)
    }

    /// The container's spacers.
    pub fn pool(&self) -> &SpacerPool<Id> {
        &self.pool
    }

    /// Replace the spacers. An explicitly emptied pool stays empty.
    pub(crate) fn set_spacers(&mut self, spacers: Vec<Id>) -> Result<(), Error> {
        self.pool.set(spacers)?;
        self.default_spacer_pending = false;
        Ok(())
    }

    pub(crate) fn policy(&self) -> &dyn DropPolicy<Id> {
        &*self.policy
    }

    /// The spacer shown for `pointer`, if this container is watching it.
    pub fn spacer_for(&self, pointer: PointerId) -> Option<Id> {
        self.watches
            .iter()
            .find(|w| w.pointer == pointer)
            .map(|w| w.spacer)
    }

    /// Pointers this container is watching.
    pub fn watched_pointers(&self) -> impl Iterator<Item = PointerId> + '_ {
        self.watches.iter().map(|w| w.pointer)
    }

    /// Give the pool its generic spacer if it was registered without any.
    ///
    /// This happens once; spacers set later are taken as they are.
    pub(crate) fn ensure_spacers<T: WidgetTree<Id = Id>>(&mut self, tree: &mut T) {
        if self.default_spacer_pending {
            self.default_spacer_pending = false;
            let spacer = tree.create_spacer();
            self.pool = SpacerPool::new(alloc::vec![spacer]);
        }
    }

    /// Show a spacer for the session's drag.
    ///
    /// The spacer takes the dragged widget's saved geometry, ignoring its
    /// containment, and goes where the item came from if it came from this
    /// container, or first otherwise. Returns `false` if the pool is drained.
    pub(crate) fn begin_watch<T: WidgetTree<Id = Id>>(
        &mut self,
        tree: &mut T,
        container: Id,
        session: &mut PointerSession<Id>,
        origin: Option<&WidgetState<Id>>,
    ) -> bool {
        let Some(spacer) = self.pool.acquire() else {
            return false;
        };
        let mut index = 0;
        if let Some(origin) = origin {
            // Ignoring containment cannot fail.
            let _ = restore_widget_state(tree, spacer, origin, true);
            if origin.parent() == Some(container) {
                index = origin.index().unwrap_or(0);
            }
        }
        crate::tree::detach(tree, spacer);
        tree.insert_child(container, spacer, index);
        self.watches.push(Watch {
            pointer: session.pointer(),
            spacer,
        });
        session.add_watcher(container);
        trace!(pointer = ?session.pointer(), index, "reorder preview started");
        true
    }

    /// Follow a pointer move. Returns `false` once the pointer left the
    /// container, in which case the watch has been torn down and the
    /// container may pick the pointer up again later.
    pub(crate) fn track<T: WidgetTree<Id = Id>>(
        &mut self,
        tree: &mut T,
        container: Id,
        session: &mut PointerSession<Id>,
    ) -> bool {
        let Some(spacer) = self.spacer_for(session.pointer()) else {
            return false;
        };
        let position = session.position();
        if !tree.collides(container, position) {
            self.finish(tree, container, session, false);
            session.unmark_observed_by(container);
            return false;
        }
        if let Some(index) = insertion_index(tree, container, position, spacer) {
            tree.remove_child(container, spacer);
            tree.insert_child(container, spacer, index);
        }
        true
    }

    /// Stop watching the session's pointer, optionally claiming its drag at
    /// the spacer's current index first.
    pub(crate) fn finish<T: WidgetTree<Id = Id>>(
        &mut self,
        tree: &mut T,
        container: Id,
        session: &mut PointerSession<Id>,
        claim: bool,
    ) {
        let pointer = session.pointer();
        let Some(i) = self.watches.iter().position(|w| w.pointer == pointer) else {
            session.remove_watcher(container);
            return;
        };
        let watch = self.watches.remove(i);
        if claim {
            let index = index_in_parent(tree, container, watch.spacer).unwrap_or(0);
            session.try_claim(container, Some(index));
        }
        crate::tree::detach(tree, watch.spacer);
        self.pool.release(watch.spacer);
        session.remove_watcher(container);
        trace!(?pointer, claim, "reorder preview ended");
    }
}

impl<Id: fmt::Debug> fmt::Debug for Reorderable<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reorderable")
            .field("accepted", &self.accepted)
            .field("pool", &self.pool)
            .field("watches", &self.watches)
            .finish_non_exhaustive()
    }
}
