// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Save and restore a widget's placement and position in the tree.
//!
//! A [`WidgetState`] is what "return to origin" means for a drag: the
//! widget's [`Placement`] plus, optionally, the parent and sibling index it
//! had. The parent is held as a plain handle and treated as a weak
//! reference: restoring through a parent that has since been destroyed fails
//! with [`Error::ParentGone`].
//!
//! Snapshots are taken when a drag starts and consumed when it fails or is
//! cancelled. Reorderable containers also apply a dragged widget's snapshot to
//! their spacer, with containment ignored, so the placeholder is sized like
//! the item it stands in for.

use crate::error::Error;
use crate::tree::{Placement, WidgetTree, detach, index_in_parent};

/// Where a widget sat in the tree when its state was saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location<Id> {
    /// Containment was not recorded; restore leaves the tree untouched.
    Ignored,
    /// The widget had no parent; restore detaches it.
    Detached,
    /// The widget was the `index`th child of `parent`.
    Attached {
        /// Non-owning handle to the parent.
        parent: Id,
        /// Position among the parent's children.
        index: usize,
    },
}

/// Restorable snapshot of a widget.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetState<Id> {
    /// Positioning and sizing attributes.
    pub placement: Placement,
    /// Tree containment.
    pub location: Location<Id>,
}

impl<Id: Copy> WidgetState<Id> {
    /// The recorded parent, if the widget was attached.
    pub fn parent(&self) -> Option<Id> {
        match self.location {
            Location::Attached { parent, .. } => Some(parent),
            _ => None,
        }
    }

    /// The recorded sibling index, if the widget was attached.
    pub fn index(&self) -> Option<usize> {
        match self.location {
            Location::Attached { index, .. } => Some(index),
            _ => None,
        }
    }
}

/// Capture `widget`'s placement and, unless `ignore_parent` is set, its
/// parent and sibling index.
///
/// A widget without a parent is a valid state and is recorded as
/// [`Location::Detached`].
pub fn save_widget_state<T: WidgetTree>(
    tree: &T,
    widget: T::Id,
    ignore_parent: bool,
) -> WidgetState<T::Id> {
    let placement = tree.placement(widget);
    let location = if ignore_parent {
        Location::Ignored
    } else {
        match tree.parent(widget) {
            None => Location::Detached,
            Some(parent) => Location::Attached {
                parent,
                index: index_in_parent(tree, parent, widget).unwrap_or(0),
            },
        }
    };
    WidgetState {
        placement,
        location,
    }
}

/// Apply `state` to `widget`.
///
/// The placement is always applied. Unless `ignore_parent` is set or the
/// state did not record containment, the widget is then detached from its
/// current parent and reinserted where it was recorded.
///
/// Returns [`Error::ParentGone`] if the recorded parent has been destroyed; in
/// that case the widget's containment is left as it was.
pub fn restore_widget_state<T: WidgetTree>(
    tree: &mut T,
    widget: T::Id,
    state: &WidgetState<T::Id>,
    ignore_parent: bool,
) -> Result<(), Error> {
    tree.set_placement(widget, state.placement.clone());
    if ignore_parent {
        return Ok(());
    }
    match state.location {
        Location::Ignored => Ok(()),
        Location::Detached => {
            detach(tree, widget);
            Ok(())
        }
        Location::Attached { parent, index } => {
            if !tree.is_alive(parent) {
                return Err(Error::ParentGone);
            }
            detach(tree, widget);
            tree.insert_child(parent, widget, index);
            Ok(())
        }
    }
}
