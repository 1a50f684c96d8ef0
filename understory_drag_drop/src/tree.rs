// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host widget tree as seen by the drag-and-drop layer.
//!
//! This crate never owns widgets. Containment, coordinate spaces, hit testing
//! and animation all belong to the host; [`WidgetTree`] is the narrow surface
//! the state machines need from it.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;
use core::time::Duration;

use kurbo::{Point, Size};

/// Relative positioning hints, keyed by name (for example `"center_x"`).
///
/// The map is owned, so every clone is a deep copy and a snapshot never
/// aliases the live widget's hints.
pub type PosHint = BTreeMap<String, f64>;

/// Proportional sizing hints. `None` means "not driven by the layout".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeHint {
    /// Horizontal share of the parent.
    pub x: Option<f64>,
    /// Vertical share of the parent.
    pub y: Option<f64>,
    /// Lower horizontal bound in pixels.
    pub min_x: Option<f64>,
    /// Lower vertical bound in pixels.
    pub min_y: Option<f64>,
    /// Upper horizontal bound in pixels.
    pub max_x: Option<f64>,
    /// Upper vertical bound in pixels.
    pub max_y: Option<f64>,
}

/// Positioning and sizing attributes of a widget.
///
/// `pos` is expressed in the parent's coordinate space. The overlay is
/// expected to share the window's coordinate space, so a widget placed under
/// the overlay is positioned in window coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    /// Position of the widget's origin.
    pub pos: Point,
    /// Current size.
    pub size: Size,
    /// Proportional sizing hints.
    pub size_hint: SizeHint,
    /// Relative positioning hints.
    pub pos_hint: PosHint,
}

/// Host widget tree consumed by the drag-and-drop state machines.
///
/// Child order is front-to-back: index `0` is the front-most child, the same
/// order the host hit-tests in. Points passed to [`collides`](Self::collides)
/// are window coordinates.
pub trait WidgetTree {
    /// Handle of a widget.
    ///
    /// Handles of destroyed widgets must stay distinguishable from live ones;
    /// [`is_alive`](Self::is_alive) is how stale parents are detected.
    type Id: Copy + Eq + Hash + Debug;

    /// The top-level surface dragged widgets are lifted into.
    fn overlay(&self) -> Self::Id;

    /// Whether `widget` still exists.
    fn is_alive(&self, widget: Self::Id) -> bool;

    /// Current parent of `widget`, if it is attached.
    fn parent(&self, widget: Self::Id) -> Option<Self::Id>;

    /// Children of `widget`, front-most first.
    fn children(&self, widget: Self::Id) -> Vec<Self::Id>;

    /// Attach `child` under `parent` at `index`, clamped to the child count.
    fn insert_child(&mut self, parent: Self::Id, child: Self::Id, index: usize);

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: Self::Id, child: Self::Id);

    /// Read the positioning attributes of `widget`.
    fn placement(&self, widget: Self::Id) -> Placement;

    /// Replace the positioning attributes of `widget`.
    fn set_placement(&mut self, widget: Self::Id, placement: Placement);

    /// Window-space position of the widget's origin.
    fn window_position(&self, widget: Self::Id) -> Point;

    /// Whether the window-space `point` lies inside `widget`.
    fn collides(&self, widget: Self::Id, point: Point) -> bool;

    /// Create a generic placeholder widget for a reorderable container.
    fn create_spacer(&mut self) -> Self::Id;

    /// Start moving `widget` to `to` over `duration`.
    ///
    /// When the animation completes, the host reports it with
    /// [`DragDrop::animation_finished`](crate::DragDrop::animation_finished).
    fn animate_position(&mut self, widget: Self::Id, to: Point, duration: Duration);
}

/// Index of `child` among the children of `parent`.
pub fn index_in_parent<T: WidgetTree>(tree: &T, parent: T::Id, child: T::Id) -> Option<usize> {
    tree.children(parent).iter().position(|&c| c == child)
}

/// Detach `widget` from its parent, if it has one.
pub fn detach<T: WidgetTree>(tree: &mut T, widget: T::Id) {
    if let Some(parent) = tree.parent(widget) {
        tree.remove_child(parent, widget);
    }
}
