// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drag_drop --heading-base-level=0

//! Understory Drag Drop: drag, drop, and live reorder for UI widget trees.
//!
//! This crate turns raw pointer input into drag-and-drop interactions on a
//! host-owned widget tree. Widgets take on up to three roles:
//!
//! - **Draggable**: a press held long enough (or any press, with a zero
//!   timeout) lifts the widget into the overlay, where it follows the pointer
//!   until release.
//! - **Droppable**: accepts drags of some classes when the pointer is
//!   released over it.
//! - **Reorderable**: a droppable container that shows a spacer where the
//!   item would land while a drag hovers it.
//!
//! On release, drop targets claim the drag (first claim wins), the target's
//! [`DropPolicy`] decides, and the draggable's [`DragHooks`] run the outcome.
//! By default a successful drop reparents the widget into the target and a
//! failed one animates it back to where it came from.
//!
//! ## Building blocks
//!
//! - [`gesture`]: decide whether a press is a drag or an ordinary tap/scroll.
//! - [`tracking`]: keep a lifted widget at a fixed offset from the pointer.
//! - [`snapshot`]: save and restore a widget's placement and containment.
//! - [`pointer`]: the per-pointer session shared by every role.
//! - [`session`]: the drag lifecycle and its read-only [`DragContext`].
//! - [`droppable`] and [`reorderable`]: the two kinds of drop target.
//! - [`registry`]: enumerate drags lifted into a surface.
//!
//! [`DragDrop`] ties them together. It never owns widgets: containment,
//! hit-testing and animation stay with the host, behind [`WidgetTree`].
//!
//! ## Driving it
//!
//! Feed [`DragDrop::pointer_down`], [`DragDrop::pointer_move`] and
//! [`DragDrop::pointer_up`] with the widgets under the pointer in dispatch
//! order, call [`DragDrop::tick`] with the host clock, and report finished
//! settle animations with [`DragDrop::animation_finished`]. Presses that turn
//! out not to be drags come back as [`Signal`]s from
//! [`DragDrop::take_signals`].
//!
//! ```rust
//! # use std::collections::HashMap;
//! # use core::time::Duration;
//! # use kurbo::{Point, Rect};
//! # use understory_drag_drop::tree::{Placement, WidgetTree};
//! # #[derive(Default)]
//! # struct Tree {
//! #     parent: HashMap<u32, u32>,
//! #     children: HashMap<u32, Vec<u32>>,
//! #     placement: HashMap<u32, Placement>,
//! #     next: u32,
//! # }
//! # impl Tree {
//! #     fn add(&mut self, parent: Option<u32>, rect: Rect) -> u32 {
//! #         self.next += 1;
//! #         let id = self.next;
//! #         let placement = Placement { pos: rect.origin(), size: rect.size(), ..Placement::default() };
//! #         self.placement.insert(id, placement);
//! #         if let Some(parent) = parent {
//! #             self.insert_child(parent, id, usize::MAX);
//! #         }
//! #         id
//! #     }
//! # }
//! # impl WidgetTree for Tree {
//! #     type Id = u32;
//! #     fn overlay(&self) -> u32 { 0 }
//! #     fn is_alive(&self, _: u32) -> bool { true }
//! #     fn parent(&self, w: u32) -> Option<u32> { self.parent.get(&w).copied() }
//! #     fn children(&self, w: u32) -> Vec<u32> { self.children.get(&w).cloned().unwrap_or_default() }
//! #     fn insert_child(&mut self, p: u32, c: u32, i: usize) {
//! #         let list = self.children.entry(p).or_default();
//! #         list.insert(i.min(list.len()), c);
//! #         self.parent.insert(c, p);
//! #     }
//! #     fn remove_child(&mut self, p: u32, c: u32) {
//! #         self.children.entry(p).or_default().retain(|&x| x != c);
//! #         self.parent.remove(&c);
//! #     }
//! #     fn placement(&self, w: u32) -> Placement { self.placement.get(&w).cloned().unwrap_or_default() }
//! #     fn set_placement(&mut self, w: u32, p: Placement) { self.placement.insert(w, p); }
//! #     fn window_position(&self, w: u32) -> Point { self.placement(w).pos }
//! #     fn collides(&self, w: u32, pt: Point) -> bool {
//! #         let p = self.placement(w);
//! #         Rect::from_origin_size(p.pos, p.size).contains(pt)
//! #     }
//! #     fn create_spacer(&mut self) -> u32 { self.add(None, Rect::new(0.0, 0.0, 10.0, 10.0)) }
//! #     fn animate_position(&mut self, w: u32, to: Point, _: Duration) {
//! #         let mut p = self.placement(w);
//! #         p.pos = to;
//! #         self.set_placement(w, p);
//! #     }
//! # }
//! use understory_drag_drop::{
//!     AcceptAll, DefaultHooks, DragConfig, DragDrop, DragState, PointerEvent, PointerId, classes,
//! };
//!
//! let mut tree = Tree::default();
//! let shelf = tree.add(None, Rect::new(0.0, 0.0, 100.0, 100.0));
//! let bin = tree.add(None, Rect::new(200.0, 0.0, 300.0, 100.0));
//! let card = tree.add(Some(shelf), Rect::new(10.0, 10.0, 40.0, 40.0));
//!
//! let mut dnd = DragDrop::<Tree>::new();
//! let mut config = DragConfig::new("card");
//! // Start dragging on press, without waiting for the gesture timeout.
//! config.gesture.timeout = Duration::ZERO;
//! dnd.add_draggable(card, config, DefaultHooks);
//! dnd.add_droppable(bin, classes(["card"]), AcceptAll);
//!
//! let p = PointerId(1);
//! dnd.pointer_down(&mut tree, &PointerEvent::new(p, Point::new(20.0, 20.0), 0), &[card, shelf])?;
//! assert_eq!(dnd.drag_state(card), Some(DragState::Started));
//! assert_eq!(tree.parent(card), Some(tree.overlay()));
//!
//! let over_bin = Point::new(250.0, 50.0);
//! dnd.pointer_move(&mut tree, &PointerEvent::new(p, over_bin, 16), &[card, bin])?;
//! dnd.pointer_up(&mut tree, &PointerEvent::new(p, over_bin, 32), &[card, bin])?;
//!
//! assert_eq!(tree.parent(card), Some(bin));
//! assert!(!dnd.is_being_dragged(card));
//! # Ok::<(), understory_drag_drop::Error>(())
//! ```
//!
//! ## Logging
//!
//! State transitions are reported through [`tracing`] at `debug` level and
//! per-move updates at `trace` level. Failed hooks and restores are logged
//! at `warn` level before the error is returned.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod system;
#[cfg(test)]
mod test_tree;

pub mod droppable;
pub mod gesture;
pub mod hooks;
pub mod pointer;
pub mod registry;
pub mod reorderable;
pub mod session;
pub mod snapshot;
pub mod tracking;
pub mod tree;

pub use droppable::{AcceptAll, DropPolicy, Droppable, classes};
pub use error::Error;
pub use gesture::GestureConfig;
pub use hooks::{DefaultHooks, DragCx, DragHooks};
pub use pointer::{Claim, PointerEvent, PointerId, PointerSession};
pub use registry::ongoing_drags;
pub use reorderable::{ReorderConfig, Reorderable, SpacerPool, insertion_index, widget_under_drag};
pub use session::{AfterSettle, DragContext, DragState, Settle};
pub use snapshot::{WidgetState, restore_widget_state, save_widget_state};
pub use system::{DragConfig, DragDrop, REPLAY_RELEASE_DELAY_MS, Signal};
pub use tree::{Placement, SizeHint, WidgetTree};
