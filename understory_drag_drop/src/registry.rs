// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Enumerate the drags lifted into a surface.

use alloc::vec::Vec;

use crate::system::DragDrop;
use crate::tree::WidgetTree;

/// Draggables among the direct children of `root` that have a drag in
/// progress, front-most first.
///
/// The result is a copy, so it stays valid while cancelling its entries
/// rearranges `root`'s children.
pub fn ongoing_drags<T: WidgetTree>(tree: &T, dnd: &DragDrop<T>, root: T::Id) -> Vec<T::Id> {
    tree.children(root)
        .into_iter()
        .filter(|&child| dnd.is_being_dragged(child))
        .collect()
}
