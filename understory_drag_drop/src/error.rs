// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by drag, drop, and snapshot operations.
//!
//! Failing to classify a gesture as a drag and a drop that nobody accepts are
//! ordinary outcomes and never show up here.

/// Errors returned by this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A snapshot recorded a parent that no longer exists.
    #[error("the parent recorded in the widget state no longer exists")]
    ParentGone,
    /// A widget that is dragged on behalf of another widget's pointer must not
    /// already be placed in the tree.
    #[error("the widget must be detached before it can be dragged by another widget's pointer")]
    AlreadyParented,
    /// The spacer pool of a reorderable container was changed while one of its
    /// spacers was placed in the tree.
    #[error("spacer widgets cannot be changed while a drag is being tracked")]
    SpacersInUse,
    /// The widget has no role registered for the requested operation.
    #[error("the widget has no matching drag-and-drop role registered")]
    NotRegistered,
    /// The pointer has no live session.
    #[error("no session exists for the pointer")]
    UnknownPointer,
}
