// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-anchored tracking: keep a dragged widget under the pointer.
//!
//! A [`DragAnchor`] fixes the offset between the pointer and the dragged
//! widget's origin when the drag starts. Every later pointer position maps to
//! a widget position through [`DragAnchor::widget_position`].
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_drag_drop::tracking::DragAnchor;
//!
//! // Pointer pressed at (15, 25) on a widget whose origin is (10, 20).
//! let anchor = DragAnchor::grab(Point::new(15.0, 25.0), Point::new(10.0, 20.0));
//! assert_eq!(anchor.offset(), Vec2::new(5.0, 5.0));
//!
//! // Pointer moves to (40, 30); the widget follows, keeping the grab offset.
//! assert_eq!(anchor.widget_position(Point::new(40.0, 30.0)), Point::new(35.0, 25.0));
//! ```

use kurbo::{Point, Size, Vec2};

/// Offset between the pointer and the dragged widget's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragAnchor {
    /// Where the pointer went down, in window coordinates.
    pointer_origin: Point,
    /// Pointer position minus widget origin, fixed for the whole drag.
    offset: Vec2,
}

impl DragAnchor {
    /// Anchor the widget at `widget_origin` to a pointer that went down at
    /// `pointer_origin`. Both are window coordinates.
    pub fn grab(pointer_origin: Point, widget_origin: Point) -> Self {
        Self {
            pointer_origin,
            offset: pointer_origin - widget_origin,
        }
    }

    /// Anchor a widget of `size` centered under the pointer.
    ///
    /// Used when the dragged widget had no place in the tree before the drag.
    pub fn centered(pointer_origin: Point, size: Size) -> Self {
        Self {
            pointer_origin,
            offset: Vec2::new(size.width * 0.5, size.height * 0.5),
        }
    }

    /// Where the widget's origin belongs for the pointer at `pointer`.
    pub fn widget_position(&self, pointer: Point) -> Point {
        pointer - self.offset
    }

    /// Where the widget's origin was when the pointer went down.
    pub fn origin_widget_position(&self) -> Point {
        self.pointer_origin - self.offset
    }

    /// Pointer position minus widget origin.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}
