// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press classification: is this press a drag or an ordinary interaction?
//!
//! A press on a draggable is ambiguous. It might be the start of a drag, a
//! tap on a button inside the draggable, or the first touch of a scroll.
//! [`GestureClassifier`] races two conditions:
//!
//! - the pointer stays within `distance` of its origin (on both axes) until
//!   `timeout` has elapsed, which makes it a drag;
//! - the pointer moves further than `distance`, or is released, before the
//!   timeout, which makes it an ordinary interaction.
//!
//! Time is whatever the host's millisecond clock says. Events at or past the
//! deadline lose the race to the timeout, so a late move or release still
//! classifies the press as a drag.
//!
//! ## Minimal example
//!
//! ```
//! use core::time::Duration;
//! use kurbo::Point;
//! use understory_drag_drop::gesture::{GestureClassifier, GestureConfig, Verdict};
//!
//! let config = GestureConfig { timeout: Duration::from_millis(100), distance: 5.0 };
//! let mut press = GestureClassifier::new(config, Point::new(10.0, 10.0), 1000);
//!
//! // Small jitter inside the tolerance does not decide anything.
//! assert_eq!(press.on_move(Point::new(12.0, 9.0), 1040), Verdict::Pending);
//!
//! // Holding still past the timeout makes it a drag.
//! assert_eq!(press.on_tick(1100), Verdict::Drag);
//! ```

use core::time::Duration;

use kurbo::Point;

/// Timeout and movement tolerance for press classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// How long a press must be held before it counts as a drag.
    ///
    /// Zero skips classification: every press is a drag immediately.
    pub timeout: Duration,
    /// How far (in pixels, per axis) the pointer may wander before the press
    /// counts as an ordinary interaction.
    pub distance: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(250),
            distance: 20.0,
        }
    }
}

impl GestureConfig {
    /// Whether presses are treated as drags without classification.
    pub fn is_immediate(&self) -> bool {
        self.timeout.is_zero()
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Result of feeding one input to a [`GestureClassifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing is decided yet.
    Pending,
    /// The press is a drag.
    Drag,
    /// The press is an ordinary interaction.
    ///
    /// `released` is set when the pointer went up within the tolerance, in
    /// which case both the press and the release must be replayed.
    Ordinary {
        /// Whether the pointer was already released.
        released: bool,
    },
}

/// Classifies one press.
///
/// Once a verdict other than [`Verdict::Pending`] has been returned, the
/// classifier is settled and keeps returning that verdict.
#[derive(Clone, Copy, Debug)]
pub struct GestureClassifier {
    origin: Point,
    deadline: u64,
    distance: f64,
    verdict: Verdict,
}

impl GestureClassifier {
    /// Start classifying a press at `origin` that happened at `time`.
    pub fn new(config: GestureConfig, origin: Point, time: u64) -> Self {
        let verdict = if config.is_immediate() {
            Verdict::Drag
        } else {
            Verdict::Pending
        };
        Self {
            origin,
            deadline: time.saturating_add(config.timeout_ms()),
            distance: config.distance,
            verdict,
        }
    }

    /// Current verdict.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Host time at which a held press becomes a drag.
    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    /// Where the press happened.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Advance the clock without pointer input.
    pub fn on_tick(&mut self, now: u64) -> Verdict {
        if self.verdict == Verdict::Pending && now >= self.deadline {
            self.verdict = Verdict::Drag;
        }
        self.verdict
    }

    /// Feed a pointer move.
    pub fn on_move(&mut self, pos: Point, time: u64) -> Verdict {
        if self.on_tick(time) != Verdict::Pending {
            return self.verdict;
        }
        let dx = (pos.x - self.origin.x).abs();
        let dy = (pos.y - self.origin.y).abs();
        if dx > self.distance || dy > self.distance {
            self.verdict = Verdict::Ordinary { released: false };
        }
        self.verdict
    }

    /// Feed the pointer release.
    ///
    /// Only the timeout is checked: movement is judged on move events, so a
    /// release that was not preceded by a disqualifying move is a tap.
    pub fn on_up(&mut self, time: u64) -> Verdict {
        if self.on_tick(time) != Verdict::Pending {
            return self.verdict;
        }
        self.verdict = Verdict::Ordinary { released: true };
        self.verdict
    }
}
