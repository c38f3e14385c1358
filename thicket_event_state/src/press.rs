// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press recognition: turn down/move/up sequences into clicks.
//!
//! ## Usage
//!
//! ```
//! use thicket_event_state::press::{PressOptions, PressResult, PressState};
//! use kurbo::Point;
//!
//! let mut state: PressState<u32> = PressState::new();
//!
//! state.on_down(None, None, 42, Point::new(10.0, 20.0), 1000, PressOptions::default());
//! // Released inside the pressed element, close to where it went down.
//! let result = state.on_up(None, None, Point::new(12.0, 21.0), true, 1080);
//! assert_eq!(result, PressResult::Click(42));
//! ```
//!
//! ## Recognition rules
//!
//! 1. **No active press**: nothing is recognized.
//! 2. **Button mismatch**: the press is suppressed.
//! 3. **Cancel on move**: when the press opted into it, moving the pointer farther than
//!    the slop from the down position cancels the press, even if the pointer comes back.
//!    The release position is checked against the slop too.
//! 4. **Same bounds**: the release must land inside the pressed element.
//! 5. **Long press**: when the press opted into it and the press lasted at least the
//!    long-press threshold, a [`PressResult::LongClick`] is produced instead of a click.
//!
//! Each pointer is tracked independently.

use alloc::collections::BTreeMap;
use core::num::NonZeroU64;
use kurbo::Point;

/// Pointer identifier for tracking multiple concurrent presses.
pub type PointerId = NonZeroU64;

/// Mouse button identifier.
pub type Button = u8;

/// Default distance the pointer may travel before a press is cancelled, in device pixels.
pub const DEFAULT_SLOP: f64 = 5.0;

/// Default duration after which a press becomes a long press, in milliseconds.
pub const DEFAULT_LONG_PRESS_MS: u64 = 500;

const PRIMARY_POINTER: PointerId = NonZeroU64::MIN;

/// Per-press behavior, usually derived from the pressed element's flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PressOptions {
    /// Cancel the press once the pointer moves beyond the slop.
    pub cancel_on_move: bool,
    /// Recognize presses longer than the long-press threshold as long clicks.
    pub long_clickable: bool,
}

impl Default for PressOptions {
    fn default() -> Self {
        Self {
            cancel_on_move: true,
            long_clickable: false,
        }
    }
}

/// Press recognition state machine.
#[derive(Clone, Debug)]
pub struct PressState<K> {
    presses: BTreeMap<PointerId, Press<K>>,
    /// Distance from the down position beyond which a cancellable press is abandoned.
    pub slop: f64,
    /// Minimum press duration, in milliseconds, for a long click.
    pub long_press_ms: u64,
}

/// State for an active pointer press.
#[derive(Clone, Debug)]
pub struct Press<K> {
    /// Element that took the press.
    pub target: K,
    /// Pointer position at press time.
    pub down_position: Point,
    /// Timestamp when the press occurred, in milliseconds.
    pub down_time: u64,
    /// Button that was pressed.
    pub button: Button,
    /// Options captured at press time.
    pub options: PressOptions,
    /// True once the pointer travelled beyond the slop.
    pub distance_exceeded: bool,
}

impl<K> Press<K> {
    /// Whether this press can still produce a click.
    pub fn is_cancelled(&self) -> bool {
        self.options.cancel_on_move && self.distance_exceeded
    }
}

/// Result of a release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PressResult<K> {
    /// A click should be performed on the pressed element.
    Click(K),
    /// A long click should be performed on the pressed element.
    LongClick(K),
    /// Nothing should be performed; carries the pressed element if there was one.
    Suppressed(Option<K>),
}

impl<K: PartialEq + Clone> PressState<K> {
    /// Create a press state with the default slop and long-press threshold.
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_SLOP, DEFAULT_LONG_PRESS_MS)
    }

    /// Create a press state with custom thresholds.
    pub fn with_thresholds(slop: f64, long_press_ms: u64) -> Self {
        Self {
            presses: BTreeMap::new(),
            slop: slop.max(0.0),
            long_press_ms,
        }
    }

    /// Record a pointer down on `target`.
    ///
    /// A second down for the same pointer replaces the earlier press.
    pub fn on_down(
        &mut self,
        pointer_id: Option<PointerId>,
        button: Option<Button>,
        target: K,
        position: Point,
        timestamp: u64,
        options: PressOptions,
    ) {
        let press = Press {
            target,
            down_position: position,
            down_time: timestamp,
            button: button.unwrap_or(1),
            options,
            distance_exceeded: false,
        };
        self.presses
            .insert(pointer_id.unwrap_or(PRIMARY_POINTER), press);
    }

    /// Track pointer movement during a press.
    ///
    /// Returns `Some(target)` the first time a cancellable press moves beyond the slop,
    /// so the caller can drop the element's pressed state.
    pub fn on_move(&mut self, pointer_id: Option<PointerId>, position: Point) -> Option<K> {
        let press = self.presses.get_mut(&pointer_id.unwrap_or(PRIMARY_POINTER))?;
        if press.distance_exceeded {
            return None;
        }
        if press.down_position.distance(position) > self.slop {
            press.distance_exceeded = true;
            if press.options.cancel_on_move {
                return Some(press.target.clone());
            }
        }
        None
    }

    /// Process a release and decide whether a click should be performed.
    ///
    /// `inside_target` tells whether the release landed inside the pressed element.
    pub fn on_up(
        &mut self,
        pointer_id: Option<PointerId>,
        button: Option<Button>,
        position: Point,
        inside_target: bool,
        timestamp: u64,
    ) -> PressResult<K> {
        let Some(press) = self.presses.remove(&pointer_id.unwrap_or(PRIMARY_POINTER)) else {
            return PressResult::Suppressed(None);
        };

        if press.button != button.unwrap_or(1) {
            return PressResult::Suppressed(Some(press.target));
        }

        if press.options.cancel_on_move
            && (press.distance_exceeded || press.down_position.distance(position) > self.slop)
        {
            return PressResult::Suppressed(Some(press.target));
        }

        if !inside_target {
            return PressResult::Suppressed(Some(press.target));
        }

        let held = timestamp.saturating_sub(press.down_time);
        if press.options.long_clickable && held >= self.long_press_ms {
            PressResult::LongClick(press.target)
        } else {
            PressResult::Click(press.target)
        }
    }

    /// Cancel the press for a pointer. Returns the target that was pressed, if any.
    pub fn cancel(&mut self, pointer_id: Option<PointerId>) -> Option<K> {
        self.presses
            .remove(&pointer_id.unwrap_or(PRIMARY_POINTER))
            .map(|p| p.target)
    }

    /// Cancel every press whose target satisfies `pred`, returning how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let before = self.presses.len();
        self.presses.retain(|_, p| !pred(&p.target));
        before - self.presses.len()
    }

    /// Check if a pointer has an active press.
    pub fn is_pressed(&self, pointer_id: Option<PointerId>) -> bool {
        self.presses
            .contains_key(&pointer_id.unwrap_or(PRIMARY_POINTER))
    }

    /// Get the active press for a pointer.
    pub fn press(&self, pointer_id: Option<PointerId>) -> Option<&Press<K>> {
        self.presses.get(&pointer_id.unwrap_or(PRIMARY_POINTER))
    }

    /// Check if there is an active press on the specified target.
    pub fn has_active_press(&self, query_target: &K) -> bool {
        self.presses.values().any(|p| p.target == *query_target)
    }

    /// Clear all active presses.
    pub fn clear(&mut self) {
        self.presses.clear();
    }
}

impl<K: PartialEq + Clone> Default for PressState<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(state: &mut PressState<u32>, target: u32, at: Point, options: PressOptions) {
        state.on_down(None, None, target, at, 1000, options);
    }

    #[test]
    fn release_in_place_clicks() {
        let mut state = PressState::new();
        down(&mut state, 42, Point::new(10.0, 20.0), PressOptions::default());
        let result = state.on_up(None, None, Point::new(12.0, 22.0), true, 1050);
        assert_eq!(result, PressResult::Click(42));
        assert!(!state.is_pressed(None), "release ends the press");
    }

    #[test]
    fn release_beyond_slop_is_suppressed() {
        let mut state = PressState::new();
        down(&mut state, 42, Point::new(10.0, 20.0), PressOptions::default());
        // No move events at all; the release position alone is too far.
        let result = state.on_up(None, None, Point::new(20.0, 30.0), true, 1050);
        assert_eq!(result, PressResult::Suppressed(Some(42)));
    }

    #[test]
    fn release_exactly_at_slop_clicks() {
        let mut state = PressState::new();
        down(&mut state, 42, Point::new(10.0, 20.0), PressOptions::default());
        let result = state.on_up(None, None, Point::new(15.0, 20.0), true, 1050);
        assert_eq!(result, PressResult::Click(42));
    }

    #[test]
    fn moving_away_and_back_still_cancels() {
        let mut state = PressState::new();
        down(&mut state, 42, Point::new(10.0, 20.0), PressOptions::default());
        assert_eq!(state.on_move(None, Point::new(12.0, 20.0)), None);
        assert_eq!(
            state.on_move(None, Point::new(40.0, 20.0)),
            Some(42),
            "first excursion beyond slop reports the cancelled target"
        );
        assert_eq!(
            state.on_move(None, Point::new(80.0, 20.0)),
            None,
            "cancellation is reported once"
        );
        let result = state.on_up(None, None, Point::new(10.0, 20.0), true, 1100);
        assert_eq!(result, PressResult::Suppressed(Some(42)));
    }

    #[test]
    fn cancel_on_move_can_be_disabled() {
        let mut state = PressState::new();
        let options = PressOptions {
            cancel_on_move: false,
            ..PressOptions::default()
        };
        down(&mut state, 7, Point::new(0.0, 0.0), options);
        assert_eq!(state.on_move(None, Point::new(50.0, 0.0)), None);
        let result = state.on_up(None, None, Point::new(50.0, 0.0), true, 1100);
        assert_eq!(result, PressResult::Click(7));
    }

    #[test]
    fn release_outside_target_is_suppressed() {
        let mut state = PressState::new();
        down(&mut state, 42, Point::new(10.0, 20.0), PressOptions::default());
        let result = state.on_up(None, None, Point::new(10.0, 20.0), false, 1050);
        assert_eq!(result, PressResult::Suppressed(Some(42)));
    }

    #[test]
    fn wrong_button_is_suppressed() {
        let mut state = PressState::new();
        down(&mut state, 42, Point::new(10.0, 20.0), PressOptions::default());
        let result = state.on_up(None, Some(2), Point::new(10.0, 20.0), true, 1050);
        assert_eq!(result, PressResult::Suppressed(Some(42)));
    }

    #[test]
    fn release_without_press_is_suppressed() {
        let mut state: PressState<u32> = PressState::new();
        let result = state.on_up(None, None, Point::new(10.0, 20.0), true, 1000);
        assert_eq!(result, PressResult::Suppressed(None));
    }

    #[test]
    fn long_press_produces_long_click() {
        let mut state = PressState::with_thresholds(5.0, 300);
        let options = PressOptions {
            long_clickable: true,
            ..PressOptions::default()
        };
        down(&mut state, 3, Point::new(0.0, 0.0), options);
        assert_eq!(
            state.on_up(None, None, Point::ZERO, true, 1300),
            PressResult::LongClick(3)
        );

        down(&mut state, 3, Point::new(0.0, 0.0), options);
        assert_eq!(
            state.on_up(None, None, Point::ZERO, true, 1299),
            PressResult::Click(3),
            "a short press on a long-clickable element is a plain click"
        );
    }

    #[test]
    fn pointers_are_tracked_independently() {
        let mut state = PressState::new();
        let p1 = NonZeroU64::new(1).unwrap();
        let p2 = NonZeroU64::new(2).unwrap();
        state.on_down(Some(p1), None, 1, Point::ZERO, 0, PressOptions::default());
        state.on_down(
            Some(p2),
            None,
            2,
            Point::new(100.0, 0.0),
            0,
            PressOptions::default(),
        );
        assert_eq!(state.on_move(Some(p2), Point::new(200.0, 0.0)), Some(2));
        assert_eq!(
            state.on_up(Some(p1), None, Point::ZERO, true, 10),
            PressResult::Click(1)
        );
        assert_eq!(
            state.on_up(Some(p2), None, Point::new(100.0, 0.0), true, 10),
            PressResult::Suppressed(Some(2))
        );
    }

    #[test]
    fn cancel_where_drops_matching_presses() {
        let mut state = PressState::new();
        down(&mut state, 9, Point::ZERO, PressOptions::default());
        assert!(state.has_active_press(&9));
        assert_eq!(state.cancel_where(|t| *t == 9), 1);
        assert!(!state.is_pressed(None));
        assert_eq!(state.cancel(None), None, "nothing left to cancel");
    }
}
