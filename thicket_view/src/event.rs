// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events.

use kurbo::{Point, Vec2};

/// Primary mouse button.
pub const PRIMARY_BUTTON: u8 = 1;

/// Kind of pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEventKind {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Wheel scrolled.
    Wheel {
        /// Scroll delta in device pixels.
        delta: Vec2,
    },
    /// Pointer entered the view. Synthesized by the window.
    Enter,
    /// Pointer left the view. Synthesized by the window.
    Leave,
}

/// A pointer event in device coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerEventKind,
    /// Device-space position.
    pub position: Point,
    /// Button for [`PointerEventKind::Down`] and [`PointerEventKind::Up`].
    pub button: u8,
    /// Timestamp in milliseconds.
    pub time_ms: u64,
}

impl PointerEvent {
    /// An event of `kind` with the primary button.
    pub fn new(kind: PointerEventKind, position: impl Into<Point>, time_ms: u64) -> Self {
        Self {
            kind,
            position: position.into(),
            button: PRIMARY_BUTTON,
            time_ms,
        }
    }

    /// Primary button down.
    pub fn down(position: impl Into<Point>, time_ms: u64) -> Self {
        Self::new(PointerEventKind::Down, position, time_ms)
    }

    /// Pointer move.
    pub fn moved(position: impl Into<Point>, time_ms: u64) -> Self {
        Self::new(PointerEventKind::Move, position, time_ms)
    }

    /// Primary button up.
    pub fn up(position: impl Into<Point>, time_ms: u64) -> Self {
        Self::new(PointerEventKind::Up, position, time_ms)
    }

    /// Wheel scroll.
    pub fn wheel(position: impl Into<Point>, delta: Vec2, time_ms: u64) -> Self {
        Self::new(PointerEventKind::Wheel { delta }, position, time_ms)
    }

    /// Builder: button.
    #[must_use]
    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }
}

/// Keys the core understands; anything else is [`Key::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Tab.
    Tab,
    /// Enter / Return.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// Text input.
    Character(char),
    /// Platform key code.
    Other(u32),
}

/// A keyboard event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key.
    pub key: Key,
    /// `true` on press, `false` on release.
    pub pressed: bool,
    /// Shift held.
    pub shift: bool,
}

impl KeyEvent {
    /// Key press without modifiers.
    pub fn press(key: Key) -> Self {
        Self {
            key,
            pressed: true,
            shift: false,
        }
    }

    /// Builder: shift.
    #[must_use]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}
