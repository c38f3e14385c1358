// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the view tree: view identifiers, state flags, and styles.

/// Identifier for a view in a [`ViewTree`](crate::ViewTree) (generational).
///
/// Once a view is destroyed its slot may be reused, but the generation changes, so a stale
/// id never aliases the new occupant. Every query on a stale id returns `None`/`false`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u32, pub(crate) u32);

impl ViewId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// View state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u32 {
        /// Painted and hit tested.
        const VISIBLE = 1 << 0;
        /// Responds to input.
        const ENABLED = 1 << 1;
        /// Selected (checked) state.
        const SELECTED = 1 << 2;
        /// May receive keyboard focus.
        const FOCUSABLE = 1 << 3;
        /// Takes presses and performs clicks.
        const CLICKABLE = 1 << 4;
        /// Performs a long click for presses held past the long-press threshold.
        const LONG_CLICKABLE = 1 << 5;
        /// Currently pressed.
        const PRESSED = 1 << 6;
        /// A performed click flips [`ViewFlags::SELECTED`].
        const TOGGLE = 1 << 7;
        /// Paint and clip with the element's corner radii.
        const ROUND_CORNER = 1 << 8;
        /// Clip the element's own drawing to its bounds.
        const CLIP_VIEW = 1 << 9;
        /// Pop-up: hidden by a press outside of it while it is the window's current pop-up.
        const POPUP = 1 << 10;
        /// Moving the pointer past the click slop cancels a press.
        const CANCEL_EVENT = 1 << 11;
        /// Children are painted even when they fall outside this container.
        const ALWAYS_PAINT = 1 << 12;
        /// The active animation does not contribute to the paint matrix.
        const ANIMATION_MATRIX_DISABLED = 1 << 13;
        /// Last child in its container's sequence (topmost). Maintained by the tree.
        const FRONT = 1 << 14;
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED | Self::CANCEL_EVENT
    }
}

/// Visual style of a view, derived from its state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
    /// Resting state.
    #[default]
    Normal,
    /// Pointer over the view.
    Hover,
    /// View is pressed.
    Pressed,
    /// View is disabled.
    Disabled,
    /// View is selected.
    Selected,
    /// Selected view under the pointer.
    SelectedHover,
    /// Selected view being pressed.
    SelectedPressed,
    /// Set explicitly by widgets drawing an overlay state; never derived.
    Overlay,
}

impl Style {
    /// Derive the style for a view from its flags and hover state.
    pub fn derive(flags: ViewFlags, hovered: bool) -> Self {
        if !flags.contains(ViewFlags::ENABLED) {
            return Self::Disabled;
        }
        let pressed = flags.contains(ViewFlags::PRESSED);
        match (flags.contains(ViewFlags::SELECTED), pressed, hovered) {
            (true, true, _) => Self::SelectedPressed,
            (true, false, true) => Self::SelectedHover,
            (true, false, false) => Self::Selected,
            (false, true, _) => Self::Pressed,
            (false, false, true) => Self::Hover,
            (false, false, false) => Self::Normal,
        }
    }
}
