// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout boxes: position, size, and size limits.

use kurbo::{Insets, Rect, Size};

/// An element's position (relative to its parent) and size, plus size limits.
///
/// Every size written through [`LayoutBox::apply`] is clamped into the limits, so the stored
/// width is always within `[min_width, max_width]` and likewise for height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    min_width: f64,
    max_width: f64,
    min_height: f64,
    max_height: f64,
    /// Outer spacing, for containers that arrange children.
    pub margin: Insets,
}

impl Default for LayoutBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_width: 0.0,
            max_width: f64::MAX,
            min_height: 0.0,
            max_height: f64::MAX,
            margin: Insets::ZERO,
        }
    }
}

impl LayoutBox {
    /// Horizontal position in the parent's space.
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position in the parent's space.
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Stored width.
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Stored height.
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Width limits as `(min, max)`.
    pub const fn width_limits(&self) -> (f64, f64) {
        (self.min_width, self.max_width)
    }

    /// Height limits as `(min, max)`.
    pub const fn height_limits(&self) -> (f64, f64) {
        (self.min_height, self.max_height)
    }

    /// Size of the box.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The box in the parent's coordinate space.
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// The box in its own coordinate space (origin at the top-left corner).
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Set the width limits.
    ///
    /// A `max` below `min` is raised to `min`. Limits apply from the next layout write.
    pub fn set_width_limits(&mut self, min: f64, max: f64) {
        (self.min_width, self.max_width) = sanitize_limits(min, max);
    }

    /// Set the height limits.
    ///
    /// A `max` below `min` is raised to `min`. Limits apply from the next layout write.
    pub fn set_height_limits(&mut self, min: f64, max: f64) {
        (self.min_height, self.max_height) = sanitize_limits(min, max);
    }

    /// Clamp a width request into the limits.
    pub fn clamp_width(&self, width: f64) -> f64 {
        clamp(width, self.min_width, self.max_width)
    }

    /// Clamp a height request into the limits.
    pub fn clamp_height(&self, height: f64) -> f64 {
        clamp(height, self.min_height, self.max_height)
    }

    /// Store a new box and return whether any stored value changed.
    ///
    /// Non-finite positions are stored as zero.
    pub fn apply(&mut self, x: f64, y: f64, width: f64, height: f64) -> bool {
        let x = if x.is_finite() { x } else { 0.0 };
        let y = if y.is_finite() { y } else { 0.0 };
        let width = self.clamp_width(width);
        let height = self.clamp_height(height);
        let changed =
            x != self.x || y != self.y || width != self.width || height != self.height;
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        changed
    }
}

fn sanitize_limits(min: f64, max: f64) -> (f64, f64) {
    let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
    let max = if max.is_nan() { f64::MAX } else { max.min(f64::MAX) };
    (min, max.max(min))
}

fn clamp(v: f64, min: f64, max: f64) -> f64 {
    if v.is_nan() { min } else { v.min(max).max(min) }
}
