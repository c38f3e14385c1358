// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-space regions awaiting repaint.

use alloc::vec::Vec;

use kurbo::Rect;

/// Rectangles invalidated since the last paint, in device space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
}

impl Damage {
    /// Record a rectangle. Empty and non-finite rectangles are ignored, as are rectangles
    /// already covered by a recorded one.
    pub fn add(&mut self, rect: Rect) {
        let finite = rect.x0.is_finite()
            && rect.y0.is_finite()
            && rect.x1.is_finite()
            && rect.y1.is_finite();
        if !finite || rect.area() <= 0.0 {
            return;
        }
        let rect = rect.abs();
        if self
            .dirty_rects
            .iter()
            .any(|r| r.union(rect) == *r)
        {
            return;
        }
        self.dirty_rects.retain(|r| rect.union(*r) != rect);
        self.dirty_rects.push(rect);
    }

    /// Whether nothing is dirty.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }

    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}
