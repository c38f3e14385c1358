// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll state over an [`ExtentModel`].

use crate::{ExtentModel, VisibleRange, compute_visible_range};

/// Where an item lands when scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Item start at viewport start.
    Start,
    /// Item end at viewport end.
    End,
    /// Smallest scroll that makes the item fully visible.
    Nearest,
}

/// Scroll offset, viewport and overscan for one virtualized strip.
///
/// The last computed [`VisibleRange`] is cached and only recomputed after a change.
#[derive(Debug, Clone)]
pub struct VirtualList<M: ExtentModel> {
    model: M,
    scroll_offset: f64,
    viewport_extent: f64,
    overscan: f64,
    dirty: bool,
    last: VisibleRange,
}

impl<M: ExtentModel> VirtualList<M> {
    /// Create a list scrolled to the top.
    #[must_use]
    pub fn new(model: M, viewport_extent: f64, overscan: f64) -> Self {
        Self {
            model,
            scroll_offset: 0.0,
            viewport_extent: viewport_extent.max(0.0),
            overscan: overscan.max(0.0),
            dirty: true,
            last: VisibleRange::EMPTY,
        }
    }

    /// The extent model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model; the cached range is invalidated.
    pub fn model_mut(&mut self) -> &mut M {
        self.dirty = true;
        &mut self.model
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Current viewport extent.
    #[must_use]
    pub const fn viewport_extent(&self) -> f64 {
        self.viewport_extent
    }

    /// Set the scroll offset, clamped to the scrollable range.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        let max = (self.model.total_extent() - self.viewport_extent).max(0.0);
        let offset = if offset.is_finite() {
            offset.clamp(0.0, max)
        } else {
            0.0
        };
        if offset != self.scroll_offset {
            self.scroll_offset = offset;
            self.dirty = true;
        }
    }

    /// Scroll by `delta`.
    pub fn scroll_by(&mut self, delta: f64) {
        self.set_scroll_offset(self.scroll_offset + delta);
    }

    /// Set the viewport extent, re-clamping the scroll offset.
    pub fn set_viewport_extent(&mut self, extent: f64) {
        let extent = extent.max(0.0);
        if extent != self.viewport_extent {
            self.viewport_extent = extent;
            self.dirty = true;
            self.set_scroll_offset(self.scroll_offset);
        }
    }

    /// Mark the cached range stale after the model changed behind the list's back.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// The realized range for the current state.
    pub fn visible_range(&mut self) -> VisibleRange {
        if self.dirty {
            self.last = compute_visible_range(
                &self.model,
                self.scroll_offset,
                self.viewport_extent,
                self.overscan,
            );
            self.dirty = false;
        }
        self.last
    }

    /// Recompute the range and report it only if the realized indices changed.
    pub fn refresh(&mut self) -> Option<VisibleRange> {
        let before = self.last;
        self.dirty = true;
        let after = self.visible_range();
        (after.indices() != before.indices()).then_some(after)
    }

    /// Scroll so that `index` is visible with the given alignment.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) {
        let len = self.model.len();
        if len == 0 {
            self.set_scroll_offset(0.0);
            return;
        }
        let index = index.min(len - 1);
        let item_start = self.model.offset_of(index);
        let item_end = item_start + self.model.extent_of(index);
        let view_start = self.scroll_offset;
        let view_end = view_start + self.viewport_extent;
        let target = match align {
            ScrollAlign::Start => item_start,
            ScrollAlign::End => item_end - self.viewport_extent,
            ScrollAlign::Nearest if item_start < view_start => item_start,
            ScrollAlign::Nearest if item_end > view_end => item_end - self.viewport_extent,
            ScrollAlign::Nearest => view_start,
        };
        self.set_scroll_offset(target);
    }
}
