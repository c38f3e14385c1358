// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extent models and the visible range query.

use core::ops::Range;

/// Items of a strip that should have realized views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    /// First realized index (inclusive).
    pub start: usize,
    /// One past the last realized index.
    pub end: usize,
    /// Extent of the items before `start`.
    pub before_extent: f64,
    /// Extent of the items at and after `end`.
    pub after_extent: f64,
    /// Extent of the whole strip.
    pub content_extent: f64,
}

impl VisibleRange {
    /// The range with nothing realized.
    pub const EMPTY: Self = Self {
        start: 0,
        end: 0,
        before_extent: 0.0,
        after_extent: 0.0,
        content_extent: 0.0,
    };

    /// Returns `true` if nothing is realized.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Realized indices as a range.
    #[must_use]
    pub const fn indices(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns `true` if `index` is realized.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// A strip of items indexed `0..len`.
///
/// Implementations must keep `offset_of(0) == 0` and offsets non-decreasing.
pub trait ExtentModel {
    /// Number of items.
    fn len(&self) -> usize;

    /// Returns `true` if there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extent of one item.
    fn extent_of(&self, index: usize) -> f64;

    /// Offset of the start of `index` from the start of the strip.
    fn offset_of(&self, index: usize) -> f64;

    /// Extent of the whole strip.
    fn total_extent(&self) -> f64 {
        self.offset_of(self.len())
    }

    /// Index of the item at `offset`, clamped into `0..len`.
    fn index_at_offset(&self, offset: f64) -> usize {
        let len = self.len();
        if len == 0 {
            return 0;
        }
        // Binary search over item starts.
        let (mut lo, mut hi) = (0, len);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.offset_of(mid) <= offset {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

/// Compute the realized range for a viewport over `model`.
///
/// Negative inputs are treated as zero. `overscan` is added on both sides of the
/// viewport so that views exist slightly before they scroll in.
pub fn compute_visible_range<M: ExtentModel + ?Sized>(
    model: &M,
    scroll_offset: f64,
    viewport_extent: f64,
    overscan: f64,
) -> VisibleRange {
    let len = model.len();
    let content_extent = model.total_extent().max(0.0);
    if len == 0 || content_extent <= 0.0 {
        return VisibleRange::EMPTY;
    }

    let scroll_offset = scroll_offset.max(0.0);
    let overscan = overscan.max(0.0);
    let lo = (scroll_offset - overscan).max(0.0);
    let hi = (scroll_offset + viewport_extent.max(0.0) + overscan).min(content_extent);
    if hi <= lo {
        return VisibleRange {
            start: 0,
            end: 0,
            before_extent: lo,
            after_extent: (content_extent - lo).max(0.0),
            content_extent,
        };
    }

    let start = model.index_at_offset(lo).min(len - 1);
    let mut end = start;
    while end < len && model.offset_of(end) < hi {
        end += 1;
    }
    let end_offset = if end < len {
        model.offset_of(end)
    } else {
        content_extent
    };

    VisibleRange {
        start,
        end,
        before_extent: model.offset_of(start),
        after_extent: (content_extent - end_offset).max(0.0),
        content_extent,
    }
}
