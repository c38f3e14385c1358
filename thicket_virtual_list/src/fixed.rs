// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform item extents.

use crate::ExtentModel;

/// An [`ExtentModel`] where every item has the same extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedExtentModel {
    len: usize,
    extent: f64,
}

impl FixedExtentModel {
    /// `len` items of `extent` each. Negative and non-finite extents become zero.
    #[must_use]
    pub fn new(len: usize, extent: f64) -> Self {
        Self {
            len,
            extent: sanitize(extent),
        }
    }

    /// Change the number of items.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    /// Change the item extent.
    pub fn set_extent(&mut self, extent: f64) {
        self.extent = sanitize(extent);
    }

    /// The shared item extent.
    #[must_use]
    pub const fn extent(&self) -> f64 {
        self.extent
    }
}

fn sanitize(extent: f64) -> f64 {
    if extent.is_finite() && extent > 0.0 {
        extent
    } else {
        0.0
    }
}

impl ExtentModel for FixedExtentModel {
    fn len(&self) -> usize {
        self.len
    }

    fn extent_of(&self, _index: usize) -> f64 {
        self.extent
    }

    fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.extent
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "the ratio is non-negative and clamped to the item count"
    )]
    fn index_at_offset(&self, offset: f64) -> usize {
        if self.len == 0 || self.extent <= 0.0 || offset.is_nan() || offset <= 0.0 {
            return 0;
        }
        // Truncation is floor for non-negative values.
        let i = (offset / self.extent) as usize;
        i.min(self.len - 1)
    }
}
