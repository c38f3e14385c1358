// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Virtual List: which items of a long strip need a realized view.
//!
//! Adapter views only create views for items near the viewport. This crate answers the
//! geometry half of that job and nothing else:
//!
//! - [`ExtentModel`] describes a strip of items `0..len` with per-item extents.
//! - [`FixedExtentModel`] is the uniform-height model used by simple lists.
//! - [`compute_visible_range`] maps a scroll offset, a viewport extent and overscan onto
//!   an index range plus the spacing before and after it.
//! - [`VirtualList`] owns the scroll state, caches the last [`VisibleRange`] and reports
//!   whether the range changed so the host only rebinds views when it must.
//!
//! ```rust
//! use thicket_virtual_list::{FixedExtentModel, VirtualList};
//!
//! // 100 rows of 20 px in a 200 px viewport, no overscan.
//! let mut list = VirtualList::new(FixedExtentModel::new(100, 20.0), 200.0, 0.0);
//! list.set_scroll_offset(100.0);
//!
//! let range = list.visible_range();
//! assert_eq!((range.start, range.end), (5, 15));
//! assert_eq!(range.before_extent, 100.0);
//! ```
//!
//! Extents live in logical pixels and are expected to be finite. This crate is `no_std`.

#![no_std]

mod fixed;
mod list;
mod model;

pub use fixed::FixedExtentModel;
pub use list::{ScrollAlign, VirtualList};
pub use model::{ExtentModel, VisibleRange, compute_visible_range};
