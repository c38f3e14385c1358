// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Focus: keyboard focus traversal.
//!
//! The window owns *which* view is focused and enforces eligibility (a view must be
//! focusable, enabled, visible and attached). This crate only answers "where does focus go
//! next": given the eligible candidates as [`FocusEntry`] values in a common coordinate
//! space, a [`FocusPolicy`] picks the next one for a [`Navigation`] intent.
//!
//! ```rust
//! use kurbo::Rect;
//! use thicket_focus::{FocusEntry, FocusPolicy, LinearPolicy, Navigation, WrapMode};
//!
//! let entries = [
//!     FocusEntry::new(1_u32, Rect::new(0.0, 0.0, 10.0, 10.0)),
//!     FocusEntry::new(2_u32, Rect::new(20.0, 0.0, 30.0, 10.0)),
//! ];
//! let policy = LinearPolicy { wrap: WrapMode::Wrap };
//!
//! // Tab moves from the first button to the second…
//! assert_eq!(policy.next(Some(1), Navigation::Next, &entries), Some(2));
//! // …and wraps back to the first.
//! assert_eq!(policy.next(Some(2), Navigation::Next, &entries), Some(1));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;

/// Direction of focus navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Forward order (Tab).
    Next,
    /// Backward order (Shift+Tab).
    Prev,
    /// Nearest candidate above.
    Up,
    /// Nearest candidate below.
    Down,
    /// Nearest candidate to the left.
    Left,
    /// Nearest candidate to the right.
    Right,
}

/// A focusable candidate.
#[derive(Clone, Debug)]
pub struct FocusEntry<K> {
    /// Identifier for this focusable view.
    pub id: K,
    /// Bounds in the coordinate space shared by all entries (usually device space).
    pub rect: Rect,
    /// Optional explicit ordering key; ordered entries come before unordered ones.
    pub order: Option<i32>,
    /// Whether this entry may receive focus right now.
    pub enabled: bool,
}

impl<K> FocusEntry<K> {
    /// An enabled, unordered entry.
    pub fn new(id: K, rect: Rect) -> Self {
        Self {
            id,
            rect,
            order: None,
            enabled: true,
        }
    }
}

/// What happens when traversal runs off either end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Stop at the ends.
    Never,
    /// Wrap around to the other end.
    Wrap,
}

/// Trait for focus traversal policies.
pub trait FocusPolicy<K: Copy + Eq> {
    /// Compute the next focus target given an origin (if anything is focused) and an intent.
    fn next(&self, origin: Option<K>, direction: Navigation, entries: &[FocusEntry<K>])
    -> Option<K>;
}

/// Reading-order traversal for Tab/Shift+Tab with a directional search for arrows.
#[derive(Copy, Clone, Debug)]
pub struct LinearPolicy {
    /// Wrap behavior at the ends of the sequence.
    pub wrap: WrapMode,
}

impl Default for LinearPolicy {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Wrap,
        }
    }
}

impl<K: Copy + Eq> FocusPolicy<K> for LinearPolicy {
    fn next(
        &self,
        origin: Option<K>,
        direction: Navigation,
        entries: &[FocusEntry<K>],
    ) -> Option<K> {
        match direction {
            Navigation::Next => next_linear(origin, entries, self.wrap, true),
            Navigation::Prev => next_linear(origin, entries, self.wrap, false),
            Navigation::Up | Navigation::Down | Navigation::Left | Navigation::Right => {
                match origin {
                    Some(o) => next_directional(o, direction, entries),
                    None => next_linear(None, entries, self.wrap, true),
                }
            }
        }
    }
}

fn next_linear<K: Copy + Eq>(
    origin: Option<K>,
    entries: &[FocusEntry<K>],
    wrap: WrapMode,
    forward: bool,
) -> Option<K> {
    let mut indices: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.enabled.then_some(i))
        .collect();
    if indices.is_empty() {
        return None;
    }
    // Stable sort: entries at the same reading position keep tree order.
    indices.sort_by(|&a, &b| compare_linear(&entries[a], &entries[b]));

    let last = indices.len() - 1;
    let pos = origin.and_then(|o| indices.iter().position(|&i| entries[i].id == o));
    let pick = match (pos, forward) {
        (None, true) => Some(0),
        (None, false) => Some(last),
        (Some(p), true) if p < last => Some(p + 1),
        (Some(p), false) if p > 0 => Some(p - 1),
        (Some(_), true) => (wrap == WrapMode::Wrap).then_some(0),
        (Some(_), false) => (wrap == WrapMode::Wrap).then_some(last),
    };
    pick.map(|p| entries[indices[p]].id)
}

fn compare_linear<K>(a: &FocusEntry<K>, b: &FocusEntry<K>) -> Ordering {
    match (a.order, b.order) {
        (Some(ao), Some(bo)) => ao.cmp(&bo).then_with(|| reading_order(&a.rect, &b.rect)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => reading_order(&a.rect, &b.rect),
    }
}

fn reading_order(a: &Rect, b: &Rect) -> Ordering {
    const ROW_EPS: f64 = 0.5;
    if (a.y0 - b.y0).abs() > ROW_EPS {
        return a.y0.partial_cmp(&b.y0).unwrap_or(Ordering::Equal);
    }
    a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal)
}

fn next_directional<K: Copy + Eq>(
    origin: K,
    direction: Navigation,
    entries: &[FocusEntry<K>],
) -> Option<K> {
    let oc = entries.iter().find(|e| e.id == origin)?.rect.center();

    let mut best: Option<(K, f64)> = None;
    for candidate in entries.iter().filter(|e| e.enabled && e.id != origin) {
        let cc = candidate.rect.center();
        let (dx, dy) = (cc.x - oc.x, cc.y - oc.y);
        let (primary, secondary) = match direction {
            Navigation::Right => (dx, dy),
            Navigation::Left => (-dx, dy),
            Navigation::Down => (dy, dx),
            Navigation::Up => (-dy, dx),
            Navigation::Next | Navigation::Prev => return None,
        };
        if primary <= 0.0 {
            continue;
        }
        // Off-axis distance weighs more than distance along the axis.
        let score = primary + 4.0 * secondary.abs();
        if score.is_finite() && best.is_none_or(|(_, s)| score < s) {
            best = Some((candidate.id, score));
        }
    }
    best.map(|(id, _)| id)
}
