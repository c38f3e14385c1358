// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router implementation.
//!
//! ## Overview
//!
//! Reconstructs root→target paths and emits the target → bubble steps for one routed node.
//!
//! ## Target selection
//!
//! - A pinned node always wins over the fresh hit (event target pinning).
//! - Otherwise the hit supplied by the caller is routed, if any.
//! - Hit testing itself (including container first refusal) happens before routing.

use alloc::vec::Vec;

use crate::types::{Dispatch, ParentLookup, Path};

/// Deterministic responder path router.
///
/// ## Usage
///
/// - Construct with [`Router::new`] around a [`ParentLookup`] (usually a borrowed view tree).
/// - Optionally pin a node with [`Router::with_pinned`] so routes ignore fresh hits.
/// - Call [`Router::route_bubbling`] to offer the event to the routed node and then its
///   ancestors (bottom-up consumption), or [`Router::bubble`] for a specific node.
pub struct Router<K, P: ParentLookup<K>> {
    parent: P,
    pinned: Option<K>,
}

impl<K: Copy + Eq + core::fmt::Debug, P: ParentLookup<K>> core::fmt::Debug for Router<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("pinned", &self.pinned)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq, P: ParentLookup<K>> Router<K, P> {
    /// Create a router over a parent lookup with nothing pinned.
    pub fn new(parent: P) -> Self {
        Self {
            parent,
            pinned: None,
        }
    }

    /// Pin a node so it receives every routed event; `None` routes fresh hits again.
    #[must_use]
    pub fn with_pinned(mut self, node: Option<K>) -> Self {
        self.pinned = node;
        self
    }

    /// Returns the node an event would be routed to given a fresh `hit`.
    pub fn resolve(&self, hit: Option<K>) -> Option<K> {
        self.pinned.or(hit)
    }

    /// Emit a target → bubble sequence for the pinned node, or for `hit`.
    pub fn route_bubbling(&self, hit: Option<K>) -> Vec<Dispatch<K>> {
        match self.resolve(hit) {
            Some(target) => self.bubble(target),
            None => Vec::new(),
        }
    }

    /// Emit a target → bubble sequence for a specific node, ignoring any pin.
    pub fn bubble(&self, target: K) -> Vec<Dispatch<K>> {
        let path = self.path_to(target);
        emit_path(&path)
    }

    /// Reconstruct the root→target path for `target`.
    pub fn path_to(&self, target: K) -> Path<K> {
        let mut out = Path::new();
        let mut cur = target;
        // Collect to root; the lookup guarantees acyclic ancestry.
        loop {
            out.push(cur);
            match self.parent.parent_of(&cur) {
                Some(p) => cur = p,
                None => break,
            }
        }
        out.reverse();
        out
    }
}

fn emit_path<K: Copy>(path: &[K]) -> Vec<Dispatch<K>> {
    let mut out = Vec::with_capacity(path.len());
    let Some((target, ancestors)) = path.split_last() else {
        return out;
    };

    out.push(Dispatch::target(*target));

    for &n in ancestors.iter().rev() {
        out.push(Dispatch::bubble(n));
    }
    out
}
