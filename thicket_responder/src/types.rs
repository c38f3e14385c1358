// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the responder: phases, outcomes, parent lookups and dispatch steps.

use smallvec::SmallVec;

/// Root→target path of node keys.
///
/// Most view trees are shallow, so paths of up to 16 nodes stay inline.
pub type Path<K> = SmallVec<[K; 16]>;

/// Phases of event propagation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// The routed node itself.
    Target,
    /// Target-to-root traversal, excluding the target.
    Bubble,
}

/// Handler outcome controlling propagation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Keep walking the sequence.
    Continue,
    /// The event was consumed; skip every remaining step.
    Stop,
}

impl Outcome {
    /// Map a "handled" boolean onto an outcome.
    #[inline]
    pub fn from_handled(handled: bool) -> Self {
        if handled { Self::Stop } else { Self::Continue }
    }
}

/// Look up the parent of a node to reconstruct a root→target path.
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root or unknown.
    fn parent_of(&self, node: &K) -> Option<K>;
}

impl<K, T: ParentLookup<K> + ?Sized> ParentLookup<K> for &T {
    #[inline]
    fn parent_of(&self, node: &K) -> Option<K> {
        (**self).parent_of(node)
    }
}

/// A parent provider for flat scenes; every node is a root.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    #[inline]
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

/// A single dispatch step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Dispatch<K> {
    /// Propagation phase for this step.
    pub phase: Phase,
    /// Node visited by this step.
    pub node: K,
}

impl<K> Dispatch<K> {
    /// A target step for `node`.
    pub const fn target(node: K) -> Self {
        Self {
            phase: Phase::Target,
            node,
        }
    }

    /// A bubble step for `node`.
    pub const fn bubble(node: K) -> Self {
        Self {
            phase: Phase::Bubble,
            node,
        }
    }
}
