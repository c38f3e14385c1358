// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Responder: deterministic propagation paths for a retained view tree.
//!
//! ## Overview
//!
//! This crate turns a single routed node into the ordered sequence of steps an input
//! event visits: the target first, then each ancestor up to the root (bubble).
//! It does not perform hit testing. The view tree finds the topmost touched node and
//! hands it to a [`Router`](crate::router::Router), which reconstructs the ancestor
//! path through a [`ParentLookup`](crate::types::ParentLookup).
//!
//! ## Event target pinning
//!
//! When a node is pinned (for example the node that received a button-down), the router
//! routes to the pinned node regardless of the fresh hit, so that matching down/up pairs
//! reach the same node even if the pointer leaves its bounds.
//!
//! ## Layering
//!
//! The router only computes the traversal order. [`dispatcher::run`] executes handlers
//! over the sequence and stops at the first [`Outcome::Stop`](crate::types::Outcome::Stop).
//! Consumption semantics, default actions and deferred work live one level up, in the window.
//!
//! ```
//! use thicket_responder::dispatcher;
//! use thicket_responder::router::Router;
//! use thicket_responder::types::{Outcome, ParentLookup, Phase};
//!
//! struct Parents;
//! impl ParentLookup<u32> for Parents {
//!     fn parent_of(&self, node: &u32) -> Option<u32> {
//!         if *node > 1 { Some(node - 1) } else { None }
//!     }
//! }
//!
//! let router = Router::new(Parents);
//! let seq = router.bubble(3);
//! let mut consumed_by = None;
//! dispatcher::run(&seq, &mut consumed_by, |d, by| {
//!     if d.node == 2 {
//!         *by = Some(d.node);
//!         Outcome::Stop
//!     } else {
//!         Outcome::Continue
//!     }
//! });
//! assert_eq!(consumed_by, Some(2));
//! assert_eq!(seq[0].phase, Phase::Target);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
pub mod router;
pub mod types;
