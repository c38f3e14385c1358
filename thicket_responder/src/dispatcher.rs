// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher helper: walk a dispatch sequence and honor stop outcomes.
//!
//! - [`Outcome`] only controls propagation (`Continue` vs `Stop`).
//! - The return value from [`run`] reports where propagation stopped (if at all), which is
//!   how the window learns which node consumed a pointer event.
//! - Anything else ("pressed", "click pending") lives on the event payload you pass in.
//!
//! Handlers must not mutate the tree the sequence was built from; work that does
//! (for example performing a click) is queued and run after the walk completes.
//!
//! ```
//! use thicket_responder::dispatcher;
//! use thicket_responder::types::{Dispatch, Outcome, Phase};
//!
//! let seq = vec![
//!     Dispatch::target(3_u32),
//!     Dispatch::bubble(2),
//!     Dispatch::bubble(1),
//! ];
//! let mut seen = Vec::new();
//! let stop_at = dispatcher::run(&seq, &mut seen, |d, seen| {
//!     seen.push((d.phase, d.node));
//!     Outcome::Continue
//! });
//! assert!(stop_at.is_none());
//! assert_eq!(seen.len(), 3);
//! ```

use crate::types::{Dispatch, Outcome};

/// Run a handler over a dispatch sequence and honor stop outcomes.
///
/// Returns `None` if the full sequence was visited, or the entry whose handler returned
/// [`Outcome::Stop`].
pub fn run<'a, K, E>(
    seq: &'a [Dispatch<K>],
    event: &mut E,
    mut handler: impl FnMut(&Dispatch<K>, &mut E) -> Outcome,
) -> Option<&'a Dispatch<K>> {
    for d in seq {
        match handler(d, event) {
            Outcome::Continue => {}
            Outcome::Stop => return Some(d),
        }
    }
    None
}
