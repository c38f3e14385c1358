// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Event State: small state machines that sit between raw input and handlers.
//!
//! - [`press`]: recognizes clicks and long clicks from down/move/up sequences, with a
//!   cancel-on-move pixel threshold.
//! - [`queue`]: a single-threaded task queue drained once per input message, so work
//!   triggered during a dispatch walk (performing a click) runs after the walk, and a
//!   drain that re-enters itself never recurses.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod press;
pub mod queue;
