// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred single-threaded task queue.
//!
//! Tasks queued while a dispatch walk is in progress are run once the walk finishes.
//! Draining is explicit: [`TaskQueue::begin_drain`] returns `false` when a drain is
//! already running further up the stack, in which case the caller simply returns and
//! the outer drain picks the new tasks up. A handler that triggers another release
//! therefore never flushes the queue recursively.
//!
//! ```
//! use thicket_event_state::queue::TaskQueue;
//!
//! let mut q = TaskQueue::new();
//! q.push(1_u32);
//! q.push(2);
//!
//! let mut ran = Vec::new();
//! assert!(q.begin_drain());
//! // A nested flush attempt is refused.
//! assert!(!q.begin_drain());
//! while let Some(task) = q.pop() {
//!     ran.push(task);
//! }
//! q.end_drain();
//! assert_eq!(ran, [1, 2]);
//! ```

use alloc::collections::VecDeque;

/// FIFO of deferred tasks with an explicit drain scope.
#[derive(Clone, Debug)]
pub struct TaskQueue<T> {
    pending: VecDeque<T>,
    draining: bool,
}

impl<T> TaskQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            draining: false,
        }
    }

    /// Queue a task to run at the next drain.
    pub fn push(&mut self, task: T) {
        self.pending.push_back(task);
    }

    /// Enter the drain scope.
    ///
    /// Returns `false` if a drain is already in progress; the caller must not pop then.
    pub fn begin_drain(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }

    /// Pop the next task inside a drain scope.
    pub fn pop(&mut self) -> Option<T> {
        debug_assert!(self.draining, "pop outside of a drain scope");
        self.pending.pop_front()
    }

    /// Leave the drain scope.
    pub fn end_drain(&mut self) {
        self.draining = false;
    }

    /// Whether a drain is in progress.
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no tasks are queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop queued tasks that no longer satisfy `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.pending.retain(keep);
    }

    /// Drop all queued tasks.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
