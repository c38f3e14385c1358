// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animations referenced by elements.
//!
//! An animation is owned by whoever created it. Elements keep an [`AnimationHandle`], a weak
//! reference, and ask it for its current matrix on every paint. Dropping the animation simply
//! ends its effect.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use kurbo::Affine;

/// A time-driven visual transform.
pub trait Animation {
    /// Advance to `now_ms`.
    fn advance(&mut self, now_ms: u64);
    /// Current transform, applied on top of the element's absolute matrix.
    fn transform(&self) -> Affine;
    /// Whether the end state has been reached.
    fn is_finished(&self) -> bool;
    /// Jump to the end state.
    fn finish(&mut self);
}

/// Non-owning reference from an element to an animation.
#[derive(Clone)]
pub struct AnimationHandle(Weak<RefCell<dyn Animation>>);

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnimationHandle")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

impl AnimationHandle {
    /// Reference an animation without taking ownership.
    pub fn new<A: Animation + 'static>(animation: &Rc<RefCell<A>>) -> Self {
        let shared: Rc<RefCell<dyn Animation>> = animation.clone();
        Self(Rc::downgrade(&shared))
    }

    /// Whether the animation still exists.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Current transform, or `None` once the animation is gone.
    pub fn transform(&self) -> Option<Affine> {
        let rc = self.0.upgrade()?;
        let anim = rc.try_borrow().ok()?;
        Some(anim.transform())
    }

    /// Whether the animation is gone or finished.
    pub fn is_finished(&self) -> bool {
        self.0
            .upgrade()
            .and_then(|rc| rc.try_borrow().ok().map(|a| a.is_finished()))
            .unwrap_or(true)
    }

    pub(crate) fn advance(&self, now_ms: u64) {
        if let Some(rc) = self.0.upgrade()
            && let Ok(mut anim) = rc.try_borrow_mut()
        {
            anim.advance(now_ms);
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(rc) = self.0.upgrade()
            && let Ok(mut anim) = rc.try_borrow_mut()
        {
            anim.finish();
        }
    }
}

/// Linear interpolation between two affine transforms.
///
/// Starts on its first [`Animation::advance`].
#[derive(Clone, Debug)]
pub struct Tween {
    from: Affine,
    to: Affine,
    duration_ms: u64,
    start_ms: Option<u64>,
    progress: f64,
}

impl Tween {
    /// A tween from `from` to `to` over `duration_ms`.
    pub fn new(from: Affine, to: Affine, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            start_ms: None,
            progress: 0.0,
        }
    }

    /// Progress in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        self.progress
    }
}

impl Animation for Tween {
    #[allow(
        clippy::cast_precision_loss,
        reason = "millisecond durations are far below 2^52"
    )]
    fn advance(&mut self, now_ms: u64) {
        let start = *self.start_ms.get_or_insert(now_ms);
        self.progress = if self.duration_ms == 0 {
            1.0
        } else {
            let elapsed = now_ms.saturating_sub(start) as f64;
            (elapsed / self.duration_ms as f64).min(1.0)
        };
    }

    fn transform(&self) -> Affine {
        let a = self.from.as_coeffs();
        let b = self.to.as_coeffs();
        let t = self.progress;
        let mut out = [0.0; 6];
        for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
            *o = x + (y - x) * t;
        }
        Affine::new(out)
    }

    fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    fn finish(&mut self) {
        self.progress = 1.0;
    }
}
