// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The graphics device boundary.
//!
//! The window exclusively owns its [`Device`]. Elements only see a [`RenderTarget`] borrowed
//! for one paint call, and keep device resources as [`Bitmap`] handles tagged with the device
//! epoch they were created in. When the device is lost or resized the window broadcasts a
//! [`DeviceChange`] and every element drops its handles; they are recreated lazily on the next
//! paint.

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::{Affine, Rect, RoundedRect, Size};

use crate::DeviceError;

/// A straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// CPU-side image data, as handed out by a [`ResourceManager`](crate::ResourceManager).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels, row major.
    pub pixels: Rc<[u8]>,
}

impl Image {
    /// Wrap pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }
}

/// A device-bound bitmap handle.
///
/// Only valid for the device epoch it was created in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bitmap {
    id: u64,
    epoch: u64,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Create a handle. Called by [`RenderTarget`] implementations.
    pub const fn new(id: u64, epoch: u64, width: u32, height: u32) -> Self {
        Self {
            id,
            epoch,
            width,
            height,
        }
    }

    /// Device-specific identifier.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Device epoch this handle belongs to.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Pixel size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Why device-bound resources must be released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceChange {
    /// The device was lost and recreated.
    Lost,
    /// The render target was resized.
    Resized(Size),
    /// The window is being torn down; the device goes away next.
    Teardown,
}

/// Drawing surface for one frame.
///
/// Clips are interpreted in the transform that is current when they are pushed.
pub trait RenderTarget {
    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);
    /// Intersect the clip with a rounded rectangle.
    fn push_clip(&mut self, clip: RoundedRect);
    /// Undo the most recent [`RenderTarget::push_clip`].
    fn pop_clip(&mut self);
    /// Fill a shape.
    fn fill(&mut self, shape: RoundedRect, color: Color);
    /// Stroke a shape outline.
    fn stroke(&mut self, shape: RoundedRect, color: Color, width: f64);
    /// Upload an image; `None` if the device cannot create it.
    fn create_bitmap(&mut self, image: &Image) -> Option<Bitmap>;
    /// Draw a bitmap scaled into `dest`.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect);
}

/// A graphics device owned by a window.
pub trait Device {
    /// Start a frame and return its render target.
    fn begin_frame(&mut self) -> Result<&mut dyn RenderTarget, DeviceError>;
    /// Finish and present the frame.
    fn end_frame(&mut self) -> Result<(), DeviceError>;
    /// Recreate the device after a loss. Bumps the epoch on success.
    fn recreate(&mut self) -> Result<(), DeviceError>;
    /// Resize the backing surface.
    fn resize(&mut self, size: Size) -> Result<(), DeviceError>;
    /// Current device epoch.
    fn epoch(&self) -> u64;
}
