// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element data shared by every view kind.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use kurbo::{Affine, RoundedRect, RoundedRectRadii};

use crate::animation::AnimationHandle;
use crate::{Bitmap, Color, CustomBrush, LayoutBox, Style, TransformDelta, ViewFlags};

/// Widest border the toolkit draws.
pub const MAX_BORDER_WIDTH: f64 = 10.0;

/// What is painted behind an element. Setting one replaces the others.
#[derive(Clone, Default)]
pub enum Background {
    /// Nothing.
    #[default]
    None,
    /// Solid color.
    Color(Color),
    /// Image looked up in the session's resource manager by key.
    Image(String),
    /// Custom painter.
    Brush(Rc<dyn CustomBrush>),
}

impl fmt::Debug for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Color(c) => f.debug_tuple("Color").field(c).finish(),
            Self::Image(key) => f.debug_tuple("Image").field(key).finish(),
            Self::Brush(_) => f.write_str("Brush"),
        }
    }
}

/// Border outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Border {
    /// Stroke color.
    pub color: Color,
    width: f64,
}

impl Border {
    /// A border; the width is clamped to `0..=MAX_BORDER_WIDTH`.
    pub fn new(color: Color, width: f64) -> Self {
        let width = if width.is_nan() { 0.0 } else { width.clamp(0.0, MAX_BORDER_WIDTH) };
        Self { color, width }
    }

    /// Stroke width.
    pub const fn width(&self) -> f64 {
        self.width
    }
}

/// State and appearance of one element.
#[derive(Debug, Default)]
pub struct ElementData {
    pub(crate) layout: LayoutBox,
    pub(crate) flags: ViewFlags,
    pub(crate) style: Style,
    pub(crate) hovered: bool,
    ident: u32,
    tag: u64,
    background: Background,
    border: Option<Border>,
    corner_radii: RoundedRectRadii,
    transform: TransformDelta,
    local_matrix: Affine,
    pub(crate) animation: Option<AnimationHandle>,
    pub(crate) bitmap: Option<Bitmap>,
}

impl ElementData {
    /// Layout box.
    pub fn layout(&self) -> &LayoutBox {
        &self.layout
    }

    /// Layout box for changing limits and margins.
    ///
    /// Position and size are written through [`ViewTree::set_layout_info`](crate::ViewTree::set_layout_info).
    pub fn layout_mut(&mut self) -> &mut LayoutBox {
        &mut self.layout
    }

    /// State flags.
    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    /// Current style.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether the pointer is over this element.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// User identifier, used by [`ViewTree::find_by_id`](crate::ViewTree::find_by_id).
    pub fn ident(&self) -> u32 {
        self.ident
    }

    /// Set the user identifier.
    pub fn set_ident(&mut self, ident: u32) {
        self.ident = ident;
    }

    /// Opaque user tag.
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Set the opaque user tag.
    pub fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }

    /// Background.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Replace the background. Any cached bitmap is dropped.
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        self.bitmap = None;
    }

    /// Border, if any.
    pub fn border(&self) -> Option<Border> {
        self.border
    }

    /// Set or clear the border.
    pub fn set_border(&mut self, border: Option<Border>) {
        self.border = border;
    }

    /// Corner radii, used with [`ViewFlags::ROUND_CORNER`].
    pub fn corner_radii(&self) -> RoundedRectRadii {
        self.corner_radii
    }

    /// Set corner radii.
    pub fn set_corner_radii(&mut self, radii: impl Into<RoundedRectRadii>) {
        self.corner_radii = radii.into();
    }

    /// Visual transform deltas.
    pub fn transform(&self) -> &TransformDelta {
        &self.transform
    }

    /// Replace the visual transform deltas.
    pub fn set_transform(&mut self, transform: TransformDelta) {
        self.transform = transform;
        self.local_matrix = transform.matrix();
    }

    /// Cached local matrix of [`ElementData::transform`].
    pub fn local_matrix(&self) -> Affine {
        self.local_matrix
    }

    /// Shape the element paints into, in its own coordinates.
    pub fn shape(&self) -> RoundedRect {
        let rect = self.layout.local_rect();
        if self.flags.contains(ViewFlags::ROUND_CORNER) {
            RoundedRect::from_rect(rect, self.corner_radii)
        } else {
            RoundedRect::from_rect(rect, 0.0)
        }
    }

    /// Device bitmap cached for an image background.
    pub fn cached_bitmap(&self) -> Option<Bitmap> {
        self.bitmap
    }

    /// Drop device-bound resources.
    pub(crate) fn release_device_resources(&mut self) {
        self.bitmap = None;
    }
}
