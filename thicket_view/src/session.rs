// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Application context: theme and resources shared by windows.

use alloc::rc::Rc;
use core::fmt;

use kurbo::RoundedRect;

use crate::{Bitmap, Color, Image, RenderTarget, Style};

/// A custom background painter.
pub trait CustomBrush {
    /// Paint `shape` in the render target's current transform.
    fn paint(&self, target: &mut dyn RenderTarget, shape: RoundedRect);
}

/// One visual layer handed to the [`Theme`].
#[derive(Clone, Copy)]
pub enum Layer<'a> {
    /// Solid background.
    Fill(Color),
    /// Bitmap background.
    Bitmap(&'a Bitmap),
    /// Custom brush background.
    Brush(&'a dyn CustomBrush),
    /// Border outline.
    Border {
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f64,
    },
}

impl fmt::Debug for Layer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fill(c) => f.debug_tuple("Fill").field(c).finish(),
            Self::Bitmap(b) => f.debug_tuple("Bitmap").field(b).finish(),
            Self::Brush(_) => f.write_str("Brush"),
            Self::Border { color, width } => f
                .debug_struct("Border")
                .field("color", color)
                .field("width", width)
                .finish(),
        }
    }
}

/// Skin painter. Called once per layer per paint; never inspected by the core.
pub trait Theme {
    /// Paint `layer` into `shape` for an element in `style`.
    fn draw(
        &self,
        target: &mut dyn RenderTarget,
        layer: Layer<'_>,
        style: Style,
        shape: RoundedRect,
    );
}

/// Paints every layer as given, ignoring the style.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTheme;

impl Theme for PlainTheme {
    fn draw(
        &self,
        target: &mut dyn RenderTarget,
        layer: Layer<'_>,
        _style: Style,
        shape: RoundedRect,
    ) {
        match layer {
            Layer::Fill(color) => target.fill(shape, color),
            Layer::Bitmap(bitmap) => target.draw_bitmap(bitmap, shape.rect()),
            Layer::Brush(brush) => brush.paint(target, shape),
            Layer::Border { color, width } => target.stroke(shape, color, width),
        }
    }
}

/// Image lookup and caching.
///
/// A missing resource is `None` and simply not drawn.
pub trait ResourceManager {
    /// Look up an image by key.
    fn image(&self, key: &str) -> Option<Rc<Image>>;
}

/// A resource manager with nothing in it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResources;

impl ResourceManager for NoResources {
    fn image(&self, _key: &str) -> Option<Rc<Image>> {
        None
    }
}

/// Explicit application context passed to every window.
#[derive(Clone)]
pub struct Session {
    theme: Rc<dyn Theme>,
    resources: Rc<dyn ResourceManager>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Rc::new(PlainTheme), Rc::new(NoResources))
    }
}

impl Session {
    /// Create a session from a theme and a resource manager.
    pub fn new(theme: Rc<dyn Theme>, resources: Rc<dyn ResourceManager>) -> Self {
        Self { theme, resources }
    }

    /// The theme.
    pub fn theme(&self) -> &dyn Theme {
        &*self.theme
    }

    /// The resource manager.
    pub fn resources(&self) -> &dyn ResourceManager {
        &*self.resources
    }
}
