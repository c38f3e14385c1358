// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget behavior hooks and the contexts they run in.
//!
//! A [`Widget`] is the polymorphic part of a view. Every hook has a default, so a widget
//! implements only what it changes. While a hook runs, the widget is temporarily taken out of
//! the tree, which is why hooks receive the tree (or a context wrapping it) separately.

use alloc::vec::Vec;

use kurbo::{Point, RoundedRect};

use crate::paint;
use crate::{
    DeviceChange, ElementData, KeyEvent, Layer, PointerEvent, RenderTarget, Session, Style,
    ViewFlags, ViewId, ViewTree,
};

/// Behavior of a view.
pub trait Widget {
    /// Paint the element itself (children are painted by the tree afterwards).
    ///
    /// The default paints the background and border. Overrides usually call
    /// [`DrawCx::draw_item`] first and draw on top.
    fn draw(&mut self, cx: &mut DrawCx<'_>) {
        cx.draw_item();
    }

    /// Called after every [`ViewTree::set_layout_info`] on this view.
    ///
    /// The default re-applies each child's own stored box; containers that arrange their
    /// children override this.
    fn on_layout(&mut self, tree: &mut ViewTree, id: ViewId, _changed: bool) {
        tree.layout_children(id);
    }

    /// First refusal during hit testing: return `true` to take the pointer before any child.
    fn intercepts_pointer(&self, _element: &ElementData, _local: Point) -> bool {
        false
    }

    /// Bubbling pointer handler. Return `true` to consume the event.
    fn on_pointer(&mut self, _cx: &mut EventCx<'_>, _event: &PointerEvent) -> bool {
        false
    }

    /// Keyboard handler, only called on the focused view. Return `true` to consume the event.
    fn on_key(&mut self, _cx: &mut EventCx<'_>, _event: &KeyEvent) -> bool {
        false
    }

    /// A click was performed.
    fn on_click(&mut self, _cx: &mut EventCx<'_>) {}

    /// A long click was performed.
    fn on_long_click(&mut self, _cx: &mut EventCx<'_>) {}

    /// Focus moved to or away from this view.
    fn on_focus_changed(&mut self, _cx: &mut EventCx<'_>, _focused: bool) {}

    /// Device-bound resources owned by the widget must be released.
    fn on_device_change(&mut self, _change: DeviceChange) {}
}

/// A widget with only default behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl Widget for Plain {}

/// Context for input hooks.
///
/// Gives read access to the whole tree but only lets the handler change its own view's
/// state; structural changes belong in click listeners, which run after dispatch.
pub struct EventCx<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
    invalidated: &'a mut Vec<ViewId>,
}

impl core::fmt::Debug for EventCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventCx")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(
        tree: &'a mut ViewTree,
        id: ViewId,
        invalidated: &'a mut Vec<ViewId>,
    ) -> Self {
        Self {
            tree,
            id,
            invalidated,
        }
    }

    /// The view being handled.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Read access to the tree.
    pub fn tree(&self) -> &ViewTree {
        &*self.tree
    }

    /// The view's element data.
    pub fn element(&self) -> Option<&ElementData> {
        self.tree.element(self.id)
    }

    /// Mutable element data; the view is repainted afterwards.
    pub fn element_mut(&mut self) -> Option<&mut ElementData> {
        self.invalidated.push(self.id);
        self.tree.element_mut(self.id)
    }

    /// The view's flags, empty if it is gone.
    pub fn flags(&self) -> ViewFlags {
        self.tree.flags(self.id).unwrap_or(ViewFlags::empty())
    }

    /// Add flags and re-derive the style.
    pub fn add_flags(&mut self, flags: ViewFlags) {
        if self.tree.add_flags(self.id, flags) {
            self.invalidated.push(self.id);
        }
    }

    /// Remove flags and re-derive the style.
    pub fn remove_flags(&mut self, flags: ViewFlags) {
        if self.tree.remove_flags(self.id, flags) {
            self.invalidated.push(self.id);
        }
    }

    /// Set the style; only clickable views change style.
    pub fn set_style(&mut self, style: Style) -> bool {
        let changed = self.tree.set_style(self.id, style);
        if changed {
            self.invalidated.push(self.id);
        }
        changed
    }

    /// Schedule a repaint of this view.
    pub fn request_paint(&mut self) {
        self.invalidated.push(self.id);
    }

    /// Map a device point into this view's coordinates.
    pub fn to_local(&self, point: Point) -> Option<Point> {
        self.tree.device_to_local(self.id, point)
    }

    /// Whether a device point lies inside this view.
    pub fn contains(&self, point: Point) -> bool {
        self.tree.contains_device_point(self.id, point)
    }
}

/// Context for [`Widget::draw`].
///
/// The render target's transform is the element's paint matrix, so drawing happens in the
/// element's own coordinates.
pub struct DrawCx<'a> {
    pub(crate) target: &'a mut dyn RenderTarget,
    pub(crate) element: &'a mut ElementData,
    pub(crate) session: &'a Session,
    pub(crate) epoch: u64,
    id: ViewId,
}

impl core::fmt::Debug for DrawCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawCx")
            .field("id", &self.id)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl<'a> DrawCx<'a> {
    pub(crate) fn new(
        target: &'a mut dyn RenderTarget,
        element: &'a mut ElementData,
        session: &'a Session,
        epoch: u64,
        id: ViewId,
    ) -> Self {
        Self {
            target,
            element,
            session,
            epoch,
            id,
        }
    }

    /// The view being painted.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The element being painted.
    pub fn element(&self) -> &ElementData {
        &*self.element
    }

    /// The render target, borrowed for this call only.
    pub fn target(&mut self) -> &mut dyn RenderTarget {
        &mut *self.target
    }

    /// The session.
    pub fn session(&self) -> &Session {
        self.session
    }

    /// The element's shape in its own coordinates.
    pub fn shape(&self) -> RoundedRect {
        self.element.shape()
    }

    /// Hand one layer to the theme, using the element's style.
    pub fn draw_layer(&mut self, layer: Layer<'_>, shape: RoundedRect) {
        let style = self.element.style();
        self.session
            .theme()
            .draw(&mut *self.target, layer, style, shape);
    }

    /// Default element painting: background, then border.
    pub fn draw_item(&mut self) {
        paint::draw_item(self);
    }
}
