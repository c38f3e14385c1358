// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting: element layers, clipping, and child composition.

use alloc::vec::Vec;

use kurbo::{Affine, Rect, RoundedRect};
use log::trace;

use crate::transform::transform_rect_bbox;
use crate::{
    Background, Bitmap, DrawCx, Layer, RenderTarget, Session, ViewFlags, ViewId, ViewTree,
};

/// State shared by one paint pass.
pub(crate) struct PaintCx<'a> {
    pub(crate) target: &'a mut dyn RenderTarget,
    pub(crate) session: &'a Session,
    pub(crate) epoch: u64,
    /// Views painted with an unfinished animation.
    pub(crate) animating: &'a mut Vec<ViewId>,
}

/// Paint `id` and its subtree. `parent_paint` is the parent's paint matrix.
///
/// Hidden and detached views paint nothing. The target's transform is left at identity.
pub(crate) fn paint_view(
    tree: &mut ViewTree,
    id: ViewId,
    parent_paint: Affine,
    cx: &mut PaintCx<'_>,
) {
    let Some(flags) = tree.flags(id) else {
        return;
    };
    if !flags.contains(ViewFlags::VISIBLE) || !tree.is_attached(id) {
        return;
    }
    let Some(paint) = tree.paint_matrix_in(id, parent_paint) else {
        return;
    };

    cx.target.set_transform(paint);
    let clip = flags.intersects(ViewFlags::ROUND_CORNER | ViewFlags::CLIP_VIEW);
    if let Some((element, slot)) = tree.widget_parts(id) {
        if clip {
            cx.target.push_clip(element.shape());
        }
        let mut dcx = DrawCx::new(&mut *cx.target, element, cx.session, cx.epoch, id);
        match slot.take() {
            Some(mut widget) => {
                widget.draw(&mut dcx);
                *slot = Some(widget);
            }
            None => dcx.draw_item(),
        }
        if clip {
            cx.target.pop_clip();
        }
        if let Some(anim) = &element.animation
            && !anim.is_finished()
        {
            cx.animating.push(id);
        }
    }
    cx.target.set_transform(Affine::IDENTITY);

    draw_children(tree, id, paint, cx);
}

/// Paint a container's children in sequence order, clipped to the container.
///
/// Children whose bounds miss the container are skipped. A container with
/// [`ViewFlags::ALWAYS_PAINT`] neither clips nor culls, so its children may overdraw siblings.
pub(crate) fn draw_children(
    tree: &mut ViewTree,
    id: ViewId,
    paint: Affine,
    cx: &mut PaintCx<'_>,
) {
    let children = tree.children(id).to_vec();
    if children.is_empty() {
        return;
    }
    let (Some(flags), Some(element)) = (tree.flags(id), tree.element(id)) else {
        return;
    };
    let local = element.layout().local_rect();
    let always = flags.contains(ViewFlags::ALWAYS_PAINT);
    let bounds = transform_rect_bbox(paint, local);

    if !always {
        cx.target.set_transform(paint);
        cx.target.push_clip(RoundedRect::from_rect(local, 0.0));
    }
    for child in children {
        if !always && !overlaps_child(tree, child, paint, bounds) {
            trace!("culled {child:?}");
            continue;
        }
        paint_view(tree, child, paint, cx);
    }
    if !always {
        cx.target.set_transform(paint);
        cx.target.pop_clip();
        cx.target.set_transform(Affine::IDENTITY);
    }
}

fn overlaps_child(tree: &ViewTree, child: ViewId, parent_paint: Affine, bounds: Rect) -> bool {
    let (Some(e), Some(m)) = (
        tree.element(child),
        tree.paint_matrix_in(child, parent_paint),
    ) else {
        return false;
    };
    let child_bounds = transform_rect_bbox(m, e.layout().local_rect());
    bounds.intersect(child_bounds).area() > 0.0
}

/// Default element painting: background, then border.
///
/// A background that cannot be resolved (missing image, failed upload) is skipped; the
/// border is still drawn.
pub(crate) fn draw_item(cx: &mut DrawCx<'_>) {
    let shape = cx.shape();
    match cx.element.background().clone() {
        Background::None => {}
        Background::Color(color) => cx.draw_layer(Layer::Fill(color), shape),
        Background::Image(key) => {
            if let Some(bitmap) = ensure_bitmap(cx, &key) {
                cx.draw_layer(Layer::Bitmap(&bitmap), shape);
            }
        }
        Background::Brush(brush) => cx.draw_layer(Layer::Brush(&*brush), shape),
    }
    if let Some(border) = cx.element.border()
        && border.width() > 0.0
    {
        cx.draw_layer(
            Layer::Border {
                color: border.color,
                width: border.width(),
            },
            shape,
        );
    }
}

/// The element's bitmap for the current device epoch, created on demand.
fn ensure_bitmap(cx: &mut DrawCx<'_>, key: &str) -> Option<Bitmap> {
    if let Some(bitmap) = cx.element.bitmap
        && bitmap.epoch() == cx.epoch
    {
        return Some(bitmap);
    }
    cx.element.bitmap = None;
    let Some(image) = cx.session.resources().image(key) else {
        trace!("{:?}: no image for {key:?}", cx.id());
        return None;
    };
    let bitmap = cx.target.create_bitmap(&image)?;
    cx.element.bitmap = Some(bitmap);
    Some(bitmap)
}
