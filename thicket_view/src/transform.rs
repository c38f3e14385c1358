// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual transforms layered on top of the layout box.

use kurbo::{Affine, Point, Rect, Vec2};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Translate, scale and rotate deltas applied on top of an element's layout position.
///
/// These never change the layout box; they only move what is painted and hit tested.
/// Centers are in the element's own coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDelta {
    /// Offset applied after scaling and rotating.
    pub translate: Vec2,
    /// Horizontal and vertical scale factors.
    pub scale: Vec2,
    /// Fixed point of the scale.
    pub scale_center: Point,
    /// Rotation in radians.
    pub rotation: f64,
    /// Fixed point of the rotation.
    pub rotation_center: Point,
}

impl Default for TransformDelta {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformDelta {
    /// No visual transform.
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: Vec2::new(1.0, 1.0),
        scale_center: Point::ORIGIN,
        rotation: 0.0,
        rotation_center: Point::ORIGIN,
    };

    /// Builder: offset.
    #[must_use]
    pub fn with_translate(mut self, translate: Vec2) -> Self {
        self.translate = translate;
        self
    }

    /// Builder: scale about a center.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2, center: Point) -> Self {
        self.scale = scale;
        self.scale_center = center;
        self
    }

    /// Builder: rotation about a center.
    #[must_use]
    pub fn with_rotation(mut self, radians: f64, center: Point) -> Self {
        self.rotation = radians;
        self.rotation_center = center;
        self
    }

    /// The local matrix: scale first, then rotate, then translate.
    pub fn matrix(&self) -> Affine {
        let c = self.scale_center.to_vec2();
        let scale = Affine::translate(c)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-c);
        let rotate = if self.rotation == 0.0 {
            Affine::IDENTITY
        } else {
            Affine::rotate_about(self.rotation, self.rotation_center)
        };
        Affine::translate(self.translate) * rotate * scale
    }
}

/// Invert `affine`, or `None` if it is singular or not finite.
pub(crate) fn checked_inverse(affine: Affine) -> Option<Affine> {
    let det = affine.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return None;
    }
    let inv = affine.inverse();
    inv.is_finite().then_some(inv)
}

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in device space.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}
