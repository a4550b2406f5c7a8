// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use float_cmp::ApproxEqUlps;
use tiny_skia::{Point, Transform};

/// An integer rectangle.
///
/// Unlike `tiny_skia::IntRect`, can be empty.
/// All empty rectangles are equal.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct IntRect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl IntRect {
    /// An empty rectangle.
    pub const EMPTY: IntRect = IntRect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Creates a new `IntRect` from position and size.
    ///
    /// Zero width or height produces an empty rectangle.
    /// The size is clamped so that the right and bottom edges fit into `i32`.
    #[inline]
    pub fn from_xywh(x: i32, y: i32, width: u32, height: u32) -> Self {
        let width = width.min((i32::MAX as i64 - x as i64) as u32);
        let height = height.min((i32::MAX as i64 - y as i64) as u32);
        if width == 0 || height == 0 {
            IntRect::EMPTY
        } else {
            IntRect {
                x,
                y,
                width,
                height,
            }
        }
    }

    /// Creates a new `IntRect` from edges.
    #[inline]
    pub fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        if right <= left || bottom <= top {
            IntRect::EMPTY
        } else {
            IntRect::from_xywh(
                left,
                top,
                (right as i64 - left as i64) as u32,
                (bottom as i64 - top as i64) as u32,
            )
        }
    }

    /// Returns rect's X position.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Returns rect's Y position.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Returns rect's width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns rect's height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns rect's left edge.
    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Returns rect's top edge.
    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Returns rect's right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        (self.x as i64 + self.width as i64) as i32
    }

    /// Returns rect's bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        (self.y as i64 + self.height as i64) as i32
    }

    /// Checks that the rect has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the number of pixels covered by the rect.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns an intersection of two rects.
    pub fn intersect(&self, other: &IntRect) -> IntRect {
        if self.is_empty() || other.is_empty() {
            return IntRect::EMPTY;
        }

        IntRect::from_ltrb(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }

    /// Returns a rect that covers both rects.
    pub fn union(&self, other: &IntRect) -> IntRect {
        if self.is_empty() {
            return *other;
        }

        if other.is_empty() {
            return *self;
        }

        IntRect::from_ltrb(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grows the rect by the specified amount on each side.
    ///
    /// Negative values shrink the rect. An empty rect stays empty.
    pub fn grow(&self, dx: i32, dy: i32) -> IntRect {
        if self.is_empty() {
            return IntRect::EMPTY;
        }

        IntRect::from_ltrb(
            self.left().saturating_sub(dx),
            self.top().saturating_sub(dy),
            self.right().saturating_add(dx),
            self.bottom().saturating_add(dy),
        )
    }

    /// Translates the rect by the specified offset.
    pub fn translate(&self, dx: i32, dy: i32) -> IntRect {
        if self.is_empty() {
            return IntRect::EMPTY;
        }

        IntRect::from_ltrb(
            self.left().saturating_add(dx),
            self.top().saturating_add(dy),
            self.right().saturating_add(dx),
            self.bottom().saturating_add(dy),
        )
    }

    /// Checks that `other` is fully inside this rect.
    pub fn contains(&self, other: &IntRect) -> bool {
        if other.is_empty() {
            return true;
        }

        self.left() <= other.left()
            && self.top() <= other.top()
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Converts into `Bounds`.
    #[inline]
    pub fn to_bounds(&self) -> Bounds {
        if self.is_empty() {
            Bounds::EMPTY
        } else {
            Bounds::from_ltrb(
                self.left() as f32,
                self.top() as f32,
                self.right() as f32,
                self.bottom() as f32,
            )
        }
    }

    /// Converts into `tiny_skia::IntRect`.
    ///
    /// Returns `None` for an empty rect.
    #[inline]
    pub fn to_skia(&self) -> Option<tiny_skia::IntRect> {
        tiny_skia::IntRect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// A floating point bounding box.
///
/// A box with `max < min` on any axis is empty.
/// Boxes with a zero size are not empty.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::EMPTY
    }
}

impl Bounds {
    /// An empty bounding box.
    pub const EMPTY: Bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: -1.0,
        max_y: -1.0,
    };

    /// Creates a new `Bounds` from edges.
    #[inline]
    pub fn from_ltrb(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        if max_x < min_x || max_y < min_y {
            Bounds::EMPTY
        } else {
            Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            }
        }
    }

    /// Creates a new `Bounds` from position and size.
    #[inline]
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Bounds::from_ltrb(x, y, x + width, y + height)
    }

    /// Returns the min X edge.
    #[inline]
    pub fn min_x(&self) -> f32 {
        self.min_x
    }

    /// Returns the min Y edge.
    #[inline]
    pub fn min_y(&self) -> f32 {
        self.min_y
    }

    /// Returns the max X edge.
    #[inline]
    pub fn max_x(&self) -> f32 {
        self.max_x
    }

    /// Returns the max Y edge.
    #[inline]
    pub fn max_y(&self) -> f32 {
        self.max_y
    }

    /// Returns width. Zero for an empty box.
    #[inline]
    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Returns height. Zero for an empty box.
    #[inline]
    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Checks that the box is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Returns a box covering both boxes.
    pub fn union(&self, other: &Bounds) -> Bounds {
        if self.is_empty() {
            return *other;
        }

        if other.is_empty() {
            return *self;
        }

        Bounds::from_ltrb(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Returns an intersection of two boxes.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        if self.is_empty() || other.is_empty() {
            return Bounds::EMPTY;
        }

        Bounds::from_ltrb(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }

    /// Checks that two boxes overlap or touch.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Grows the box by the specified amount on each side.
    pub fn grow(&self, h: f32, v: f32) -> Bounds {
        if self.is_empty() {
            return Bounds::EMPTY;
        }

        Bounds::from_ltrb(
            self.min_x - h,
            self.min_y - v,
            self.max_x + h,
            self.max_y + v,
        )
    }

    /// Translates the box.
    pub fn translate(&self, dx: f32, dy: f32) -> Bounds {
        if self.is_empty() {
            return Bounds::EMPTY;
        }

        Bounds {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Returns a bounding box of the transformed box.
    pub fn transform(&self, ts: &Transform) -> Bounds {
        if self.is_empty() || ts.is_identity() {
            return *self;
        }

        let corners = [
            ts.map(Point::from_xy(self.min_x, self.min_y)),
            ts.map(Point::from_xy(self.max_x, self.min_y)),
            ts.map(Point::from_xy(self.max_x, self.max_y)),
            ts.map(Point::from_xy(self.min_x, self.max_y)),
        ];

        points_bounds(&corners)
    }

    /// Returns the smallest integer rect containing this box.
    ///
    /// Boxes with a zero area produce an empty rect.
    pub fn round_out(&self) -> IntRect {
        if self.is_empty() {
            return IntRect::EMPTY;
        }

        IntRect::from_ltrb(
            self.min_x.floor() as i32,
            self.min_y.floor() as i32,
            self.max_x.ceil() as i32,
            self.max_y.ceil() as i32,
        )
    }

    /// Compares two boxes using ULPs.
    pub fn fuzzy_eq(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() == other.is_empty();
        }

        self.min_x.approx_eq_ulps(&other.min_x, 4)
            && self.min_y.approx_eq_ulps(&other.min_y, 4)
            && self.max_x.approx_eq_ulps(&other.max_x, 4)
            && self.max_y.approx_eq_ulps(&other.max_y, 4)
    }
}

/// Returns a bounding box of the points.
///
/// Non-finite points are ignored.
pub(crate) fn points_bounds(points: &[Point]) -> Bounds {
    let mut bounds = Bounds::EMPTY;
    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }

        bounds = bounds.union(&Bounds::from_ltrb(p.x, p.y, p.x, p.y));
    }

    bounds
}

/// Returns a point with undefined coordinates.
///
/// Used as a result of mapping through effects that have no defined point mapping.
#[inline]
pub fn undefined_point() -> Point {
    Point::from_xy(f32::NAN, f32::NAN)
}

/// Checks that the point was produced by [`undefined_point`].
#[inline]
pub fn is_undefined(p: Point) -> bool {
    p.x.is_nan() || p.y.is_nan()
}

pub(crate) trait TransformExt {
    fn map(&self, p: Point) -> Point;
    fn is_scale_translate_only(&self) -> bool;
    fn is_integer_translate(&self) -> bool;
}

impl TransformExt for Transform {
    #[inline]
    fn map(&self, p: Point) -> Point {
        Point::from_xy(
            self.sx * p.x + self.kx * p.y + self.tx,
            self.ky * p.x + self.sy * p.y + self.ty,
        )
    }

    #[inline]
    fn is_scale_translate_only(&self) -> bool {
        self.kx == 0.0 && self.ky == 0.0
    }

    #[inline]
    fn is_integer_translate(&self) -> bool {
        self.sx == 1.0
            && self.sy == 1.0
            && self.kx == 0.0
            && self.ky == 0.0
            && self.tx.fract() == 0.0
            && self.ty.fract() == 0.0
    }
}

/// A projective 3x3 transform.
///
/// Stored in row-major order and applied to column vectors `(x, y, 1)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ProjectiveTransform {
    m: [f32; 9],
}

impl Default for ProjectiveTransform {
    fn default() -> Self {
        ProjectiveTransform::identity()
    }
}

impl ProjectiveTransform {
    /// Creates an identity transform.
    #[inline]
    pub fn identity() -> Self {
        ProjectiveTransform {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Creates a projective transform from an affine one.
    #[inline]
    pub fn from_affine(ts: &Transform) -> Self {
        ProjectiveTransform {
            m: [ts.sx, ts.kx, ts.tx, ts.ky, ts.sy, ts.ty, 0.0, 0.0, 1.0],
        }
    }

    /// Returns the matrix.
    #[inline]
    pub fn matrix(&self) -> &[f32; 9] {
        &self.m
    }

    /// Creates a transform mapping a unit square onto a quad.
    ///
    /// Quad points are upper-left, upper-right, lower-right and lower-left.
    /// Returns `None` for a degenerate quad.
    pub fn square_to_quad(quad: &[Point; 4]) -> Option<Self> {
        let [p0, p1, p2, p3] = *quad;

        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;

        let m = if dx3 == 0.0 && dy3 == 0.0 {
            [
                p1.x - p0.x,
                p3.x - p0.x,
                p0.x,
                p1.y - p0.y,
                p3.y - p0.y,
                p0.y,
                0.0,
                0.0,
                1.0,
            ]
        } else {
            let dx1 = p1.x - p2.x;
            let dx2 = p3.x - p2.x;
            let dy1 = p1.y - p2.y;
            let dy2 = p3.y - p2.y;

            let det = dx1 * dy2 - dx2 * dy1;
            if det == 0.0 {
                return None;
            }

            let g = (dx3 * dy2 - dx2 * dy3) / det;
            let h = (dx1 * dy3 - dx3 * dy1) / det;
            [
                p1.x - p0.x + g * p1.x,
                p3.x - p0.x + h * p3.x,
                p0.x,
                p1.y - p0.y + g * p1.y,
                p3.y - p0.y + h * p3.y,
                p0.y,
                g,
                h,
                1.0,
            ]
        };

        let ts = ProjectiveTransform { m };
        if ts.determinant().approx_eq_ulps(&0.0, 4) {
            None
        } else {
            Some(ts)
        }
    }

    /// Creates a transform mapping a rect onto a quad.
    pub fn rect_to_quad(rect: &Bounds, quad: &[Point; 4]) -> Option<Self> {
        if rect.is_empty() || rect.width() == 0.0 || rect.height() == 0.0 {
            return None;
        }

        let to_unit = Transform::from_row(
            1.0 / rect.width(),
            0.0,
            0.0,
            1.0 / rect.height(),
            -rect.min_x() / rect.width(),
            -rect.min_y() / rect.height(),
        );

        let q = ProjectiveTransform::square_to_quad(quad)?;
        Some(q.concat(&ProjectiveTransform::from_affine(&to_unit)))
    }

    /// Returns `self * other`, i.e. `other` is applied first.
    pub fn concat(&self, other: &ProjectiveTransform) -> ProjectiveTransform {
        let a = &self.m;
        let b = &other.m;
        let mut m = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                m[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }

        ProjectiveTransform { m }
    }

    fn determinant(&self) -> f32 {
        let m = &self.m;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// Returns an inverted transform.
    pub fn invert(&self) -> Option<ProjectiveTransform> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let m = &self.m;
        let inv = [
            (m[4] * m[8] - m[5] * m[7]) / det,
            (m[2] * m[7] - m[1] * m[8]) / det,
            (m[1] * m[5] - m[2] * m[4]) / det,
            (m[5] * m[6] - m[3] * m[8]) / det,
            (m[0] * m[8] - m[2] * m[6]) / det,
            (m[2] * m[3] - m[0] * m[5]) / det,
            (m[3] * m[7] - m[4] * m[6]) / det,
            (m[1] * m[6] - m[0] * m[7]) / det,
            (m[0] * m[4] - m[1] * m[3]) / det,
        ];

        Some(ProjectiveTransform { m: inv })
    }

    /// Maps a point.
    ///
    /// Returns an undefined point when the point is mapped to infinity.
    pub fn map_point(&self, p: Point) -> Point {
        let m = &self.m;
        let w = m[6] * p.x + m[7] * p.y + m[8];
        if w.abs() <= f32::EPSILON {
            return undefined_point();
        }

        Point::from_xy(
            (m[0] * p.x + m[1] * p.y + m[2]) / w,
            (m[3] * p.x + m[4] * p.y + m[5]) / w,
        )
    }

    /// Returns a bounding box of the mapped box.
    pub fn map_bounds(&self, bounds: &Bounds) -> Bounds {
        if bounds.is_empty() {
            return Bounds::EMPTY;
        }

        points_bounds(&[
            self.map_point(Point::from_xy(bounds.min_x(), bounds.min_y())),
            self.map_point(Point::from_xy(bounds.max_x(), bounds.min_y())),
            self.map_point(Point::from_xy(bounds.max_x(), bounds.max_y())),
            self.map_point(Point::from_xy(bounds.min_x(), bounds.max_y())),
        ])
    }
}
