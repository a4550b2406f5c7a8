// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::{Point, Transform};

use super::{first_image, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::renderer::AccelType;
use crate::{Bounds, FilterContext, ImageData, IntRect};

/// Moves the input by an integer offset, in user space.
///
/// Never touches pixels: the offset is folded into the input transform.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Offset {
    x: i32,
    y: i32,
}

impl Offset {
    /// Creates a new offset.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Offset { x, y }
    }

    /// Returns the horizontal offset.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Returns the vertical offset.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Sets the offset.
    #[inline]
    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    fn input_transform(&self, ts: &Transform) -> Transform {
        if self.x == 0 && self.y == 0 {
            *ts
        } else {
            ts.pre_translate(self.x as f32, self.y as f32)
        }
    }
}

impl EffectImpl for Offset {
    fn render_state(&self, _: &Inputs, ts: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::Custom(crate::render_state::CustomRenderState {
            input_transform: self.input_transform(ts),
            result_transform: Transform::identity(),
        })
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        inputs.bounds(0, &self.input_transform(ts))
    }

    fn filter(
        &self,
        inputs: &Inputs,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
    ) -> ImageData {
        inputs.filter(0, fctx, &self.input_transform(ts), clip)
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        _: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        first_image(fctx, images)
    }

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        let p = inputs.transform(0, p);
        Point::from_xy(p.x + self.x as f32, p.y + self.y as f32)
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.untransform(0, Point::from_xy(p.x - self.x as f32, p.y - self.y as f32))
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let mut regions = inputs.dirty_regions(0, pool);
        regions.translate(self.x as f32, self.y as f32);
        regions
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        inputs.reduces_opaque_pixels(0)
    }

    fn accel_type(&self, _: &FilterContext) -> AccelType {
        AccelType::Intrinsic
    }
}
