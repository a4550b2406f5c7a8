// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::{Point, Transform};

use super::{first_image, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::geom::undefined_point;
use crate::graph::Inputs;
use crate::render_state::{PaddedRenderState, RenderState};
use crate::{Bounds, FilterContext, ImageData, IntRect};

/// An inverted alpha mask of the input, with a fringe around it.
///
/// Pixels outside of the input become opaque.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InvertMask {
    pad: u32,
    offset_x: i32,
    offset_y: i32,
}

impl Default for InvertMask {
    fn default() -> Self {
        InvertMask {
            pad: 10,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

impl InvertMask {
    /// Creates a new mask with the provided fringe.
    pub fn new(pad: u32) -> Self {
        InvertMask {
            pad,
            ..InvertMask::default()
        }
    }

    /// Returns the fringe size.
    #[inline]
    pub fn pad(&self) -> u32 {
        self.pad
    }

    /// Sets the fringe size.
    #[inline]
    pub fn set_pad(&mut self, pad: u32) {
        self.pad = pad;
    }

    /// Returns the mask offset.
    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Sets the mask offset.
    #[inline]
    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset_x = x;
        self.offset_y = y;
    }

    fn pad_i32(&self) -> i32 {
        self.pad.min(i32::MAX as u32) as i32
    }

    fn padded_state(&self) -> RenderState {
        RenderState::Padded(PaddedRenderState {
            pad_x: self.pad_i32(),
            pad_y: self.pad_i32(),
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        })
    }
}

impl EffectImpl for InvertMask {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        self.padded_state()
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        let pad = self.pad as f32;
        inputs
            .bounds(0, ts)
            .grow(pad, pad)
            .translate(self.offset_x as f32, self.offset_y as f32)
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        let input = first_image(fctx, images).untransform(fctx, None);
        if !input.validate(fctx) {
            return input;
        }

        let in_rect = input.untransformed_bounds();
        let mut region = in_rect
            .grow(self.pad_i32(), self.pad_i32())
            .translate(self.offset_x, self.offset_y);
        if let Some(clip) = clip {
            region = region.intersect(&clip);
        }

        if region.is_empty() {
            return ImageData::empty(fctx);
        }

        let src = match input.pixmap() {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        pixfilters::invert_mask(
            image_ref!(src),
            in_rect.x().saturating_add(self.offset_x).saturating_sub(region.x()),
            in_rect.y().saturating_add(self.offset_y).saturating_sub(region.y()),
            image_ref_mut!(pixmap),
        );

        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, _: &Inputs, _: Point) -> Point {
        undefined_point()
    }

    fn untransform_point(&self, _: &Inputs, _: Point) -> Point {
        undefined_point()
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let mut regions = inputs.dirty_regions(0, pool);
        regions.translate(self.offset_x as f32, self.offset_y as f32);
        regions.grow(self.pad as f32, self.pad as f32);
        regions
    }

    fn reduces_opaque_pixels(&self, _: &Inputs) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_clip_is_padded() {
        let clip = Some(IntRect::from_xywh(0, 0, 10, 10));
        let ts = Transform::identity();

        let mask = InvertMask::new(4);
        let input_clip = mask.padded_state().input_clip(0, &ts, clip);
        assert_eq!(input_clip, Some(IntRect::from_ltrb(-4, -4, 14, 14)));

        let mut mask = InvertMask::new(3);
        mask.set_offset(5, -2);
        let input_clip = mask.padded_state().input_clip(0, &ts, clip);
        assert_eq!(input_clip, Some(IntRect::from_ltrb(-8, -1, 8, 15)));

        assert_eq!(mask.padded_state().input_clip(0, &ts, None), None);
    }

    #[test]
    fn input_clip_with_extreme_values() {
        let clip = Some(IntRect::from_xywh(0, 0, 10, 10));
        let ts = Transform::identity();

        let mask = InvertMask::new(u32::MAX);
        let input_clip = mask.padded_state().input_clip(0, &ts, clip);
        assert_eq!(input_clip, Some(IntRect::from_ltrb(-i32::MAX, -i32::MAX, i32::MAX, i32::MAX)));

        let mut mask = InvertMask::new(0);
        mask.set_offset(i32::MIN, 0);
        let input_clip = mask.padded_state().input_clip(0, &ts, clip);
        assert_eq!(input_clip, Some(IntRect::EMPTY));
    }
}
