// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::Transform;

use super::{copy_image, first_image, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::renderer::AccelType;
use crate::{Bounds, FilterContext, ImageData, IntRect};

/// Clips the first input to the bounds of the second one.
///
/// The second input is never rendered.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Crop;

impl Crop {
    /// Creates a new crop.
    #[inline]
    pub fn new() -> Self {
        Crop
    }
}

impl EffectImpl for Crop {
    fn render_state(&self, inputs: &Inputs, ts: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::Cropped(inputs.bounds(1, ts).round_out())
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        inputs.bounds(0, ts).intersect(&inputs.bounds(1, ts))
    }

    fn filter(
        &self,
        inputs: &Inputs,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
    ) -> ImageData {
        let state = self.render_state(inputs, ts, clip);
        let crop = match state {
            RenderState::Cropped(rect) => rect,
            _ => IntRect::EMPTY,
        };

        let region = match clip {
            Some(clip) => crop.intersect(&clip),
            None => crop,
        };

        if region.is_empty() {
            return ImageData::empty(fctx);
        }

        let image = inputs.filter(0, fctx, ts, state.input_clip(0, ts, clip));
        if !image.validate(fctx) {
            return image;
        }

        self.filter_image_datas(fctx, ts, Some(region), &state, vec![image])
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        let image = first_image(fctx, images);
        let region = clip.unwrap_or(IntRect::EMPTY);
        if region.contains(&image.transformed_bounds()) {
            return image;
        }

        match copy_image(fctx, image, Some(region)) {
            Some((pixmap, region)) => ImageData::new(fctx, pixmap, region),
            None => ImageData::invalid(fctx, region),
        }
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let mut regions = super::inputs_dirty_regions(inputs, pool);
        regions.intersect(&inputs.bounds(1, &Transform::identity()));
        regions
    }

    fn reduces_opaque_pixels(&self, _: &Inputs) -> bool {
        true
    }

    fn accel_type(&self, _: &FilterContext) -> AccelType {
        AccelType::Intrinsic
    }
}
