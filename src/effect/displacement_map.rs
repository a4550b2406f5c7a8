// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::{Point, Transform};

use super::{first_image, user_space_bounds, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::error::check_finite;
use crate::geom::undefined_point;
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::{Bounds, Error, FilterContext, FloatMap, ImageData, IntRect};

/// Moves input pixels by the amounts stored in a float map.
///
/// For each output pixel at a normalized position (x, y) the input is read at
/// `x + offset_x + scale_x * map[0]`, `y + offset_y + scale_y * map[1]`.
#[derive(Clone, Debug)]
pub struct DisplacementMap {
    map: FloatMap,
    scale_x: f32,
    scale_y: f32,
    offset_x: f32,
    offset_y: f32,
    wrap: bool,
}

impl DisplacementMap {
    /// Creates a new effect with a unit scale and no offset.
    pub fn new(map: FloatMap) -> Self {
        DisplacementMap {
            map,
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            wrap: false,
        }
    }

    /// Returns the map.
    ///
    /// The map is shared, so changing its samples affects this effect.
    #[inline]
    pub fn map(&self) -> &FloatMap {
        &self.map
    }

    /// Sets the map.
    #[inline]
    pub fn set_map(&mut self, map: FloatMap) {
        self.map = map;
    }

    /// Returns the map scale.
    #[inline]
    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    /// Sets the map scale.
    pub fn set_scale(&mut self, x: f32, y: f32) -> Result<(), Error> {
        let x = check_finite("scale x", x)?;
        let y = check_finite("scale y", y)?;
        self.scale_x = x;
        self.scale_y = y;
        Ok(())
    }

    /// Returns the offset in image-size units.
    #[inline]
    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    /// Sets the offset in image-size units.
    pub fn set_offset(&mut self, x: f32, y: f32) -> Result<(), Error> {
        let x = check_finite("offset x", x)?;
        let y = check_finite("offset y", y)?;
        self.offset_x = x;
        self.offset_y = y;
        Ok(())
    }

    /// Checks that lookups outside the input wrap around.
    #[inline]
    pub fn wrap(&self) -> bool {
        self.wrap
    }

    /// Sets lookups wrapping.
    #[inline]
    pub fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }
}

impl EffectImpl for DisplacementMap {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::UnclippedUserSpace
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        user_space_bounds(inputs, 0, ts)
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        _: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        let input = first_image(fctx, images).untransform(fctx, None);
        if !input.validate(fctx) {
            return input;
        }

        let region = input.untransformed_bounds();
        if region.is_empty() {
            return input;
        }

        let src = match input.pixmap() {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        let samples = fctx.map_samples(&self.map);
        let params = pixfilters::Displacement {
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            wrap: self.wrap,
        };

        pixfilters::displacement_map(
            params,
            pixfilters::MapRef::new(&samples.data, samples.width, samples.height),
            image_ref!(src),
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
        // Any change can move pixels anywhere inside the input.
        let mut regions = inputs.dirty_regions(0, pool);
        if !regions.is_empty() {
            let bounds = inputs.bounds(0, &Transform::identity());
            regions.reset();
            regions.add_dirty_region(bounds);
        }

        regions
    }

    fn reduces_opaque_pixels(&self, _: &Inputs) -> bool {
        true
    }
}
