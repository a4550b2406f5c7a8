// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::{Point, Transform};

use super::{first_image, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::error::check_finite;
use crate::geom::{undefined_point, ProjectiveTransform};
use crate::graph::Inputs;
use crate::render_state::{CustomRenderState, RenderState};
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// Maps the input bounds onto an arbitrary quad.
///
/// All corners are at the origin by default, which makes the mapping degenerate.
#[derive(Clone, PartialEq, Debug)]
pub struct PerspectiveTransform {
    quad: [Point; 4],
}

impl Default for PerspectiveTransform {
    fn default() -> Self {
        PerspectiveTransform {
            quad: [Point::zero(); 4],
        }
    }
}

impl PerspectiveTransform {
    /// Creates a new transform from the upper-left, upper-right,
    /// lower-right and lower-left corners.
    pub fn new(ul: Point, ur: Point, lr: Point, ll: Point) -> Result<Self, Error> {
        let mut ts = PerspectiveTransform::default();
        ts.set_quad(ul, ur, lr, ll)?;
        Ok(ts)
    }

    /// Sets all corners.
    pub fn set_quad(&mut self, ul: Point, ur: Point, lr: Point, ll: Point) -> Result<(), Error> {
        let quad = [ul, ur, lr, ll];
        for p in &quad {
            check_finite("corner x", p.x)?;
            check_finite("corner y", p.y)?;
        }

        self.quad = quad;
        Ok(())
    }

    /// Returns the upper-left corner.
    #[inline]
    pub fn ul(&self) -> Point {
        self.quad[0]
    }

    /// Returns the upper-right corner.
    #[inline]
    pub fn ur(&self) -> Point {
        self.quad[1]
    }

    /// Returns the lower-right corner.
    #[inline]
    pub fn lr(&self) -> Point {
        self.quad[2]
    }

    /// Returns the lower-left corner.
    #[inline]
    pub fn ll(&self) -> Point {
        self.quad[3]
    }

    fn mapping(&self, bounds: &Bounds) -> Option<ProjectiveTransform> {
        ProjectiveTransform::rect_to_quad(bounds, &self.quad)
    }

    fn input_bounds(inputs: &Inputs) -> Bounds {
        inputs.bounds(0, &Transform::identity()).round_out().to_bounds()
    }
}

impl EffectImpl for PerspectiveTransform {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::Custom(CustomRenderState {
            input_transform: Transform::identity(),
            result_transform: Transform::identity(),
        })
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        let bounds = Self::input_bounds(inputs);
        match self.mapping(&bounds) {
            Some(p) => ProjectiveTransform::from_affine(ts).concat(&p).map_bounds(&bounds),
            None => Bounds::EMPTY,
        }
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        let input = first_image(fctx, images).untransform(fctx, None);
        if !input.validate(fctx) {
            return input;
        }

        let in_rect = input.untransformed_bounds();
        let bounds = in_rect.to_bounds();
        let full = match self.mapping(&bounds) {
            Some(p) => ProjectiveTransform::from_affine(ts).concat(&p),
            None => {
                log::warn!("Perspective quad is degenerate.");
                return ImageData::empty(fctx);
            }
        };

        let inverse = match full.invert() {
            Some(v) => v,
            None => {
                log::warn!("Perspective transform is not invertible.");
                return ImageData::empty(fctx);
            }
        };

        let mut region = full.map_bounds(&bounds).round_out();
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

        // Source pixels start at the input origin.
        let to_src = Transform::from_translate(-(in_rect.x() as f32), -(in_rect.y() as f32));
        let inverse = ProjectiveTransform::from_affine(&to_src).concat(&inverse);

        pixfilters::perspective(
            inverse.matrix(),
            image_ref!(src),
            image_ref_mut!(pixmap),
            region.x(),
            region.y(),
        );

        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        let p = inputs.transform(0, p);
        match self.mapping(&Self::input_bounds(inputs)) {
            Some(ts) => ts.map_point(p),
            None => undefined_point(),
        }
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        let inverse = self
            .mapping(&Self::input_bounds(inputs))
            .and_then(|ts| ts.invert());
        match inverse {
            Some(ts) => inputs.untransform(0, ts.map_point(p)),
            None => undefined_point(),
        }
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let input = inputs.dirty_regions(0, pool);
        let mut regions = pool.check_out();
        if let Some(ts) = self.mapping(&Self::input_bounds(inputs)) {
            for r in input.regions() {
                regions.add_dirty_region(ts.map_bounds(r));
            }
        }

        pool.check_in(input);
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
    fn default_is_degenerate() {
        let ts = PerspectiveTransform::default();
        let bounds = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(ts.mapping(&bounds).is_none());
    }

    #[test]
    fn corners_are_checked() {
        let p = Point::from_xy(1.0, 1.0);
        let bad = Point::from_xy(f32::INFINITY, 0.0);
        assert!(PerspectiveTransform::new(p, p, bad, p).is_err());
    }

    #[test]
    fn rect_maps_onto_quad() {
        let ts = PerspectiveTransform::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(20.0, 0.0),
            Point::from_xy(20.0, 20.0),
            Point::from_xy(0.0, 20.0),
        )
        .unwrap();

        let bounds = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        let p = ts.mapping(&bounds).unwrap();
        let corner = p.map_point(Point::from_xy(10.0, 10.0));
        assert!((corner.x - 20.0).abs() < 1e-4);
        assert!((corner.y - 20.0).abs() < 1e-4);
    }
}
