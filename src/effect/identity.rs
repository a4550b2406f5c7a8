// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::{Point, Transform};

use super::EffectImpl;
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::error::check_finite;
use crate::geom::{undefined_point, TransformExt};
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::renderer::AccelType;
use crate::{Bounds, Error, FilterContext, ImageData, IntRect, Source};

/// An application image placed at a location.
///
/// Has no inputs. Changes are tracked as dirty regions until `clear_dirty`.
#[derive(Clone, Debug, Default)]
pub struct Identity {
    source: Option<Source>,
    x: f32,
    y: f32,
    dirty: Vec<Bounds>,
}

impl Identity {
    /// Creates a new effect at the origin.
    pub fn new(source: Option<Source>) -> Self {
        Identity {
            source,
            ..Identity::default()
        }
    }

    /// Returns the source.
    #[inline]
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// Sets the source.
    ///
    /// Marks both the old and the new source bounds as dirty.
    pub fn set_source(&mut self, source: Option<Source>) {
        self.mark_dirty(self.source_bounds());
        self.source = source;
        self.mark_dirty(self.source_bounds());
    }

    /// Returns the location.
    #[inline]
    pub fn location(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Sets the location.
    ///
    /// Marks both the old and the new source bounds as dirty.
    pub fn set_location(&mut self, x: f32, y: f32) -> Result<(), Error> {
        let x = check_finite("location x", x)?;
        let y = check_finite("location y", y)?;
        self.mark_dirty(self.source_bounds());
        self.x = x;
        self.y = y;
        self.mark_dirty(self.source_bounds());
        Ok(())
    }

    /// Marks a region as changed, in user space.
    pub fn mark_dirty(&mut self, region: Bounds) {
        if !region.is_empty() {
            self.dirty.push(region);
        }
    }

    /// Forgets all changes.
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    fn source_bounds(&self) -> Bounds {
        match self.source {
            Some(ref s) => Bounds::from_xywh(self.x, self.y, s.width() as f32, s.height() as f32),
            None => Bounds::EMPTY,
        }
    }
}

impl EffectImpl for Identity {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::UnclippedUserSpace
    }

    fn bounds(&self, _: &Inputs, ts: &Transform) -> Bounds {
        self.source_bounds().transform(ts)
    }

    fn filter(
        &self,
        _: &Inputs,
        fctx: &FilterContext,
        ts: &Transform,
        _: Option<IntRect>,
    ) -> ImageData {
        let source = match self.source {
            Some(ref v) => v,
            None => return ImageData::empty(fctx),
        };

        let surface = fctx.source_surface(source);
        let rect = IntRect::from_xywh(0, 0, source.width(), source.height());
        let ts = ts.pre_translate(self.x, self.y);
        if ts.is_integer_translate() {
            let rect = rect.translate(ts.tx as i32, ts.ty as i32);
            ImageData::from_surface(fctx, surface, rect, Transform::identity())
        } else {
            ImageData::from_surface(fctx, surface, rect, ts)
        }
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        _: Option<IntRect>,
        _: &RenderState,
        _: Vec<ImageData>,
    ) -> ImageData {
        ImageData::invalid(fctx, IntRect::EMPTY)
    }

    fn transform_point(&self, _: &Inputs, _: Point) -> Point {
        undefined_point()
    }

    fn untransform_point(&self, _: &Inputs, _: Point) -> Point {
        undefined_point()
    }

    fn dirty_regions(&self, _: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let mut regions = pool.check_out();
        for r in &self.dirty {
            regions.add_dirty_region(*r);
        }

        regions
    }

    fn reduces_opaque_pixels(&self, _: &Inputs) -> bool {
        false
    }

    fn accel_type(&self, _: &FilterContext) -> AccelType {
        AccelType::Intrinsic
    }
}
