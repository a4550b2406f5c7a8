// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::{Color, Point, Transform};

use super::EffectImpl;
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::error::check_finite;
use crate::geom::undefined_point;
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::renderer::AccelType;
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// Fills a rectangle with a color.
#[derive(Clone, PartialEq, Debug)]
pub struct Flood {
    color: Color,
    bounds: Bounds,
}

impl Default for Flood {
    fn default() -> Self {
        Flood {
            color: Color::TRANSPARENT,
            bounds: Bounds::EMPTY,
        }
    }
}

impl Flood {
    /// Creates a new flood.
    pub fn new(color: Color, bounds: Bounds) -> Result<Self, Error> {
        let mut flood = Flood {
            color,
            ..Flood::default()
        };
        flood.set_bounds(bounds)?;
        Ok(flood)
    }

    /// Returns the fill color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the fill color.
    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns the filled rectangle, in user space.
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Sets the filled rectangle, in user space.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<(), Error> {
        if !bounds.is_empty() {
            check_finite("bounds x", bounds.min_x())?;
            check_finite("bounds y", bounds.min_y())?;
            check_finite("bounds width", bounds.width())?;
            check_finite("bounds height", bounds.height())?;
        }

        self.bounds = bounds;
        Ok(())
    }
}

impl EffectImpl for Flood {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::UnclippedUserSpace
    }

    fn bounds(&self, _: &Inputs, ts: &Transform) -> Bounds {
        self.bounds.transform(ts)
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        _: Option<IntRect>,
        _: &RenderState,
        _: Vec<ImageData>,
    ) -> ImageData {
        let region = self.bounds.round_out();
        if region.is_empty() {
            return ImageData::empty(fctx);
        }

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        // Partially covered edge pixels keep their coverage.
        let rect = tiny_skia::Rect::from_ltrb(
            self.bounds.min_x() - region.x() as f32,
            self.bounds.min_y() - region.y() as f32,
            self.bounds.max_x() - region.x() as f32,
            self.bounds.max_y() - region.y() as f32,
        );
        if let Some(rect) = rect {
            let mut paint = tiny_skia::Paint::default();
            paint.set_color(self.color);
            paint.anti_alias = true;
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }

        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, _: &Inputs, _: Point) -> Point {
        undefined_point()
    }

    fn untransform_point(&self, _: &Inputs, _: Point) -> Point {
        undefined_point()
    }

    fn dirty_regions(&self, _: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        pool.check_out()
    }

    fn reduces_opaque_pixels(&self, _: &Inputs) -> bool {
        self.color.alpha() < 1.0
    }

    fn accel_type(&self, _: &FilterContext) -> AccelType {
        AccelType::Intrinsic
    }
}
