// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::Transform;

use super::{draw_image, first_image, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::error::{check_finite, check_range};
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// The input with a vertically flipped, fading copy below it.
#[derive(Clone, PartialEq, Debug)]
pub struct Reflection {
    top_offset: f32,
    top_opacity: f32,
    bottom_opacity: f32,
    fraction: f32,
}

impl Default for Reflection {
    fn default() -> Self {
        Reflection {
            top_offset: 0.0,
            top_opacity: 0.5,
            bottom_opacity: 0.0,
            fraction: 0.75,
        }
    }
}

impl Reflection {
    /// Creates a new reflection of the bottom three quarters of the input.
    pub fn new() -> Self {
        Reflection::default()
    }

    /// Returns the distance between the input bottom and the reflection.
    #[inline]
    pub fn top_offset(&self) -> f32 {
        self.top_offset
    }

    /// Sets the distance between the input bottom and the reflection.
    pub fn set_top_offset(&mut self, offset: f32) -> Result<(), Error> {
        self.top_offset = check_finite("top offset", offset)?;
        Ok(())
    }

    /// Returns the opacity of the first reflected row.
    #[inline]
    pub fn top_opacity(&self) -> f32 {
        self.top_opacity
    }

    /// Sets the opacity of the first reflected row.
    pub fn set_top_opacity(&mut self, opacity: f32) -> Result<(), Error> {
        self.top_opacity = check_range("top opacity", opacity, 0.0, 1.0)?;
        Ok(())
    }

    /// Returns the opacity past the last reflected row.
    #[inline]
    pub fn bottom_opacity(&self) -> f32 {
        self.bottom_opacity
    }

    /// Sets the opacity past the last reflected row.
    pub fn set_bottom_opacity(&mut self, opacity: f32) -> Result<(), Error> {
        self.bottom_opacity = check_range("bottom opacity", opacity, 0.0, 1.0)?;
        Ok(())
    }

    /// Returns the reflected part of the input height.
    #[inline]
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Sets the reflected part of the input height.
    ///
    /// Must be in a 0..=1 range.
    pub fn set_fraction(&mut self, fraction: f32) -> Result<(), Error> {
        self.fraction = check_range("fraction", fraction, 0.0, 1.0)?;
        Ok(())
    }

    /// Returns the reflected copy of `bounds`.
    fn reflected_bounds(&self, bounds: &Bounds) -> Bounds {
        if bounds.is_empty() {
            return Bounds::EMPTY;
        }

        let top = bounds.max_y() + self.top_offset;
        Bounds::from_ltrb(
            bounds.min_x(),
            top,
            bounds.max_x(),
            top + bounds.height() * self.fraction,
        )
    }
}

impl EffectImpl for Reflection {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::UnclippedUserSpace
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        let bounds = inputs.bounds(0, &Transform::identity());
        bounds.union(&self.reflected_bounds(&bounds)).transform(ts)
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

        let in_rect = input.untransformed_bounds();
        if in_rect.is_empty() {
            return input;
        }

        let rows = (self.fraction * in_rect.height() as f32).round() as u32;
        let reflected_y = in_rect.bottom().saturating_add(self.top_offset.round() as i32);
        let reflected = IntRect::from_xywh(in_rect.x(), reflected_y, in_rect.width(), rows);
        let region = in_rect.union(&reflected);

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        if rows != 0 {
            if let Some(src) = input.pixmap() {
                pixfilters::reflect(
                    image_ref!(src),
                    rows,
                    self.top_opacity,
                    self.bottom_opacity,
                    image_ref_mut!(pixmap),
                    in_rect.x().saturating_sub(region.x()),
                    reflected_y.saturating_sub(region.y()),
                );
            }
        }

        // A negative offset puts the reflection under the input.
        draw_image(&mut pixmap, region, &input, tiny_skia::BlendMode::SourceOver, 1.0);
        ImageData::new(fctx, pixmap, region)
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let mut regions = inputs.dirty_regions(0, pool);
        if regions.is_empty() {
            return regions;
        }

        // A row at y is reflected to the mirror position below the input.
        let bounds = inputs.bounds(0, &Transform::identity());
        let reflected = self.reflected_bounds(&bounds);
        let mirror = bounds.max_y() * 2.0 + self.top_offset;

        let mut extra = Vec::with_capacity(regions.size());
        for r in regions.regions() {
            let top = mirror - r.max_y();
            let b = Bounds::from_ltrb(r.min_x(), top, r.max_x(), top + r.height());
            extra.push(b.intersect(&reflected));
        }

        for r in extra {
            regions.add_dirty_region(r);
        }

        regions
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        inputs.reduces_opaque_pixels(0) || self.top_offset < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflected_bounds() {
        let effect = Reflection::default();
        let b = effect.reflected_bounds(&Bounds::from_xywh(0.0, 0.0, 10.0, 20.0));
        assert_eq!(b, Bounds::from_ltrb(0.0, 20.0, 10.0, 35.0));
    }

    #[test]
    fn fraction_range() {
        let mut effect = Reflection::new();
        assert!(effect.set_fraction(1.5).is_err());
        assert_eq!(effect.fraction(), 0.75);
        assert!(effect.set_top_offset(f32::NAN).is_err());
    }
}
