// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::{Color, Point, Transform};

use super::blur::MAX_GAUSSIAN_RADIUS;
use super::linear_convolve::{convolve, LinearConvolveKernel};
use super::shadow::{box_size_for_width, BoxShadow, GaussianShadow};
use super::{draw_image, images_region, EffectImpl};
use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::error::{check_finite, check_range};
use crate::graph::Inputs;
use crate::render_state::{
    ConvolveRenderState, EffectCoordinateSpace, PaddedRenderState, PassKernel, RenderState,
};
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// A shadow kernel kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShadowMode {
    /// A gaussian kernel.
    Gaussian,
    /// A single box pass.
    OnePassBox,
    /// Two box passes.
    TwoPassBox,
    /// Three box passes.
    ThreePassBox,
}

impl Default for ShadowMode {
    fn default() -> Self {
        ShadowMode::Gaussian
    }
}

impl ShadowMode {
    fn kernel(self, radius: f32, spread: f32, color: Color) -> ShadowKernel {
        let passes = match self {
            ShadowMode::Gaussian => {
                return ShadowKernel::Gaussian(GaussianShadow::from_parts(radius, spread, color))
            }
            ShadowMode::OnePassBox => 1,
            ShadowMode::TwoPassBox => 2,
            ShadowMode::ThreePassBox => 3,
        };

        let size = box_size_for_width(radius * 2.0 + 1.0, passes) as u32;
        ShadowKernel::Box(BoxShadow::from_parts(size, passes, spread, color))
    }
}

enum ShadowKernel {
    Gaussian(GaussianShadow),
    Box(BoxShadow),
}

impl LinearConvolveKernel for ShadowKernel {
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2] {
        match self {
            ShadowKernel::Gaussian(ref k) => k.pass_kernels(scale_x, scale_y),
            ShadowKernel::Box(ref k) => k.pass_kernels(scale_x, scale_y),
        }
    }

    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32 {
        match self {
            ShadowKernel::Gaussian(ref k) => k.max_pass_pad(scale_x, scale_y),
            ShadowKernel::Box(ref k) => k.max_pass_pad(scale_x, scale_y),
        }
    }

    fn shadow_color(&self) -> Option<Color> {
        match self {
            ShadowKernel::Gaussian(ref k) => k.shadow_color(),
            ShadowKernel::Box(ref k) => k.shadow_color(),
        }
    }
}

/// Shadow parameters shared by drop and inner shadows.
#[derive(Clone, PartialEq, Debug)]
struct ShadowParams {
    mode: ShadowMode,
    radius: f32,
    spread: f32,
    offset_x: f32,
    offset_y: f32,
    color: Color,
}

impl Default for ShadowParams {
    fn default() -> Self {
        ShadowParams {
            mode: ShadowMode::Gaussian,
            radius: 10.0,
            spread: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            color: Color::BLACK,
        }
    }
}

impl ShadowParams {
    fn kernel(&self) -> ShadowKernel {
        self.mode.kernel(self.radius, self.spread, self.color)
    }

    /// Returns the convolution state and the shadow offset in the same space.
    fn state(&self, ts: &Transform) -> (ConvolveRenderState, f32, f32) {
        let state = self.kernel().convolve_state(ts);
        match state.space() {
            EffectCoordinateSpace::RenderSpace => {
                let (dx, dy) = (self.offset_x * ts.sx, self.offset_y * ts.sy);
                (state, dx, dy)
            }
            _ => (state, self.offset_x, self.offset_y),
        }
    }

    /// Returns the state inputs are filtered with.
    fn render_state(&self, ts: &Transform) -> RenderState {
        let (state, dx, dy) = self.state(ts);
        match state.space() {
            // One more pixel covers offset rounding.
            EffectCoordinateSpace::RenderSpace => RenderState::Padded(PaddedRenderState {
                pad_x: state.pad_x() + 1,
                pad_y: state.pad_y() + 1,
                offset_x: dx.round() as i32,
                offset_y: dy.round() as i32,
            }),
            _ => RenderState::UnclippedUserSpace,
        }
    }

    /// Returns the shadow bounds of input 0, in the space of the state.
    fn shadow_bounds(&self, inputs: &Inputs, ts: &Transform) -> (Bounds, EffectCoordinateSpace) {
        let (state, dx, dy) = self.state(ts);
        let input_ts = match state.space() {
            EffectCoordinateSpace::RenderSpace => *ts,
            _ => Transform::identity(),
        };

        let bounds = inputs
            .bounds(0, &input_ts)
            .grow(state.pad_x() as f32, state.pad_y() as f32)
            .translate(dx, dy);
        (bounds, state.space())
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let (state, dx, dy) = self.state(&Transform::identity());
        let mut regions = inputs.dirty_regions(1, pool);
        let mut shadow = inputs.dirty_regions(0, pool);
        shadow.grow(state.pad_x() as f32, state.pad_y() as f32);
        shadow.translate(dx, dy);
        regions.merge(&shadow);
        pool.check_in(shadow);
        regions
    }

    fn set_radius(&mut self, radius: f32) -> Result<(), Error> {
        self.radius = check_range("radius", radius, 0.0, MAX_GAUSSIAN_RADIUS)?;
        Ok(())
    }

    fn set_spread(&mut self, param: &'static str, spread: f32) -> Result<(), Error> {
        self.spread = check_range(param, spread, 0.0, 1.0)?;
        Ok(())
    }

    fn set_offset(&mut self, x: f32, y: f32) -> Result<(), Error> {
        let x = check_finite("offset x", x)?;
        let y = check_finite("offset y", y)?;
        self.offset_x = x;
        self.offset_y = y;
        Ok(())
    }
}

/// Splits the images of a two input effect.
fn two_images(images: Vec<ImageData>) -> Option<(ImageData, ImageData)> {
    let mut images = images.into_iter();
    let a = images.next()?;
    let b = images.next()?;
    Some((a, b))
}

macro_rules! shadow_params_api {
    ($kind:ident, $spread:literal) => {
        impl $kind {
            /// Returns the shadow kernel kind.
            #[inline]
            pub fn mode(&self) -> ShadowMode {
                self.params.mode
            }

            /// Sets the shadow kernel kind.
            ///
            /// Box kernels are sized to approximate the current radius.
            #[inline]
            pub fn set_mode(&mut self, mode: ShadowMode) {
                self.params.mode = mode;
            }

            /// Returns the radius.
            #[inline]
            pub fn radius(&self) -> f32 {
                self.params.radius
            }

            /// Sets the radius.
            ///
            /// Must be in a 0..=63 range.
            pub fn set_radius(&mut self, radius: f32) -> Result<(), Error> {
                self.params.set_radius(radius)
            }

            /// Returns the radius of an equivalent gaussian kernel.
            #[inline]
            pub fn gaussian_radius(&self) -> f32 {
                self.params.radius
            }

            /// Sets the radius of an equivalent gaussian kernel.
            #[inline]
            pub fn set_gaussian_radius(&mut self, radius: f32) -> Result<(), Error> {
                self.params.set_radius(radius)
            }

            /// Returns the width of an equivalent gaussian kernel.
            #[inline]
            pub fn gaussian_width(&self) -> f32 {
                self.params.radius * 2.0 + 1.0
            }

            /// Returns the shadow offset.
            #[inline]
            pub fn offset(&self) -> (f32, f32) {
                (self.params.offset_x, self.params.offset_y)
            }

            /// Sets the shadow offset.
            pub fn set_offset(&mut self, x: f32, y: f32) -> Result<(), Error> {
                self.params.set_offset(x, y)
            }

            /// Returns the shadow color.
            #[inline]
            pub fn color(&self) -> Color {
                self.params.color
            }

            /// Sets the shadow color.
            #[inline]
            pub fn set_color(&mut self, color: Color) {
                self.params.color = color;
            }

            fn spread_value(&self) -> f32 {
                self.params.spread
            }

            fn set_spread_value(&mut self, spread: f32) -> Result<(), Error> {
                self.params.set_spread($spread, spread)
            }
        }
    };
}

/// A shadow of the first input with the second input drawn over it.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DropShadow {
    params: ShadowParams,
}

shadow_params_api!(DropShadow, "spread");

impl DropShadow {
    /// Creates a new black gaussian shadow with a 10 pixels radius.
    pub fn new() -> Self {
        DropShadow::default()
    }

    /// Returns the spread.
    #[inline]
    pub fn spread(&self) -> f32 {
        self.spread_value()
    }

    /// Sets the spread.
    ///
    /// Must be in a 0..=1 range.
    pub fn set_spread(&mut self, spread: f32) -> Result<(), Error> {
        self.set_spread_value(spread)
    }
}

impl EffectImpl for DropShadow {
    fn render_state(&self, _: &Inputs, ts: &Transform, _: Option<IntRect>) -> RenderState {
        self.params.render_state(ts)
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        let (shadow, space) = self.params.shadow_bounds(inputs, ts);
        match space {
            EffectCoordinateSpace::RenderSpace => shadow.union(&inputs.bounds(1, ts)),
            _ => shadow
                .union(&inputs.bounds(1, &Transform::identity()))
                .transform(ts),
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
        let (source, content) = match two_images(images) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, IntRect::EMPTY),
        };

        let (state, dx, dy) = self.params.state(ts);
        let clip = match state.space() {
            EffectCoordinateSpace::RenderSpace => clip,
            _ => None,
        };

        let shadow_clip = clip.map(|c| c.to_bounds().translate(-dx, -dy).round_out());
        let shadow = convolve(fctx, &state, shadow_clip, source);
        if !shadow.validate(fctx) {
            return shadow;
        }

        let shadow = shadow.transform(Transform::from_translate(dx, dy));
        let region = images_region(&[&shadow, &content], clip);
        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        draw_image(&mut pixmap, region, &shadow, tiny_skia::BlendMode::SourceOver, 1.0);
        draw_image(&mut pixmap, region, &content, tiny_skia::BlendMode::SourceOver, 1.0);
        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.transform(1, p)
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.untransform(1, p)
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        self.params.dirty_regions(inputs, pool)
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        inputs.reduces_opaque_pixels(1)
    }
}

/// A shadow cast inside the second input by the edges of the first one.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct InnerShadow {
    params: ShadowParams,
}

shadow_params_api!(InnerShadow, "choke");

impl InnerShadow {
    /// Creates a new black gaussian shadow with a 10 pixels radius.
    pub fn new() -> Self {
        InnerShadow::default()
    }

    /// Returns the choke.
    #[inline]
    pub fn choke(&self) -> f32 {
        self.spread_value()
    }

    /// Sets the choke.
    ///
    /// Must be in a 0..=1 range.
    pub fn set_choke(&mut self, choke: f32) -> Result<(), Error> {
        self.set_spread_value(choke)
    }

    /// Creates an inverted alpha mask of `source` covering `region`, with the source offset.
    fn inverted_mask(
        &self,
        fctx: &FilterContext,
        source: ImageData,
        region: IntRect,
        dx: i32,
        dy: i32,
    ) -> ImageData {
        let source = source.untransform(fctx, None);
        let src = match source.pixmap() {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        let bounds = source.untransformed_bounds();
        pixfilters::invert_mask(
            image_ref!(src),
            bounds.x().saturating_add(dx).saturating_sub(region.x()),
            bounds.y().saturating_add(dy).saturating_sub(region.y()),
            image_ref_mut!(pixmap),
        );

        ImageData::new(fctx, pixmap, region)
    }
}

impl EffectImpl for InnerShadow {
    fn render_state(&self, _: &Inputs, ts: &Transform, _: Option<IntRect>) -> RenderState {
        self.params.render_state(ts)
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        let (state, _, _) = self.params.state(ts);
        match state.space() {
            EffectCoordinateSpace::RenderSpace => inputs.bounds(1, ts),
            _ => super::user_space_bounds(inputs, 1, ts),
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
        let (source, content) = match two_images(images) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, IntRect::EMPTY),
        };

        let (state, dx, dy) = self.params.state(ts);
        let clip = match state.space() {
            EffectCoordinateSpace::RenderSpace => clip,
            _ => None,
        };

        let region = images_region(&[&content], clip);
        if region.is_empty() {
            return ImageData::empty(fctx);
        }

        // The mask has to cover everything the kernel reads around the content.
        let mask_region = region.grow(state.pad_x(), state.pad_y());
        let mask = self.inverted_mask(
            fctx,
            source,
            mask_region,
            dx.round() as i32,
            dy.round() as i32,
        );
        if !mask.validate(fctx) {
            return mask;
        }

        let shadow = convolve(fctx, &state, Some(region), mask);
        if !shadow.validate(fctx) {
            return shadow;
        }

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        draw_image(&mut pixmap, region, &content, tiny_skia::BlendMode::SourceOver, 1.0);
        draw_image(&mut pixmap, region, &shadow, tiny_skia::BlendMode::SourceAtop, 1.0);
        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.transform(1, p)
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.untransform(1, p)
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        let mut regions = self.params.dirty_regions(inputs, pool);
        let content = inputs.bounds(1, &Transform::identity());
        if !regions.is_empty() {
            regions.intersect(&content);
        }

        regions
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        inputs.reduces_opaque_pixels(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_mode_approximates_radius() {
        let kernel = ShadowMode::ThreePassBox.kernel(9.0, 0.0, Color::BLACK);
        match kernel {
            ShadowKernel::Box(ref k) => {
                assert_eq!(k.h_size(), 7);
                assert_eq!(k.passes(), 3);
                assert_eq!(k.gaussian_radius(), 9.0);
            }
            _ => panic!("expected a box kernel"),
        }
    }

    #[test]
    fn rejected_setters_keep_values() {
        let mut shadow = DropShadow::new();
        assert!(shadow.set_offset(1.0, f32::INFINITY).is_err());
        assert_eq!(shadow.offset(), (0.0, 0.0));
        assert!(shadow.set_radius(100.0).is_err());
        assert_eq!(shadow.gaussian_radius(), 10.0);

        let mut inner = InnerShadow::new();
        assert_eq!(
            inner.set_choke(2.0),
            Err(Error::OutOfRange {
                param: "choke",
                value: 2.0,
                min: 0.0,
                max: 1.0
            })
        );
    }

    #[test]
    fn render_space_offset_is_scaled() {
        let params = ShadowParams {
            offset_x: 3.0,
            offset_y: -2.0,
            ..ShadowParams::default()
        };

        let (state, dx, dy) = params.state(&Transform::from_scale(2.0, 2.0));
        assert_eq!(state.space(), EffectCoordinateSpace::RenderSpace);
        assert_eq!((dx, dy), (6.0, -4.0));
    }
}
