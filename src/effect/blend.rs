// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::{Point, Transform};

use super::{draw_image, images_region, EffectImpl};
use crate::error::check_range;
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// A blending mode.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlendMode {
    SrcOver,
    SrcIn,
    SrcOut,
    SrcAtop,
    Add,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    /// Replaces the red channel of the bottom input.
    Red,
    /// Replaces the green channel of the bottom input.
    Green,
    /// Replaces the blue channel of the bottom input.
    Blue,
}

impl Default for BlendMode {
    fn default() -> Self {
        BlendMode::SrcOver
    }
}

enum Compositing {
    Skia(tiny_skia::BlendMode),
    Channel(pixfilters::BlendChannel),
}

impl BlendMode {
    fn compositing(self) -> Compositing {
        use tiny_skia::BlendMode as SkiaMode;

        let mode = match self {
            BlendMode::SrcOver => SkiaMode::SourceOver,
            BlendMode::SrcIn => SkiaMode::SourceIn,
            BlendMode::SrcOut => SkiaMode::SourceOut,
            BlendMode::SrcAtop => SkiaMode::SourceAtop,
            BlendMode::Add => SkiaMode::Plus,
            BlendMode::Multiply => SkiaMode::Multiply,
            BlendMode::Screen => SkiaMode::Screen,
            BlendMode::Overlay => SkiaMode::Overlay,
            BlendMode::Darken => SkiaMode::Darken,
            BlendMode::Lighten => SkiaMode::Lighten,
            BlendMode::ColorDodge => SkiaMode::ColorDodge,
            BlendMode::ColorBurn => SkiaMode::ColorBurn,
            BlendMode::HardLight => SkiaMode::HardLight,
            BlendMode::SoftLight => SkiaMode::SoftLight,
            BlendMode::Difference => SkiaMode::Difference,
            BlendMode::Exclusion => SkiaMode::Exclusion,
            BlendMode::Red => return Compositing::Channel(pixfilters::BlendChannel::Red),
            BlendMode::Green => return Compositing::Channel(pixfilters::BlendChannel::Green),
            BlendMode::Blue => return Compositing::Channel(pixfilters::BlendChannel::Blue),
        };

        Compositing::Skia(mode)
    }
}

/// Blends the second input onto the first one.
#[derive(Clone, PartialEq, Debug)]
pub struct Blend {
    mode: BlendMode,
    opacity: f32,
}

impl Default for Blend {
    fn default() -> Self {
        Blend {
            mode: BlendMode::SrcOver,
            opacity: 1.0,
        }
    }
}

impl Blend {
    /// Creates a new opaque blend.
    pub fn new(mode: BlendMode) -> Self {
        Blend {
            mode,
            opacity: 1.0,
        }
    }

    /// Returns the blending mode.
    #[inline]
    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Sets the blending mode.
    #[inline]
    pub fn set_mode(&mut self, mode: BlendMode) {
        self.mode = mode;
    }

    /// Returns the top input opacity.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets the top input opacity.
    ///
    /// Must be in a 0..=1 range.
    pub fn set_opacity(&mut self, opacity: f32) -> Result<(), Error> {
        self.opacity = check_range("opacity", opacity, 0.0, 1.0)?;
        Ok(())
    }

    fn blend_channel(
        &self,
        fctx: &FilterContext,
        channel: pixfilters::BlendChannel,
        pixmap: &mut tiny_skia::Pixmap,
        region: IntRect,
        top: ImageData,
    ) -> bool {
        let top = top.untransform(fctx, Some(region));
        if !top.validate(fctx) {
            return false;
        }

        let top_rect = top.untransformed_bounds();
        if let Some(src) = top.pixmap() {
            if !top_rect.is_empty() {
                pixfilters::channel_blend(
                    channel,
                    self.opacity,
                    image_ref!(src),
                    top_rect.x().saturating_sub(region.x()),
                    top_rect.y().saturating_sub(region.y()),
                    image_ref_mut!(pixmap),
                );
            }
        }

        true
    }
}

impl EffectImpl for Blend {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::RenderSpace
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        inputs.bounds(0, ts).union(&inputs.bounds(1, ts))
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        let mut images = images.into_iter();
        let (bottom, top) = match (images.next(), images.next()) {
            (Some(bottom), Some(top)) => (bottom, top),
            _ => return ImageData::invalid(fctx, IntRect::EMPTY),
        };

        let region = images_region(&[&bottom, &top], clip);
        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        draw_image(&mut pixmap, region, &bottom, tiny_skia::BlendMode::Source, 1.0);
        drop(bottom);

        match self.mode.compositing() {
            Compositing::Skia(mode) => {
                // The top goes through a full size layer, so modes like SrcIn
                // also affect the bottom outside of the top bounds.
                let mut layer = match fctx.create_pixmap(region) {
                    Some(v) => v,
                    None => return ImageData::invalid(fctx, region),
                };

                draw_image(&mut layer, region, &top, tiny_skia::BlendMode::Source, 1.0);
                let layer = ImageData::new(fctx, layer, region);
                draw_image(&mut pixmap, region, &layer, mode, self.opacity);
            }
            Compositing::Channel(channel) => {
                if !self.blend_channel(fctx, channel, &mut pixmap, region, top) {
                    log::warn!("Failed to prepare the top input of a channel blend.");
                    // Returns the buffer to the pool.
                    drop(ImageData::new(fctx, pixmap, region));
                    return ImageData::invalid(fctx, region);
                }
            }
        }

        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.transform(1, p)
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.untransform(1, p)
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        match self.mode {
            BlendMode::SrcIn | BlendMode::SrcOut | BlendMode::SrcAtop => true,
            _ => {
                self.opacity < 1.0
                    || inputs.reduces_opaque_pixels(0)
                    || inputs.reduces_opaque_pixels(1)
            }
        }
    }
}

/// Composites all inputs in order using source-over.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Merge {
    count: usize,
}

impl Default for Merge {
    fn default() -> Self {
        Merge { count: 2 }
    }
}

impl Merge {
    /// Creates a new merge of `count` inputs.
    #[inline]
    pub fn new(count: usize) -> Self {
        Merge { count }
    }

    /// Returns the number of inputs.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl EffectImpl for Merge {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::RenderSpace
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        (0..inputs.len()).fold(Bounds::EMPTY, |b, i| b.union(&inputs.bounds(i, ts)))
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        let refs: Vec<&ImageData> = images.iter().collect();
        let region = images_region(&refs, clip);
        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        for image in &images {
            draw_image(&mut pixmap, region, image, tiny_skia::BlendMode::SourceOver, 1.0);
        }

        ImageData::new(fctx, pixmap, region)
    }

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        match inputs.len() {
            0 => p,
            n => inputs.transform(n - 1, p),
        }
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        match inputs.len() {
            0 => p,
            n => inputs.untransform(n - 1, p),
        }
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        (0..inputs.len()).any(|i| inputs.reduces_opaque_pixels(i))
    }
}
