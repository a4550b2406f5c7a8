// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::Transform;

use super::{copy_image, first_image, EffectImpl};
use crate::error::check_range;
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// Applies a per-pixel operation to an unpremultiplied copy of the input.
fn filter_pixels<F>(
    fctx: &FilterContext,
    clip: Option<IntRect>,
    images: Vec<ImageData>,
    f: F,
) -> ImageData
where
    F: FnOnce(&mut [rgb::RGBA8]),
{
    let input = first_image(fctx, images);
    let (mut pixmap, region) = match copy_image(fctx, input, clip) {
        Some(v) => v,
        None => return ImageData::invalid(fctx, IntRect::EMPTY),
    };

    let data = pixmap.data_mut().as_rgba_mut();
    pixfilters::demultiply_alpha(data);
    f(&mut *data);
    pixfilters::multiply_alpha(data);

    ImageData::new(fctx, pixmap, region)
}

/// Hue, saturation, brightness and contrast adjustment.
#[derive(Clone, PartialEq, Debug)]
pub struct ColorAdjust {
    hue: f32,
    saturation: f32,
    brightness: f32,
    contrast: f32,
}

impl Default for ColorAdjust {
    fn default() -> Self {
        ColorAdjust {
            hue: 0.0,
            saturation: 0.0,
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

impl ColorAdjust {
    /// Creates a new adjustment that changes nothing.
    pub fn new() -> Self {
        ColorAdjust::default()
    }

    /// Returns the hue shift.
    #[inline]
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Sets the hue shift.
    ///
    /// Must be in a -1..=1 range, where 1 is a 180 degrees rotation.
    pub fn set_hue(&mut self, hue: f32) -> Result<(), Error> {
        self.hue = check_range("hue", hue, -1.0, 1.0)?;
        Ok(())
    }

    /// Returns the saturation change.
    #[inline]
    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Sets the saturation change.
    ///
    /// Must be in a -1..=1 range.
    pub fn set_saturation(&mut self, saturation: f32) -> Result<(), Error> {
        self.saturation = check_range("saturation", saturation, -1.0, 1.0)?;
        Ok(())
    }

    /// Returns the brightness change.
    #[inline]
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Sets the brightness change.
    ///
    /// Must be in a -1..=1 range.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), Error> {
        self.brightness = check_range("brightness", brightness, -1.0, 1.0)?;
        Ok(())
    }

    /// Returns the contrast factor.
    #[inline]
    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Sets the contrast factor.
    ///
    /// Must be in a 0.25..=4 range, where 1 is no change.
    pub fn set_contrast(&mut self, contrast: f32) -> Result<(), Error> {
        self.contrast = check_range("contrast", contrast, 0.25, 4.0)?;
        Ok(())
    }

    fn is_identity(&self) -> bool {
        *self == ColorAdjust::default()
    }
}

impl EffectImpl for ColorAdjust {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::RenderSpace
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        inputs.bounds(0, ts)
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        if self.is_identity() {
            return first_image(fctx, images);
        }

        let adj = pixfilters::ColorAdjustment {
            hue: self.hue,
            saturation: self.saturation,
            brightness: self.brightness,
            contrast: self.contrast,
        };

        filter_pixels(fctx, clip, images, |data| pixfilters::color_adjust(adj, data))
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        inputs.reduces_opaque_pixels(0)
    }
}

/// A sepia toning.
#[derive(Clone, PartialEq, Debug)]
pub struct SepiaTone {
    level: f32,
}

impl Default for SepiaTone {
    fn default() -> Self {
        SepiaTone { level: 1.0 }
    }
}

impl SepiaTone {
    /// Creates a new toning.
    ///
    /// `level` must be in a 0..=1 range. 0 keeps the input unchanged.
    pub fn new(level: f32) -> Result<Self, Error> {
        Ok(SepiaTone {
            level: check_range("level", level, 0.0, 1.0)?,
        })
    }

    /// Returns the toning level.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Sets the toning level.
    pub fn set_level(&mut self, level: f32) -> Result<(), Error> {
        self.level = check_range("level", level, 0.0, 1.0)?;
        Ok(())
    }
}

impl EffectImpl for SepiaTone {
    fn render_state(&self, _: &Inputs, _: &Transform, _: Option<IntRect>) -> RenderState {
        RenderState::RenderSpace
    }

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds {
        inputs.bounds(0, ts)
    }

    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        _: &Transform,
        clip: Option<IntRect>,
        _: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData {
        if self.level == 0.0 {
            return first_image(fctx, images);
        }

        let level = self.level;
        filter_pixels(fctx, clip, images, |data| pixfilters::sepia_tone(level, data))
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool {
        inputs.reduces_opaque_pixels(0)
    }
}
