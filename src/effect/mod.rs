// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;
use tiny_skia::{Point, Transform};

use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::geom::TransformExt;
use crate::graph::Inputs;
use crate::render_state::RenderState;
use crate::renderer::AccelType;
use crate::{Bounds, FilterContext, ImageData, IntRect};

macro_rules! image_ref {
    ($img:expr) => {
        pixfilters::ImageRef::new($img.data().as_rgba(), $img.width(), $img.height())
    };
}

macro_rules! image_ref_mut {
    ($img:expr) => {
        $crate::effect::image_ref_mut($img.width(), $img.height(), $img.data_mut())
    };
}

/// Implements `EffectImpl` for a single input convolution effect.
macro_rules! impl_convolve_effect {
    ($kind:ty) => {
        impl $crate::effect::EffectImpl for $kind {
            fn render_state(
                &self,
                _: &$crate::graph::Inputs,
                ts: &tiny_skia::Transform,
                _: Option<$crate::IntRect>,
            ) -> $crate::render_state::RenderState {
                use $crate::effect::linear_convolve::LinearConvolveKernel;
                $crate::render_state::RenderState::Convolve(self.convolve_state(ts))
            }

            fn bounds(
                &self,
                inputs: &$crate::graph::Inputs,
                ts: &tiny_skia::Transform,
            ) -> $crate::Bounds {
                $crate::effect::linear_convolve::convolve_bounds(self, inputs, ts)
            }

            fn filter_image_datas(
                &self,
                fctx: &$crate::FilterContext,
                _: &tiny_skia::Transform,
                clip: Option<$crate::IntRect>,
                state: &$crate::render_state::RenderState,
                images: Vec<$crate::ImageData>,
            ) -> $crate::ImageData {
                $crate::effect::linear_convolve::convolve_image_datas(fctx, clip, state, images)
            }

            fn dirty_regions(
                &self,
                inputs: &$crate::graph::Inputs,
                pool: &mut $crate::DirtyRegionPool,
            ) -> $crate::DirtyRegionContainer {
                $crate::effect::linear_convolve::convolve_dirty_regions(self, inputs, pool)
            }

            fn reduces_opaque_pixels(&self, inputs: &$crate::graph::Inputs) -> bool {
                $crate::effect::linear_convolve::convolve_reduces_opaque_pixels(self, inputs)
            }
        }
    };
}

mod blend;
mod blur;
mod color;
mod crop;
mod displacement_map;
mod drop_shadow;
mod flood;
mod identity;
mod invert_mask;
pub(crate) mod linear_convolve;
mod offset;
mod perspective;
mod reflection;
mod shadow;

pub use blend::{Blend, BlendMode, Merge};
pub use blur::{BoxBlur, GaussianBlur, MotionBlur};
pub use color::{ColorAdjust, SepiaTone};
pub use crop::Crop;
pub use displacement_map::DisplacementMap;
pub use drop_shadow::{DropShadow, InnerShadow, ShadowMode};
pub use flood::Flood;
pub use identity::Identity;
pub use invert_mask::InvertMask;
pub use offset::Offset;
pub use perspective::PerspectiveTransform;
pub use reflection::Reflection;
pub use shadow::{BoxShadow, GaussianShadow};

// Separate function to resolve lifetimes.
pub(crate) fn image_ref_mut(width: u32, height: u32, data: &mut [u8]) -> pixfilters::ImageRefMut {
    pixfilters::ImageRefMut::new(data.as_rgba_mut(), width, height)
}

/// Effect behavior.
///
/// Every effect kind implements it and `Effect` dispatches to it.
pub(crate) trait EffectImpl {
    /// Returns the state describing how inputs are filtered.
    fn render_state(&self, inputs: &Inputs, ts: &Transform, clip: Option<IntRect>) -> RenderState;

    fn bounds(&self, inputs: &Inputs, ts: &Transform) -> Bounds;

    fn filter(
        &self,
        inputs: &Inputs,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
    ) -> ImageData {
        filter_effect(self, inputs, fctx, ts, clip)
    }

    /// Combines filtered inputs.
    ///
    /// All `images` are valid.
    fn filter_image_datas(
        &self,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
        state: &RenderState,
        images: Vec<ImageData>,
    ) -> ImageData;

    fn transform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.transform(0, p)
    }

    fn untransform_point(&self, inputs: &Inputs, p: Point) -> Point {
        inputs.untransform(0, p)
    }

    fn dirty_regions(&self, inputs: &Inputs, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        inputs_dirty_regions(inputs, pool)
    }

    fn reduces_opaque_pixels(&self, inputs: &Inputs) -> bool;

    fn accel_type(&self, fctx: &FilterContext) -> AccelType {
        fctx.accel_type()
    }
}

/// Filters all inputs and combines them.
///
/// Stops at the first invalid input.
pub(crate) fn filter_effect<E: EffectImpl + ?Sized>(
    effect: &E,
    inputs: &Inputs,
    fctx: &FilterContext,
    ts: &Transform,
    clip: Option<IntRect>,
) -> ImageData {
    let state = effect.render_state(inputs, ts, clip);
    let input_ts = state.input_transform(*ts);

    let mut images = Vec::with_capacity(inputs.len());
    for i in 0..inputs.len() {
        let input_clip = state.input_clip(i, ts, clip);
        let image = inputs.filter(i, fctx, &input_ts, input_clip);
        if !image.validate(fctx) {
            log::trace!("Input {} is invalid.", i);
            return ImageData::invalid(fctx, IntRect::EMPTY);
        }

        images.push(image);
    }

    let result = effect.filter_image_datas(fctx, ts, clip, &state, images);

    let result_ts = state.result_transform(*ts);
    if result_ts.is_identity() || !result.validate(fctx) {
        result
    } else {
        result.transform(result_ts)
    }
}

/// Merges dirty regions of all inputs.
pub(crate) fn inputs_dirty_regions(
    inputs: &Inputs,
    pool: &mut DirtyRegionPool,
) -> DirtyRegionContainer {
    let mut regions = pool.check_out();
    for i in 0..inputs.len() {
        let input = inputs.dirty_regions(i, pool);
        regions.merge(&input);
        pool.check_in(input);
    }

    regions
}

/// Returns the only input of a single-input effect.
pub(crate) fn first_image(fctx: &FilterContext, images: Vec<ImageData>) -> ImageData {
    match images.into_iter().next() {
        Some(v) => v,
        None => ImageData::invalid(fctx, IntRect::EMPTY),
    }
}

/// Maps input bounds of a user space effect into device space.
pub(crate) fn user_space_bounds(inputs: &Inputs, i: usize, ts: &Transform) -> Bounds {
    inputs.bounds(i, &Transform::identity()).transform(ts)
}

/// Copies an image without a pending transform into a new, uniquely owned pixmap.
///
/// The result covers the image bounds intersected with `clip`.
pub(crate) fn copy_image(
    fctx: &FilterContext,
    image: ImageData,
    clip: Option<IntRect>,
) -> Option<(tiny_skia::Pixmap, IntRect)> {
    let image = image.untransform(fctx, clip);
    if !image.validate(fctx) {
        return None;
    }

    let mut region = image.untransformed_bounds();
    if let Some(clip) = clip {
        region = region.intersect(&clip);
    }

    let mut pixmap = fctx.create_pixmap(region)?;
    draw_image(&mut pixmap, region, &image, tiny_skia::BlendMode::Source, 1.0);
    Some((pixmap, region))
}

/// Draws an image with its pending transform onto a pixmap covering `region`.
pub(crate) fn draw_image(
    pixmap: &mut tiny_skia::Pixmap,
    region: IntRect,
    image: &ImageData,
    blend_mode: tiny_skia::BlendMode,
    opacity: f32,
) {
    let bounds = image.untransformed_bounds();
    if bounds.is_empty() || region.is_empty() {
        return;
    }

    let src = match image.pixmap() {
        Some(v) => v,
        None => return,
    };

    let ts = image
        .pending_transform()
        .pre_translate(bounds.x() as f32, bounds.y() as f32)
        .post_translate(-(region.x() as f32), -(region.y() as f32));

    let quality = if ts.is_integer_translate() {
        tiny_skia::FilterQuality::Nearest
    } else {
        tiny_skia::FilterQuality::Bilinear
    };

    pixmap.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &tiny_skia::PixmapPaint {
            opacity,
            blend_mode,
            quality,
        },
        ts,
        None,
    );
}

/// Returns a union of images device bounds, clipped.
pub(crate) fn images_region(images: &[&ImageData], clip: Option<IntRect>) -> IntRect {
    let region = images
        .iter()
        .fold(IntRect::EMPTY, |r, img| r.union(&img.transformed_bounds()));

    match clip {
        Some(clip) => region.intersect(&clip),
        None => region,
    }
}

/// An image effect.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Effect {
    GaussianBlur(GaussianBlur),
    BoxBlur(BoxBlur),
    MotionBlur(MotionBlur),
    GaussianShadow(GaussianShadow),
    BoxShadow(BoxShadow),
    DropShadow(DropShadow),
    InnerShadow(InnerShadow),
    ColorAdjust(ColorAdjust),
    SepiaTone(SepiaTone),
    DisplacementMap(DisplacementMap),
    PerspectiveTransform(PerspectiveTransform),
    Reflection(Reflection),
    Crop(Crop),
    Blend(Blend),
    Merge(Merge),
    Flood(Flood),
    InvertMask(InvertMask),
    Offset(Offset),
    Identity(Identity),
}

impl Effect {
    /// Returns the number of inputs.
    pub fn arity(&self) -> usize {
        match self {
            Effect::Flood(..) | Effect::Identity(..) => 0,
            Effect::DropShadow(..)
            | Effect::InnerShadow(..)
            | Effect::Crop(..)
            | Effect::Blend(..) => 2,
            Effect::Merge(ref e) => e.count(),
            _ => 1,
        }
    }
}

/// A trait to access a specific effect kind stored in `Effect`.
pub trait EffectKind: Sized {
    /// Returns the effect if it has this kind.
    fn from_effect(effect: &Effect) -> Option<&Self>;

    /// Returns the mutable effect if it has this kind.
    fn from_effect_mut(effect: &mut Effect) -> Option<&mut Self>;
}

macro_rules! impl_effect_kinds {
    ($($kind:ident),+) => {
        $(
            impl From<$kind> for Effect {
                #[inline]
                fn from(effect: $kind) -> Self {
                    Effect::$kind(effect)
                }
            }

            impl EffectKind for $kind {
                #[inline]
                fn from_effect(effect: &Effect) -> Option<&Self> {
                    match effect {
                        Effect::$kind(ref e) => Some(e),
                        _ => None,
                    }
                }

                #[inline]
                fn from_effect_mut(effect: &mut Effect) -> Option<&mut Self> {
                    match effect {
                        Effect::$kind(ref mut e) => Some(e),
                        _ => None,
                    }
                }
            }
        )+

        impl Effect {
            pub(crate) fn imp(&self) -> &dyn EffectImpl {
                match self {
                    $(Effect::$kind(ref e) => e,)+
                }
            }

            /// Returns the effect kind name.
            pub fn kind_name(&self) -> &'static str {
                match self {
                    $(Effect::$kind(..) => stringify!($kind),)+
                }
            }
        }
    };
}

impl_effect_kinds!(
    GaussianBlur,
    BoxBlur,
    MotionBlur,
    GaussianShadow,
    BoxShadow,
    DropShadow,
    InnerShadow,
    ColorAdjust,
    SepiaTone,
    DisplacementMap,
    PerspectiveTransform,
    Reflection,
    Crop,
    Blend,
    Merge,
    Flood,
    InvertMask,
    Offset,
    Identity
);
