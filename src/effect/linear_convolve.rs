// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::Transform;

use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::geom::TransformExt;
use crate::graph::Inputs;
use crate::render_state::{ConvolveRenderState, EffectCoordinateSpace, PassKernel, RenderState};
use crate::renderer::ConvolvePass;
use crate::{Bounds, FilterContext, ImageData, IntRect};

/// The biggest per-pass reach in render space.
///
/// Kernels that grow past it after scaling are applied in user space.
pub(crate) const MAX_PASS_PAD: i32 = 128;

/// Returns the number of gaussian taps on each side of the center.
#[inline]
pub(crate) fn gaussian_pad(radius: f32) -> f32 {
    radius.ceil().max(0.0)
}

/// Returns the number of taps on each side of the center
/// of a scaled box kernel, without building it.
///
/// Matches `box_weights(scale_box_size(size, scale), passes, _)`.
pub(crate) fn box_pad(size: u32, scale: f32, passes: u32) -> f32 {
    if size <= 1 || passes == 0 {
        return 0.0;
    }

    let size = (size as f32 * scale.abs()).round();
    if !(size > 1.0) {
        return 0.0;
    }

    let span = if size % 2.0 == 1.0 { size - 1.0 } else { size };
    passes as f32 * span / 2.0
}

/// Returns normalized gaussian weights.
///
/// The kernel has `ceil(radius) * 2 + 1` taps.
/// A non-zero `spread` makes the kernel sum bigger than 1,
/// which saturates alpha closer to the edges.
pub(crate) fn gaussian_weights(radius: f32, spread: f32) -> Vec<f32> {
    let pad = radius.ceil().max(0.0) as usize;
    if pad == 0 {
        return vec![1.0];
    }

    let sigma = radius / 3.0;
    let sigma22 = (2.0 * sigma * sigma).max(f32::MIN_POSITIVE);

    let mut weights = vec![0.0; pad * 2 + 1];
    let mut total = 0.0;
    for (i, w) in weights.iter_mut().enumerate() {
        let k = i as f32 - pad as f32;
        *w = (-(k * k) / sigma22).exp();
        total += *w;
    }

    normalize(&mut weights, total, spread);
    weights
}

/// Returns normalized weights of a box kernel convolved with itself.
///
/// An even `size` produces `size + 1` taps with half-weight ends.
/// `passes` is the number of box applications.
pub(crate) fn box_weights(size: u32, passes: u32, spread: f32) -> Vec<f32> {
    if passes == 0 || size <= 1 {
        return vec![1.0];
    }

    let base = if size % 2 == 1 {
        vec![1.0; size as usize]
    } else {
        let mut v = vec![1.0; size as usize + 1];
        v[0] = 0.5;
        v[size as usize] = 0.5;
        v
    };

    let mut weights = base.clone();
    for _ in 1..passes {
        weights = convolve_weights(&weights, &base);
    }

    let total = weights.iter().sum();
    normalize(&mut weights, total, spread);
    weights
}

fn convolve_weights(a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, wa) in a.iter().enumerate() {
        for (j, wb) in b.iter().enumerate() {
            out[i + j] += wa * wb;
        }
    }

    out
}

fn normalize(weights: &mut [f32], total: f32, spread: f32) {
    let total = total + (weights[0] - total) * spread;
    for w in weights {
        *w /= total;
    }
}

/// A source of two-pass convolution kernels.
pub(crate) trait LinearConvolveKernel {
    /// Returns kernels for the provided signed axis scales.
    ///
    /// Pass 0 is usually horizontal and pass 1 vertical.
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2];

    /// Returns the biggest per-pass reach, in pixels, `pass_kernels` would produce
    /// for the provided scales.
    ///
    /// Must not allocate, since scales can be arbitrary.
    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32;

    /// Returns the shadow color, for shadow kernels.
    fn shadow_color(&self) -> Option<tiny_skia::Color> {
        None
    }

    /// Returns the state for the provided transform.
    fn convolve_state(&self, ts: &Transform) -> ConvolveRenderState {
        // NaN pads do not fit either.
        if ts.is_scale_translate_only() && self.max_pass_pad(ts.sx, ts.sy) <= MAX_PASS_PAD as f32 {
            return ConvolveRenderState::new(
                EffectCoordinateSpace::RenderSpace,
                self.pass_kernels(ts.sx, ts.sy),
                self.shadow_color(),
            );
        }

        ConvolveRenderState::new(
            EffectCoordinateSpace::UserSpace,
            self.pass_kernels(1.0, 1.0),
            self.shadow_color(),
        )
    }
}

/// Returns the output bounds of a convolution applied to input 0.
pub(crate) fn convolve_bounds<K: LinearConvolveKernel>(
    kernel: &K,
    inputs: &Inputs,
    ts: &Transform,
) -> Bounds {
    let state = kernel.convolve_state(ts);
    let (pad_x, pad_y) = (state.pad_x() as f32, state.pad_y() as f32);
    match state.space() {
        EffectCoordinateSpace::RenderSpace => inputs.bounds(0, ts).grow(pad_x, pad_y),
        _ => inputs
            .bounds(0, &Transform::identity())
            .grow(pad_x, pad_y)
            .transform(ts),
    }
}

/// Returns input dirty regions grown by the unscaled kernel reach.
pub(crate) fn convolve_dirty_regions<K: LinearConvolveKernel>(
    kernel: &K,
    inputs: &Inputs,
    pool: &mut DirtyRegionPool,
) -> DirtyRegionContainer {
    let state = kernel.convolve_state(&Transform::identity());
    let mut regions = super::inputs_dirty_regions(inputs, pool);
    regions.grow(state.pad_x() as f32, state.pad_y() as f32);
    regions
}

/// Checks that the convolution keeps opaque pixels.
pub(crate) fn convolve_reduces_opaque_pixels<K: LinearConvolveKernel>(
    kernel: &K,
    inputs: &Inputs,
) -> bool {
    !kernel.convolve_state(&Transform::identity()).is_nop() || inputs.reduces_opaque_pixels(0)
}

/// Applies a convolution state to a single filtered input.
pub(crate) fn convolve_image_datas(
    fctx: &FilterContext,
    clip: Option<IntRect>,
    state: &RenderState,
    images: Vec<ImageData>,
) -> ImageData {
    let input = super::first_image(fctx, images);
    match state {
        RenderState::Convolve(ref state) => convolve(fctx, state, clip, input),
        _ => input,
    }
}

/// Runs convolution passes.
///
/// A no-op state returns the input as is.
/// An invalid intermediate image stops the passes and is returned.
pub(crate) fn convolve(
    fctx: &FilterContext,
    state: &ConvolveRenderState,
    clip: Option<IntRect>,
    input: ImageData,
) -> ImageData {
    if state.is_nop() {
        return input;
    }

    let clip = match state.space() {
        EffectCoordinateSpace::RenderSpace => clip,
        _ => None,
    };

    let shadow = state.shadow_color();
    let last = state.passes().len() - 1;

    let mut image = input;
    for (i, kernel) in state.passes().iter().enumerate() {
        let pass = ConvolvePass {
            kernel,
            alpha_only: shadow.is_some(),
            colorize: if i == last { shadow } else { None },
        };

        let peer = match fctx.renderer().convolve_peer(&pass) {
            Some(v) => v,
            None => continue,
        };

        let input_clip = state
            .pass_output_clip(i, clip)
            .map(|c| c.grow(kernel.pad_x(), kernel.pad_y()));
        let src = image.untransform(fctx, input_clip);
        if !src.validate(fctx) {
            return src;
        }

        let bounds = state.pass_output_bounds(i, src.untransformed_bounds(), clip);
        image = peer.filter(fctx, &pass, &src, bounds);
        if !image.validate(fctx) {
            return image;
        }
    }

    image
}
