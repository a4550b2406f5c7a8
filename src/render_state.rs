// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::Transform;

use crate::IntRect;

/// A coordinate space an effect filters its inputs in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EffectCoordinateSpace {
    /// Inputs are filtered untransformed and the result carries the transform.
    UserSpace,
    /// The effect applies the transform itself.
    CustomSpace,
    /// Inputs are filtered with the full transform.
    RenderSpace,
}

/// Describes how an effect maps transforms and clips between its inputs and its result.
///
/// Created per filtering call and never modified.
#[derive(Clone, PartialEq, Debug)]
pub enum RenderState {
    /// User space with a clip mapped back through the transform.
    UserSpace,
    /// User space without an input clip.
    UnclippedUserSpace,
    /// Render space with the output clip passed to inputs as is.
    RenderSpace,
    /// Render space without an input clip.
    UnclippedRenderSpace,
    /// Render space with the first input clipped to a rect.
    Cropped(IntRect),
    /// Render space with the first input clip shifted and grown.
    Padded(PaddedRenderState),
    /// Explicit transforms without an input clip.
    Custom(CustomRenderState),
    /// Multi-pass linear convolution.
    Convolve(ConvolveRenderState),
}

impl RenderState {
    /// Returns the space inputs are filtered in.
    pub fn space(&self) -> EffectCoordinateSpace {
        match self {
            RenderState::UserSpace | RenderState::UnclippedUserSpace => {
                EffectCoordinateSpace::UserSpace
            }
            RenderState::RenderSpace
            | RenderState::UnclippedRenderSpace
            | RenderState::Cropped(..)
            | RenderState::Padded(..) => EffectCoordinateSpace::RenderSpace,
            RenderState::Custom(..) => EffectCoordinateSpace::CustomSpace,
            RenderState::Convolve(ref state) => state.space,
        }
    }

    /// Returns the transform inputs should be filtered with.
    pub fn input_transform(&self, ts: Transform) -> Transform {
        match self {
            RenderState::Custom(ref state) => state.input_transform,
            _ => match self.space() {
                EffectCoordinateSpace::RenderSpace => ts,
                _ => Transform::identity(),
            },
        }
    }

    /// Returns the transform still to be applied to the filtered result.
    pub fn result_transform(&self, ts: Transform) -> Transform {
        match self {
            RenderState::Custom(ref state) => state.result_transform,
            _ => match self.space() {
                EffectCoordinateSpace::RenderSpace => Transform::identity(),
                _ => ts,
            },
        }
    }

    /// Returns the clip input `i` should be filtered with, given the output clip.
    ///
    /// `None` means unclipped.
    pub fn input_clip(&self, i: usize, ts: &Transform, clip: Option<IntRect>) -> Option<IntRect> {
        match self {
            RenderState::UserSpace => {
                let clip = clip?;
                let inv = ts.invert()?;
                Some(clip.to_bounds().transform(&inv).round_out())
            }
            RenderState::UnclippedUserSpace
            | RenderState::UnclippedRenderSpace
            | RenderState::Custom(..) => None,
            RenderState::RenderSpace => clip,
            RenderState::Cropped(rect) => {
                if i == 0 {
                    Some(clip.map_or(*rect, |c| c.intersect(rect)))
                } else {
                    clip
                }
            }
            RenderState::Padded(ref state) => {
                if i == 0 {
                    let dx = state.offset_x.saturating_neg();
                    let dy = state.offset_y.saturating_neg();
                    clip.map(|c| c.translate(dx, dy).grow(state.pad_x, state.pad_y))
                } else {
                    clip
                }
            }
            RenderState::Convolve(ref state) => match state.space {
                EffectCoordinateSpace::RenderSpace => {
                    clip.map(|c| c.grow(state.pad_x(), state.pad_y()))
                }
                _ => None,
            },
        }
    }

    /// Checks that the effect will return its input unchanged.
    pub fn is_nop(&self) -> bool {
        match self {
            RenderState::Convolve(ref state) => state.is_nop(),
            _ => false,
        }
    }
}

/// A render space state for effects reading a fringe around their output.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PaddedRenderState {
    /// Horizontal fringe.
    pub pad_x: i32,
    /// Vertical fringe.
    pub pad_y: i32,
    /// Horizontal output offset.
    pub offset_x: i32,
    /// Vertical output offset.
    pub offset_y: i32,
}

/// A state with explicit input and result transforms.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CustomRenderState {
    /// The transform inputs are filtered with.
    pub input_transform: Transform,
    /// The transform left pending on the result.
    pub result_transform: Transform,
}

/// A single convolution pass kernel.
#[derive(Clone, PartialEq, Debug)]
pub struct PassKernel {
    weights: Vec<f32>,
    step_x: f32,
    step_y: f32,
}

impl PassKernel {
    /// Creates a new kernel.
    ///
    /// `weights` must have an odd length.
    /// `step_x` and `step_y` is the distance between two taps, in pixels.
    pub fn new(weights: Vec<f32>, step_x: f32, step_y: f32) -> Self {
        debug_assert!(weights.len() % 2 == 1);
        PassKernel {
            weights,
            step_x,
            step_y,
        }
    }

    /// Creates a single tap kernel.
    pub fn identity() -> Self {
        PassKernel::new(vec![1.0], 1.0, 0.0)
    }

    /// Returns kernel weights.
    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Returns the distance between two taps.
    #[inline]
    pub fn step(&self) -> (f32, f32) {
        (self.step_x, self.step_y)
    }

    /// Returns the number of taps on each side of the center.
    #[inline]
    pub fn pad(&self) -> usize {
        self.weights.len() / 2
    }

    /// Returns the horizontal reach in pixels.
    #[inline]
    pub fn pad_x(&self) -> i32 {
        (self.pad() as f32 * self.step_x.abs()).ceil() as i32
    }

    /// Returns the vertical reach in pixels.
    #[inline]
    pub fn pad_y(&self) -> i32 {
        (self.pad() as f32 * self.step_y.abs()).ceil() as i32
    }

    /// Checks that the kernel doesn't change pixels.
    #[inline]
    pub fn is_nop(&self) -> bool {
        self.weights.len() <= 1
    }
}

/// A two-pass convolution state.
#[derive(Clone, PartialEq, Debug)]
pub struct ConvolveRenderState {
    space: EffectCoordinateSpace,
    passes: [PassKernel; 2],
    shadow: Option<tiny_skia::Color>,
}

impl ConvolveRenderState {
    pub(crate) fn new(
        space: EffectCoordinateSpace,
        passes: [PassKernel; 2],
        shadow: Option<tiny_skia::Color>,
    ) -> Self {
        ConvolveRenderState {
            space,
            passes,
            shadow,
        }
    }

    /// Returns the space passes run in.
    #[inline]
    pub fn space(&self) -> EffectCoordinateSpace {
        self.space
    }

    /// Returns pass kernels.
    #[inline]
    pub fn passes(&self) -> &[PassKernel; 2] {
        &self.passes
    }

    /// Returns the shadow color.
    ///
    /// Shadows convolve only alpha and colorize the last pass.
    #[inline]
    pub fn shadow_color(&self) -> Option<tiny_skia::Color> {
        self.shadow
    }

    /// Checks that both passes are single tap and there is no shadow to colorize.
    pub fn is_nop(&self) -> bool {
        self.shadow.is_none() && self.passes.iter().all(|p| p.is_nop())
    }

    /// Returns the total horizontal reach.
    pub fn pad_x(&self) -> i32 {
        self.passes.iter().map(|p| p.pad_x()).sum()
    }

    /// Returns the total vertical reach.
    pub fn pad_y(&self) -> i32 {
        self.passes.iter().map(|p| p.pad_y()).sum()
    }

    /// Returns the clip for the output of pass `i`, given the final clip.
    ///
    /// Later passes read a fringe around their output, so earlier passes
    /// have to produce it.
    pub fn pass_output_clip(&self, i: usize, clip: Option<IntRect>) -> Option<IntRect> {
        let clip = clip?;
        let (dx, dy) = self.passes[i + 1..]
            .iter()
            .fold((0, 0), |(x, y), p| (x + p.pad_x(), y + p.pad_y()));
        Some(clip.grow(dx, dy))
    }

    /// Returns the output region of pass `i` for the provided input region.
    pub fn pass_output_bounds(&self, i: usize, input: IntRect, clip: Option<IntRect>) -> IntRect {
        let pass = &self.passes[i];
        let bounds = input.grow(pass.pad_x(), pass.pad_y());
        match self.pass_output_clip(i, clip) {
            Some(clip) => bounds.intersect(&clip),
            None => bounds,
        }
    }
}
