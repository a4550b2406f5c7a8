// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::FromSlice;

use crate::render_state::PassKernel;
use crate::{FilterContext, ImageData, IntRect};

/// An acceleration tier.
///
/// Used for diagnostics only.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AccelType {
    /// Implemented without a backend, e.g. by moving bounds or transforms.
    Intrinsic,
    None,
    Simd,
    Fixed,
    OpenGL,
    Direct3D,
}

impl std::fmt::Display for AccelType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            AccelType::Intrinsic => "Intrinsic",
            AccelType::None => "CPU",
            AccelType::Simd => "CPU/SIMD",
            AccelType::Fixed => "CPU/Fixed",
            AccelType::OpenGL => "OpenGL",
            AccelType::Direct3D => "Direct3D",
        };

        f.write_str(name)
    }
}

/// A single convolution pass request.
#[derive(Clone, Copy, Debug)]
pub struct ConvolvePass<'a> {
    /// Pass kernel.
    pub kernel: &'a PassKernel,
    /// Convolve only alpha.
    pub alpha_only: bool,
    /// Colorize the result alpha with this color.
    pub colorize: Option<tiny_skia::Color>,
}

/// A backend.
pub trait Renderer {
    /// Returns the acceleration tier.
    fn accel_type(&self) -> AccelType;

    /// Returns the biggest image side the backend supports.
    fn max_image_size(&self) -> u32;

    /// Returns an execution unit for a convolution pass.
    ///
    /// `None` means the pass has nothing to do.
    fn convolve_peer(&self, pass: &ConvolvePass) -> Option<&dyn ConvolvePeer>;
}

/// Executes convolution passes.
pub trait ConvolvePeer {
    /// Convolves `input` into a new image covering `bounds`.
    ///
    /// `input` must not have a pending transform.
    /// Returns an invalid image on failure.
    fn filter(
        &self,
        fctx: &FilterContext,
        pass: &ConvolvePass,
        input: &ImageData,
        bounds: IntRect,
    ) -> ImageData;
}

/// The tiny-skia backed renderer.
#[derive(Default, Debug)]
pub struct CpuRenderer {
    convolve: CpuConvolvePeer,
}

impl CpuRenderer {
    /// Creates a new renderer.
    pub fn new() -> Self {
        CpuRenderer::default()
    }
}

impl Renderer for CpuRenderer {
    fn accel_type(&self) -> AccelType {
        if cfg!(feature = "simd") {
            AccelType::Simd
        } else {
            AccelType::None
        }
    }

    fn max_image_size(&self) -> u32 {
        // Keeps row sizes well inside i32.
        1 << 14
    }

    fn convolve_peer(&self, pass: &ConvolvePass) -> Option<&dyn ConvolvePeer> {
        if pass.kernel.is_nop() && pass.colorize.is_none() {
            None
        } else {
            Some(&self.convolve)
        }
    }
}

#[derive(Default, Debug)]
struct CpuConvolvePeer;

impl ConvolvePeer for CpuConvolvePeer {
    fn filter(
        &self,
        fctx: &FilterContext,
        pass: &ConvolvePass,
        input: &ImageData,
        bounds: IntRect,
    ) -> ImageData {
        debug_assert!(!input.is_transformed());

        let src = match input.pixmap() {
            Some(v) => v,
            None => return ImageData::invalid(fctx, bounds),
        };

        let mut pixmap = match fctx.create_pixmap(bounds) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, bounds),
        };

        if bounds.is_empty() {
            return ImageData::new(fctx, pixmap, bounds);
        }

        let (step_x, step_y) = pass.kernel.step();
        let kernel = pixfilters::ConvolveKernel {
            weights: pass.kernel.weights(),
            step_x,
            step_y,
            alpha_only: pass.alpha_only,
        };

        let in_bounds = input.untransformed_bounds();
        let (w, h) = (pixmap.width(), pixmap.height());
        pixfilters::linear_convolve(
            &kernel,
            pixfilters::ImageRef::new(src.data().as_rgba(), src.width(), src.height()),
            in_bounds.x(),
            in_bounds.y(),
            pixfilters::ImageRefMut::new(pixmap.data_mut().as_rgba_mut(), w, h),
            bounds.x(),
            bounds.y(),
        );

        if let Some(color) = pass.colorize {
            let c = color.premultiply().to_color_u8();
            pixfilters::colorize_alpha(
                rgb::RGBA8::new(c.red(), c.green(), c.blue(), c.alpha()),
                pixmap.data_mut().as_rgba_mut(),
            );
        }

        ImageData::new(fctx, pixmap, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_pass_has_no_peer() {
        let renderer = CpuRenderer::new();
        let kernel = PassKernel::identity();
        let pass = ConvolvePass {
            kernel: &kernel,
            alpha_only: false,
            colorize: None,
        };
        assert!(renderer.convolve_peer(&pass).is_none());

        let pass = ConvolvePass {
            colorize: Some(tiny_skia::Color::BLACK),
            ..pass
        };
        assert!(renderer.convolve_peer(&pass).is_some());
    }

    #[test]
    fn accel_type_name() {
        assert_eq!(AccelType::Simd.to_string(), "CPU/SIMD");
    }
}
