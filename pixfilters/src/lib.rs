// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`pixfilters` provides the raster operations used by the `decora` effect nodes.

`pixfilters` doesn't know anything about effect graphs, just about pixels.
Region calculation, transforms, clipping, input validation and buffer
allocation should be implemented by the caller.

## Implemented operations

- Separable linear convolution along an arbitrary direction,
  used by gaussian, box and motion blurs and by shadows.
- Shadow colorization of an alpha mask.
- Alpha mask inversion.
- HSB color adjustment and sepia toning.
- Displacement by a floating point map.
- Perspective resampling.
- Vertical reflection with an opacity gradient.
- Single channel blending.

Most operations work on caller-provided buffers and don't allocate.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]

use float_cmp::ApproxEqUlps;
pub use rgb::RGBA8;

mod blend;
mod color_adjust;
mod convolve;
mod displacement_map;
mod perspective;
mod reflect;
mod shadow;

pub use blend::{channel_blend, BlendChannel};
pub use color_adjust::{color_adjust, sepia_tone, ColorAdjustment};
pub use convolve::{linear_convolve, ConvolveKernel};
pub use displacement_map::{displacement_map, Displacement, MapRef};
pub use perspective::perspective;
pub use reflect::reflect;
pub use shadow::{colorize_alpha, invert_mask};

/// An image reference.
///
/// Image pixels should be stored in RGBA order.
///
/// Some filters will require premultipled channels, some not.
/// See specific filter documentation for details.
#[derive(Clone, Copy)]
pub struct ImageRef<'a> {
    data: &'a [RGBA8],
    width: u32,
    height: u32,
}

impl<'a> ImageRef<'a> {
    /// Creates a new image reference.
    ///
    /// Doesn't clone the provided data.
    ///
    /// # Panics
    ///
    /// When `data` length doesn't match `width * height`.
    #[inline]
    pub fn new(data: &'a [RGBA8], width: u32, height: u32) -> Self {
        assert_eq!(data.len(), (width * height) as usize);
        ImageRef { data, width, height }
    }

    /// Returns image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel_at(&self, x: u32, y: u32) -> RGBA8 {
        self.data[(self.width * y + x) as usize]
    }

    /// Returns a pixel or transparent black outside the image.
    #[inline]
    fn pixel_or_clear(&self, x: i32, y: i32) -> RGBA8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            RGBA8::new(0, 0, 0, 0)
        } else {
            self.pixel_at(x as u32, y as u32)
        }
    }

    /// Samples the image with bilinear filtering.
    ///
    /// Pixel centers are at half-integer coordinates.
    /// Everything outside the image is transparent black.
    fn sample(&self, x: f32, y: f32) -> [f32; 4] {
        let x = x - 0.5;
        let y = y - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let x0 = x0 as i32;
        let y0 = y0 as i32;

        let mut acc = [0.0; 4];
        let taps = [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ];

        for (tx, ty, w) in taps {
            if w.approx_eq_ulps(&0.0, 4) {
                continue;
            }

            let p = self.pixel_or_clear(tx, ty);
            acc[0] += p.r as f32 * w;
            acc[1] += p.g as f32 * w;
            acc[2] += p.b as f32 * w;
            acc[3] += p.a as f32 * w;
        }

        acc
    }
}

/// A mutable `ImageRef` variant.
pub struct ImageRefMut<'a> {
    data: &'a mut [RGBA8],
    width: u32,
    height: u32,
}

impl<'a> ImageRefMut<'a> {
    /// Creates a new mutable image reference.
    ///
    /// Doesn't clone the provided data.
    ///
    /// # Panics
    ///
    /// When `data` length doesn't match `width * height`.
    #[inline]
    pub fn new(data: &'a mut [RGBA8], width: u32, height: u32) -> Self {
        assert_eq!(data.len(), (width * height) as usize);
        ImageRefMut { data, width, height }
    }

    /// Returns image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel_at_mut(&mut self, x: u32, y: u32) -> &mut RGBA8 {
        &mut self.data[(self.width * y + x) as usize]
    }
}

/// Multiplies provided pixels alpha.
pub fn multiply_alpha(data: &mut [RGBA8]) {
    for p in data {
        let a = p.a as f32 / 255.0;
        p.b = (p.b as f32 * a + 0.5) as u8;
        p.g = (p.g as f32 * a + 0.5) as u8;
        p.r = (p.r as f32 * a + 0.5) as u8;
    }
}

/// Demultiplies provided pixels alpha.
///
/// Fully transparent pixels are left as is.
pub fn demultiply_alpha(data: &mut [RGBA8]) {
    for p in data {
        if p.a == 0 {
            continue;
        }

        let a = p.a as f32 / 255.0;
        p.b = f32_bound(0.0, p.b as f32 / a + 0.5, 255.0) as u8;
        p.g = f32_bound(0.0, p.g as f32 / a + 0.5, 255.0) as u8;
        p.r = f32_bound(0.0, p.r as f32 / a + 0.5, 255.0) as u8;
    }
}

#[inline]
fn f32_bound(min: f32, val: f32, max: f32) -> f32 {
    debug_assert!(min.is_finite());
    debug_assert!(max.is_finite());

    if val > max {
        max
    } else if val < min {
        min
    } else {
        val
    }
}

/// Converts an accumulated premultiplied pixel back into `RGBA8`.
///
/// Color channels are clamped to alpha, so the result stays a valid premultiplied color.
#[inline]
fn to_premultiplied(acc: [f32; 4]) -> RGBA8 {
    let a = f32_bound(0.0, acc[3] + 0.5, 255.0) as u8;
    let channel = |c: f32| {
        let c = f32_bound(0.0, c + 0.5, 255.0) as u8;
        c.min(a)
    };

    RGBA8 {
        r: channel(acc[0]),
        g: channel(acc[1]),
        b: channel(acc[2]),
        a,
    }
}
