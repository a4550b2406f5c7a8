// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{to_premultiplied, ImageRef, ImageRefMut, RGBA8};

/// A one-dimensional convolution kernel.
#[derive(Clone, Copy, Debug)]
pub struct ConvolveKernel<'a> {
    /// Kernel weights.
    ///
    /// Must have an odd length. The center tap is at `len / 2`.
    pub weights: &'a [f32],
    /// Horizontal distance between two taps, in pixels.
    pub step_x: f32,
    /// Vertical distance between two taps, in pixels.
    pub step_y: f32,
    /// Convolve only the alpha channel and leave color channels at zero.
    pub alpha_only: bool,
}

impl ConvolveKernel<'_> {
    #[inline]
    fn is_integer_step(&self) -> bool {
        self.step_x.fract() == 0.0 && self.step_y.fract() == 0.0
    }
}

/// Applies a single linear convolution pass.
///
/// `src` and `dest` are positioned in the same coordinate space
/// at (`src_x`, `src_y`) and (`dest_x`, `dest_y`) respectively.
/// Pixels outside of `src` are treated as transparent black.
///
/// - `src` pixels should have a **premultiplied alpha**.
/// - `dest` pixels will have a **premultiplied alpha**.
///
/// Fractional steps are sampled with bilinear filtering.
///
/// # Panics
///
/// When kernel weights are empty or have an even length.
pub fn linear_convolve(
    kernel: &ConvolveKernel,
    src: ImageRef,
    src_x: i32,
    src_y: i32,
    mut dest: ImageRefMut,
    dest_x: i32,
    dest_y: i32,
) {
    assert!(kernel.weights.len() % 2 == 1);

    let pad = (kernel.weights.len() / 2) as i32;
    let integer_step = kernel.is_integer_step();
    let ix = kernel.step_x as i32;
    let iy = kernel.step_y as i32;

    for y in 0..dest.height {
        for x in 0..dest.width {
            let lx = (x as i32).saturating_add(dest_x).saturating_sub(src_x);
            let ly = (y as i32).saturating_add(dest_y).saturating_sub(src_y);

            let mut acc = [0.0f32; 4];
            for (k, w) in kernel.weights.iter().enumerate() {
                let off = k as i32 - pad;
                let p = if integer_step {
                    let p = src
                        .pixel_or_clear(lx.saturating_add(off * ix), ly.saturating_add(off * iy));
                    [p.r as f32, p.g as f32, p.b as f32, p.a as f32]
                } else {
                    src.sample(
                        lx as f32 + 0.5 + off as f32 * kernel.step_x,
                        ly as f32 + 0.5 + off as f32 * kernel.step_y,
                    )
                };

                if kernel.alpha_only {
                    acc[3] += p[3] * w;
                } else {
                    acc[0] += p[0] * w;
                    acc[1] += p[1] * w;
                    acc[2] += p[2] * w;
                    acc[3] += p[3] * w;
                }
            }

            *dest.pixel_at_mut(x, y) = if kernel.alpha_only {
                RGBA8::new(0, 0, 0, to_premultiplied(acc).a)
            } else {
                to_premultiplied(acc)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_dot() -> Vec<RGBA8> {
        let mut data = vec![RGBA8::new(0, 0, 0, 0); 9];
        data[4] = RGBA8::new(90, 0, 0, 255);
        data
    }

    #[test]
    fn identity_kernel_copies() {
        let src = opaque_dot();
        let mut dest = vec![RGBA8::new(0, 0, 0, 0); 9];
        let kernel = ConvolveKernel {
            weights: &[1.0],
            step_x: 1.0,
            step_y: 0.0,
            alpha_only: false,
        };

        linear_convolve(
            &kernel,
            ImageRef::new(&src, 3, 3),
            0,
            0,
            ImageRefMut::new(&mut dest, 3, 3),
            0,
            0,
        );

        assert_eq!(src, dest);
    }

    #[test]
    fn horizontal_spread() {
        let src = opaque_dot();
        let mut dest = vec![RGBA8::new(0, 0, 0, 0); 9];
        let kernel = ConvolveKernel {
            weights: &[0.25, 0.5, 0.25],
            step_x: 1.0,
            step_y: 0.0,
            alpha_only: false,
        };

        linear_convolve(
            &kernel,
            ImageRef::new(&src, 3, 3),
            0,
            0,
            ImageRefMut::new(&mut dest, 3, 3),
            0,
            0,
        );

        // Only the middle row is touched.
        assert_eq!(dest[0].a, 0);
        assert_eq!(dest[3].a, 64);
        assert_eq!(dest[4].a, 128);
        assert_eq!(dest[5].a, 64);
        assert_eq!(dest[7].a, 0);
    }

    #[test]
    fn offset_destination() {
        let src = vec![RGBA8::new(0, 0, 0, 255); 1];
        let mut dest = vec![RGBA8::new(0, 0, 0, 0); 3];
        let kernel = ConvolveKernel {
            weights: &[0.25, 0.5, 0.25],
            step_x: 1.0,
            step_y: 0.0,
            alpha_only: true,
        };

        // A 1x1 source at (5, 5) grows into a 3x1 destination at (4, 5).
        linear_convolve(
            &kernel,
            ImageRef::new(&src, 1, 1),
            5,
            5,
            ImageRefMut::new(&mut dest, 3, 1),
            4,
            5,
        );

        assert_eq!(dest[0], RGBA8::new(0, 0, 0, 64));
        assert_eq!(dest[1], RGBA8::new(0, 0, 0, 128));
        assert_eq!(dest[2], RGBA8::new(0, 0, 0, 64));
    }
}
