// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{to_premultiplied, ImageRef, ImageRefMut, RGBA8};

/// Resamples an image through a projective transform.
///
/// `inverse` is a row-major 3x3 matrix mapping `dest` coordinates,
/// offset by (`dest_x`, `dest_y`), back into `src` pixel coordinates.
///
/// - `src` pixels should have a **premultiplied alpha**.
/// - `dest` pixels will have a **premultiplied alpha**.
pub fn perspective(inverse: &[f32; 9], src: ImageRef, mut dest: ImageRefMut, dest_x: i32, dest_y: i32) {
    let m = inverse;
    for y in 0..dest.height {
        for x in 0..dest.width {
            let gx = (x as i32 + dest_x) as f32 + 0.5;
            let gy = (y as i32 + dest_y) as f32 + 0.5;

            let w = m[6] * gx + m[7] * gy + m[8];
            let p = if w.abs() <= f32::EPSILON {
                RGBA8::new(0, 0, 0, 0)
            } else {
                let sx = (m[0] * gx + m[1] * gy + m[2]) / w;
                let sy = (m[3] * gx + m[4] * gy + m[5]) / w;
                to_premultiplied(src.sample(sx, sy))
            };

            *dest.pixel_at_mut(x, y) = p;
        }
    }
}
