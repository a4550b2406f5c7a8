// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{ImageRef, ImageRefMut, RGBA8};

/// Replaces pixels color with the provided one, using pixels alpha as coverage.
///
/// `color` should have a **premultiplied alpha**.
/// The result will have a **premultiplied alpha**.
pub fn colorize_alpha(color: RGBA8, data: &mut [RGBA8]) {
    for p in data {
        let coverage = p.a as f32 / 255.0;
        p.r = (color.r as f32 * coverage + 0.5) as u8;
        p.g = (color.g as f32 * coverage + 0.5) as u8;
        p.b = (color.b as f32 * coverage + 0.5) as u8;
        p.a = (color.a as f32 * coverage + 0.5) as u8;
    }
}

/// Inverts an alpha mask.
///
/// `src` is placed at (`src_x`, `src_y`) relative to `dest`.
/// Every `dest` pixel becomes opaque black minus the `src` alpha under it.
/// Pixels outside of `src` are treated as transparent, so they become opaque.
pub fn invert_mask(src: ImageRef, src_x: i32, src_y: i32, mut dest: ImageRefMut) {
    for y in 0..dest.height {
        for x in 0..dest.width {
            let sx = (x as i32).saturating_sub(src_x);
            let sy = (y as i32).saturating_sub(src_y);
            let a = src.pixel_or_clear(sx, sy).a;
            *dest.pixel_at_mut(x, y) = RGBA8::new(0, 0, 0, 255 - a);
        }
    }
}
