// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{ImageRef, ImageRefMut};

/// Writes a vertically flipped copy of the bottom `rows` of `src` into `dest`.
///
/// The first reflected row is the last `src` row and is placed at
/// (`dest_x`, `dest_y`). Opacity is interpolated from `top_opacity`
/// on the first reflected row to `bottom_opacity` past the last one.
/// Rows and columns falling outside of `dest` are skipped.
///
/// Pixels should have a **premultiplied alpha**.
pub fn reflect(
    src: ImageRef,
    rows: u32,
    top_opacity: f32,
    bottom_opacity: f32,
    mut dest: ImageRefMut,
    dest_x: i32,
    dest_y: i32,
) {
    let rows = rows.min(src.height);
    for i in 0..rows {
        let ty = dest_y.saturating_add(i as i32);
        if ty < 0 || ty >= dest.height as i32 {
            continue;
        }

        let t = i as f32 / rows as f32;
        let opacity = top_opacity + (bottom_opacity - top_opacity) * t;
        let sy = src.height - 1 - i;

        for x in 0..src.width {
            let tx = dest_x.saturating_add(x as i32);
            if tx < 0 || tx >= dest.width as i32 {
                continue;
            }

            let mut p = src.pixel_at(x, sy);
            p.r = (p.r as f32 * opacity + 0.5) as u8;
            p.g = (p.g as f32 * opacity + 0.5) as u8;
            p.b = (p.b as f32 * opacity + 0.5) as u8;
            p.a = (p.a as f32 * opacity + 0.5) as u8;
            *dest.pixel_at_mut(tx as u32, ty as u32) = p;
        }
    }
}
