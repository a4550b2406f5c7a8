// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{ImageRef, ImageRefMut};

/// A color channel.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlendChannel {
    Red,
    Green,
    Blue,
}

/// Replaces one color channel of `dest` with the same channel of `top`.
///
/// The replacement is weighted by `top` coverage and `opacity`.
/// `dest` alpha and other channels are left unchanged.
///
/// `top` is placed at (`top_x`, `top_y`) relative to `dest`.
///
/// Pixels should have a **premultiplied alpha**.
pub fn channel_blend(
    channel: BlendChannel,
    opacity: f32,
    top: ImageRef,
    top_x: i32,
    top_y: i32,
    mut dest: ImageRefMut,
) {
    for y in 0..dest.height {
        for x in 0..dest.width {
            let tx = (x as i32).saturating_sub(top_x);
            let ty = (y as i32).saturating_sub(top_y);
            let t = top.pixel_or_clear(tx, ty);
            if t.a == 0 {
                continue;
            }

            let d = dest.pixel_at_mut(x, y);
            if d.a == 0 {
                continue;
            }

            let (tc, dc) = match channel {
                BlendChannel::Red => (t.r, &mut d.r),
                BlendChannel::Green => (t.g, &mut d.g),
                BlendChannel::Blue => (t.b, &mut d.b),
            };

            let top_value = tc as f32 / t.a as f32;
            let bottom_value = *dc as f32 / d.a as f32;
            let k = t.a as f32 / 255.0 * opacity;
            let value = bottom_value + (top_value - bottom_value) * k;
            *dc = ((value * d.a as f32 + 0.5) as u8).min(d.a);
        }
    }
}
