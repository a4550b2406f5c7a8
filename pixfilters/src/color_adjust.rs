// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{f32_bound, RGBA8};

/// Color adjustment parameters.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ColorAdjustment {
    /// Hue shift in a -1..1 range, where 1 is a 180 degrees rotation.
    pub hue: f32,
    /// Saturation change in a -1..1 range.
    pub saturation: f32,
    /// Brightness change in a -1..1 range.
    pub brightness: f32,
    /// Contrast factor. 1 is no change.
    pub contrast: f32,
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        ColorAdjustment {
            hue: 0.0,
            saturation: 0.0,
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

/// Adjusts pixels hue, saturation, brightness and contrast.
///
/// Input image pixels should have an **unpremultiplied alpha**.
/// Alpha is left unchanged.
pub fn color_adjust(adj: ColorAdjustment, data: &mut [RGBA8]) {
    for p in data {
        if p.a == 0 {
            continue;
        }

        let (mut h, mut s, mut v) = rgb_to_hsb(p.r, p.g, p.b);

        h += adj.hue * 0.5;
        h -= h.floor();

        s = f32_bound(0.0, s * (1.0 + adj.saturation), 1.0);

        if adj.brightness > 0.0 {
            v += (1.0 - v) * adj.brightness;
        } else {
            v *= 1.0 + adj.brightness;
        }

        let (r, g, b) = hsb_to_rgb(h, s, v);
        let contrast = |c: f32| {
            let c = (c - 0.5) * adj.contrast + 0.5;
            (f32_bound(0.0, c, 1.0) * 255.0 + 0.5) as u8
        };

        p.r = contrast(r);
        p.g = contrast(g);
        p.b = contrast(b);
    }
}

/// Applies a sepia tone.
///
/// Input image pixels should have an **unpremultiplied alpha**.
///
/// `level` is a 0..1 mix factor between the source and the sepia color.
pub fn sepia_tone(level: f32, data: &mut [RGBA8]) {
    for p in data {
        let r = p.r as f32;
        let g = p.g as f32;
        let b = p.b as f32;
        let intensity = 0.3 * r + 0.59 * g + 0.11 * b;

        let mix = |c: f32, k: f32| {
            let tone = f32_bound(0.0, intensity * k, 255.0);
            (c + (tone - c) * level + 0.5) as u8
        };

        p.r = mix(r, 1.6);
        p.g = mix(g, 1.2);
        p.b = mix(b, 0.9);
    }
}

fn rgb_to_hsb(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta) / 6.0
    } else if max == g {
        (2.0 + (b - r) / delta) / 6.0
    } else {
        (4.0 + (r - g) / delta) / 6.0
    };

    (h - h.floor(), s, v)
}

fn hsb_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (v, v, v);
    }

    let h = (h - h.floor()) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
