// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{to_premultiplied, ImageRef, ImageRefMut};

/// A floating point displacement map reference.
///
/// Each sample has 4 bands. Only the first two are used for displacement.
#[derive(Clone, Copy)]
pub struct MapRef<'a> {
    data: &'a [f32],
    width: u32,
    height: u32,
}

impl<'a> MapRef<'a> {
    /// Creates a new map reference.
    ///
    /// # Panics
    ///
    /// When `data` length doesn't match `width * height * 4`.
    #[inline]
    pub fn new(data: &'a [f32], width: u32, height: u32) -> Self {
        assert_eq!(data.len(), (width * height * 4) as usize);
        MapRef { data, width, height }
    }

    /// Returns the first two bands of the sample nearest to a normalized position.
    #[inline]
    fn sample(&self, u: f32, v: f32) -> (f32, f32) {
        let x = ((u * self.width as f32) as i64).clamp(0, self.width as i64 - 1) as u32;
        let y = ((v * self.height as f32) as i64).clamp(0, self.height as i64 - 1) as u32;
        let idx = ((self.width * y + x) * 4) as usize;
        (self.data[idx], self.data[idx + 1])
    }
}

/// Displacement parameters.
///
/// Offsets and displacement are in image-size units,
/// so an offset of 1 shifts by the whole image width or height.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Displacement {
    /// Horizontal map scale.
    pub scale_x: f32,
    /// Vertical map scale.
    pub scale_y: f32,
    /// Horizontal offset.
    pub offset_x: f32,
    /// Vertical offset.
    pub offset_y: f32,
    /// Wrap source lookups around the image edges.
    pub wrap: bool,
}

/// Applies a displacement map.
///
/// For each `dest` pixel at a normalized position (u, v) the source is read at
/// `u + offset_x + scale_x * map[0]`, `v + offset_y + scale_y * map[1]`.
///
/// - `src` pixels should have a **premultiplied alpha**.
/// - `dest` pixels will have a **premultiplied alpha**.
///
/// # Panics
///
/// When `src` and `dest` have different sizes.
pub fn displacement_map(params: Displacement, map: MapRef, src: ImageRef, mut dest: ImageRefMut) {
    assert!(src.width == dest.width && src.height == dest.height);

    let w = src.width as f32;
    let h = src.height as f32;

    for y in 0..dest.height {
        for x in 0..dest.width {
            let u = (x as f32 + 0.5) / w;
            let v = (y as f32 + 0.5) / h;
            let (m0, m1) = map.sample(u, v);

            let mut su = u + params.offset_x + params.scale_x * m0;
            let mut sv = v + params.offset_y + params.scale_y * m1;
            if params.wrap {
                su -= su.floor();
                sv -= sv.floor();
            }

            *dest.pixel_at_mut(x, y) = to_premultiplied(src.sample(su * w, sv * h));
        }
    }
}
