// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::linear_convolve::{
    box_pad, box_weights, gaussian_pad, gaussian_weights, LinearConvolveKernel,
};
use crate::error::{check_finite, check_range};
use crate::render_state::PassKernel;
use crate::Error;

pub(crate) const MAX_GAUSSIAN_RADIUS: f32 = 63.0;
pub(crate) const MAX_BOX_SIZE: u32 = 255;
pub(crate) const MAX_BOX_PASSES: u32 = 3;

/// Scales a box size, keeping single pixel boxes as is.
pub(crate) fn scale_box_size(size: u32, scale: f32) -> u32 {
    if size <= 1 {
        size
    } else {
        (size as f32 * scale.abs()).round() as u32
    }
}

pub(crate) fn check_box_size(param: &'static str, size: u32) -> Result<u32, Error> {
    check_range(param, size as f32, 0.0, MAX_BOX_SIZE as f32).map(|_| size)
}

pub(crate) fn check_box_passes(passes: u32) -> Result<u32, Error> {
    check_range("passes", passes as f32, 0.0, MAX_BOX_PASSES as f32).map(|_| passes)
}

/// A separable gaussian blur.
#[derive(Clone, PartialEq, Debug)]
pub struct GaussianBlur {
    h_radius: f32,
    v_radius: f32,
}

impl Default for GaussianBlur {
    fn default() -> Self {
        GaussianBlur {
            h_radius: 10.0,
            v_radius: 10.0,
        }
    }
}

impl GaussianBlur {
    /// Creates a new blur with the same radius on both axes.
    ///
    /// `radius` must be in a 0..=63 range. 0 disables the blur.
    pub fn new(radius: f32) -> Result<Self, Error> {
        let mut blur = GaussianBlur::default();
        blur.set_radius(radius)?;
        Ok(blur)
    }

    /// Returns the horizontal radius.
    ///
    /// Use `h_radius` and `v_radius` when they differ.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.h_radius
    }

    /// Sets the radius on both axes.
    pub fn set_radius(&mut self, radius: f32) -> Result<(), Error> {
        let radius = check_range("radius", radius, 0.0, MAX_GAUSSIAN_RADIUS)?;
        self.h_radius = radius;
        self.v_radius = radius;
        Ok(())
    }

    /// Returns the horizontal radius.
    #[inline]
    pub fn h_radius(&self) -> f32 {
        self.h_radius
    }

    /// Sets the horizontal radius.
    pub fn set_h_radius(&mut self, radius: f32) -> Result<(), Error> {
        self.h_radius = check_range("horizontal radius", radius, 0.0, MAX_GAUSSIAN_RADIUS)?;
        Ok(())
    }

    /// Returns the vertical radius.
    #[inline]
    pub fn v_radius(&self) -> f32 {
        self.v_radius
    }

    /// Sets the vertical radius.
    pub fn set_v_radius(&mut self, radius: f32) -> Result<(), Error> {
        self.v_radius = check_range("vertical radius", radius, 0.0, MAX_GAUSSIAN_RADIUS)?;
        Ok(())
    }

    /// Returns the number of pixels the blur spreads on each side.
    pub fn pad(&self) -> (i32, i32) {
        (self.h_radius.ceil() as i32, self.v_radius.ceil() as i32)
    }
}

impl LinearConvolveKernel for GaussianBlur {
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2] {
        [
            PassKernel::new(gaussian_weights(self.h_radius * scale_x.abs(), 0.0), 1.0, 0.0),
            PassKernel::new(gaussian_weights(self.v_radius * scale_y.abs(), 0.0), 0.0, 1.0),
        ]
    }

    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32 {
        gaussian_pad(self.h_radius * scale_x.abs()).max(gaussian_pad(self.v_radius * scale_y.abs()))
    }
}

impl_convolve_effect!(GaussianBlur);

/// A separable box blur, optionally repeated to approximate a gaussian.
#[derive(Clone, PartialEq, Debug)]
pub struct BoxBlur {
    h_size: u32,
    v_size: u32,
    passes: u32,
}

impl Default for BoxBlur {
    fn default() -> Self {
        BoxBlur {
            h_size: 1,
            v_size: 1,
            passes: 1,
        }
    }
}

impl BoxBlur {
    /// Creates a new blur.
    ///
    /// Sizes must be in a 0..=255 range and `passes` in a 0..=3 range.
    /// Sizes lower than 2 or zero passes disable the blur.
    pub fn new(h_size: u32, v_size: u32, passes: u32) -> Result<Self, Error> {
        Ok(BoxBlur {
            h_size: check_box_size("horizontal size", h_size)?,
            v_size: check_box_size("vertical size", v_size)?,
            passes: check_box_passes(passes)?,
        })
    }

    /// Returns the horizontal box size.
    #[inline]
    pub fn h_size(&self) -> u32 {
        self.h_size
    }

    /// Sets the horizontal box size.
    pub fn set_h_size(&mut self, size: u32) -> Result<(), Error> {
        self.h_size = check_box_size("horizontal size", size)?;
        Ok(())
    }

    /// Returns the vertical box size.
    #[inline]
    pub fn v_size(&self) -> u32 {
        self.v_size
    }

    /// Sets the vertical box size.
    pub fn set_v_size(&mut self, size: u32) -> Result<(), Error> {
        self.v_size = check_box_size("vertical size", size)?;
        Ok(())
    }

    /// Returns the number of box applications.
    #[inline]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Sets the number of box applications.
    pub fn set_passes(&mut self, passes: u32) -> Result<(), Error> {
        self.passes = check_box_passes(passes)?;
        Ok(())
    }
}

impl LinearConvolveKernel for BoxBlur {
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2] {
        let h = scale_box_size(self.h_size, scale_x);
        let v = scale_box_size(self.v_size, scale_y);
        [
            PassKernel::new(box_weights(h, self.passes, 0.0), 1.0, 0.0),
            PassKernel::new(box_weights(v, self.passes, 0.0), 0.0, 1.0),
        ]
    }

    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32 {
        box_pad(self.h_size, scale_x, self.passes).max(box_pad(self.v_size, scale_y, self.passes))
    }
}

impl_convolve_effect!(BoxBlur);

/// A gaussian blur along a direction.
#[derive(Clone, PartialEq, Debug)]
pub struct MotionBlur {
    radius: f32,
    angle: f32,
}

impl Default for MotionBlur {
    fn default() -> Self {
        MotionBlur {
            radius: 10.0,
            angle: 0.0,
        }
    }
}

impl MotionBlur {
    /// Creates a new blur.
    ///
    /// `radius` must be in a 0..=63 range. `angle` is in degrees.
    pub fn new(radius: f32, angle: f32) -> Result<Self, Error> {
        Ok(MotionBlur {
            radius: check_range("radius", radius, 0.0, MAX_GAUSSIAN_RADIUS)?,
            angle: check_finite("angle", angle)?,
        })
    }

    /// Returns the radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sets the radius.
    pub fn set_radius(&mut self, radius: f32) -> Result<(), Error> {
        self.radius = check_range("radius", radius, 0.0, MAX_GAUSSIAN_RADIUS)?;
        Ok(())
    }

    /// Returns the angle in degrees.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Sets the angle in degrees.
    pub fn set_angle(&mut self, angle: f32) -> Result<(), Error> {
        self.angle = check_finite("angle", angle)?;
        Ok(())
    }
}

impl MotionBlur {
    /// Returns the blur direction in device space.
    fn direction(&self, scale_x: f32, scale_y: f32) -> (f32, f32) {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        (snap_to_zero(cos) * scale_x, snap_to_zero(sin) * scale_y)
    }
}

impl LinearConvolveKernel for MotionBlur {
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2] {
        let (dx, dy) = self.direction(scale_x, scale_y);
        let len = dx.hypot(dy);
        if self.radius == 0.0 || len == 0.0 {
            return [PassKernel::identity(), PassKernel::identity()];
        }

        [
            PassKernel::new(gaussian_weights(self.radius * len, 0.0), dx / len, dy / len),
            PassKernel::identity(),
        ]
    }

    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32 {
        let (dx, dy) = self.direction(scale_x, scale_y);
        let len = dx.hypot(dy);
        if self.radius == 0.0 || len == 0.0 {
            return 0.0;
        }

        let taps = gaussian_pad(self.radius * len);
        (taps * (dx / len).abs()).ceil().max((taps * (dy / len).abs()).ceil())
    }
}

impl_convolve_effect!(MotionBlur);

/// Removes rounding noise from right angle directions.
fn snap_to_zero(v: f32) -> f32 {
    if v.abs() < 1e-6 {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_state::EffectCoordinateSpace;
    use tiny_skia::Transform;

    #[test]
    fn gaussian_rejects_out_of_range() {
        let mut blur = GaussianBlur::new(5.0).unwrap();
        assert!(blur.set_radius(64.0).is_err());
        assert!(blur.set_radius(-1.0).is_err());
        assert_eq!(blur.set_radius(f32::NAN), Err(Error::NotFinite("radius")));
        assert_eq!(blur.radius(), 5.0);
    }

    #[test]
    fn gaussian_pad() {
        let blur = GaussianBlur::new(2.5).unwrap();
        assert_eq!(blur.pad(), (3, 3));
        let state = blur.convolve_state(&Transform::identity());
        assert_eq!((state.pad_x(), state.pad_y()), (3, 3));
    }

    #[test]
    fn box_blur_identity() {
        let blur = BoxBlur::default();
        assert!(blur.convolve_state(&Transform::identity()).is_nop());
        assert!(BoxBlur::new(256, 1, 1).is_err());
        assert!(BoxBlur::new(1, 1, 4).is_err());
    }

    #[test]
    fn box_blur_scaled() {
        let blur = BoxBlur::new(3, 3, 2).unwrap();
        let state = blur.convolve_state(&Transform::from_scale(2.0, 1.0));
        // A 6px box becomes 7 taps, applied twice.
        assert_eq!((state.pad_x(), state.pad_y()), (6, 2));
    }

    #[test]
    fn extreme_scales_fall_back_to_user_space() {
        let ts = Transform::from_scale(1e9, 1e9);

        let state = GaussianBlur::new(63.0).unwrap().convolve_state(&ts);
        assert_eq!(state.space(), EffectCoordinateSpace::UserSpace);
        assert_eq!(state.pad_x(), 63);

        let state = BoxBlur::new(255, 255, 3).unwrap().convolve_state(&ts);
        assert_eq!(state.space(), EffectCoordinateSpace::UserSpace);
        assert_eq!(state.pad_x(), 381);

        let state = MotionBlur::new(10.0, 30.0).unwrap().convolve_state(&ts);
        assert_eq!(state.space(), EffectCoordinateSpace::UserSpace);
    }

    #[test]
    fn motion_blur_direction() {
        let blur = MotionBlur::new(4.0, 90.0).unwrap();
        let state = blur.convolve_state(&Transform::identity());
        assert_eq!(state.pad_x(), 0);
        assert_eq!(state.pad_y(), 4);
        assert!(state.passes()[1].is_nop());
    }
}
