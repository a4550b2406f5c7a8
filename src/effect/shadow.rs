// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::Color;

use super::blur::{check_box_passes, check_box_size, scale_box_size, MAX_GAUSSIAN_RADIUS};
use super::linear_convolve::{
    box_pad, box_weights, gaussian_pad, gaussian_weights, LinearConvolveKernel,
};
use crate::error::{check_finite, check_range};
use crate::render_state::PassKernel;
use crate::Error;

fn check_spread(spread: f32) -> Result<f32, Error> {
    check_range("spread", spread, 0.0, 1.0)
}

/// A gaussian shadow of the input alpha.
#[derive(Clone, PartialEq, Debug)]
pub struct GaussianShadow {
    h_radius: f32,
    v_radius: f32,
    spread: f32,
    color: Color,
}

impl Default for GaussianShadow {
    fn default() -> Self {
        GaussianShadow {
            h_radius: 10.0,
            v_radius: 10.0,
            spread: 0.0,
            color: Color::BLACK,
        }
    }
}

impl GaussianShadow {
    /// Creates a new black shadow.
    ///
    /// `radius` must be in a 0..=63 range.
    pub fn new(radius: f32) -> Result<Self, Error> {
        let mut shadow = GaussianShadow::default();
        shadow.set_radius(radius)?;
        Ok(shadow)
    }

    pub(crate) fn from_parts(radius: f32, spread: f32, color: Color) -> Self {
        GaussianShadow {
            h_radius: radius,
            v_radius: radius,
            spread,
            color,
        }
    }

    /// Returns the horizontal radius.
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

    /// Returns the radius of an equivalent gaussian kernel.
    ///
    /// Same as `radius`.
    #[inline]
    pub fn gaussian_radius(&self) -> f32 {
        self.radius()
    }

    /// Sets the radius of an equivalent gaussian kernel.
    #[inline]
    pub fn set_gaussian_radius(&mut self, radius: f32) -> Result<(), Error> {
        self.set_radius(radius)
    }

    /// Returns the width of an equivalent gaussian kernel.
    #[inline]
    pub fn gaussian_width(&self) -> f32 {
        self.radius() * 2.0 + 1.0
    }

    /// Sets the width of an equivalent gaussian kernel.
    pub fn set_gaussian_width(&mut self, width: f32) -> Result<(), Error> {
        let width = check_range("gaussian width", width, 1.0, MAX_GAUSSIAN_RADIUS * 2.0 + 1.0)?;
        self.set_radius((width - 1.0) / 2.0)
    }

    /// Returns the spread.
    #[inline]
    pub fn spread(&self) -> f32 {
        self.spread
    }

    /// Sets the spread.
    ///
    /// Must be in a 0..=1 range, where 1 makes the shadow fully opaque within its radius.
    pub fn set_spread(&mut self, spread: f32) -> Result<(), Error> {
        self.spread = check_spread(spread)?;
        Ok(())
    }

    /// Returns the shadow color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the shadow color.
    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl LinearConvolveKernel for GaussianShadow {
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2] {
        let h = self.h_radius * scale_x.abs();
        let v = self.v_radius * scale_y.abs();
        [
            PassKernel::new(gaussian_weights(h, self.spread), 1.0, 0.0),
            PassKernel::new(gaussian_weights(v, self.spread), 0.0, 1.0),
        ]
    }

    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32 {
        gaussian_pad(self.h_radius * scale_x.abs()).max(gaussian_pad(self.v_radius * scale_y.abs()))
    }

    fn shadow_color(&self) -> Option<Color> {
        Some(self.color)
    }
}

impl_convolve_effect!(GaussianShadow);

/// A box shadow of the input alpha.
#[derive(Clone, PartialEq, Debug)]
pub struct BoxShadow {
    h_size: u32,
    v_size: u32,
    passes: u32,
    spread: f32,
    color: Color,
}

impl Default for BoxShadow {
    fn default() -> Self {
        BoxShadow {
            h_size: 1,
            v_size: 1,
            passes: 1,
            spread: 0.0,
            color: Color::BLACK,
        }
    }
}

impl BoxShadow {
    /// Creates a new black shadow.
    ///
    /// Sizes must be in a 0..=255 range and `passes` in a 0..=3 range.
    pub fn new(h_size: u32, v_size: u32, passes: u32) -> Result<Self, Error> {
        Ok(BoxShadow {
            h_size: check_box_size("horizontal size", h_size)?,
            v_size: check_box_size("vertical size", v_size)?,
            passes: check_box_passes(passes)?,
            ..BoxShadow::default()
        })
    }

    pub(crate) fn from_parts(size: u32, passes: u32, spread: f32, color: Color) -> Self {
        BoxShadow {
            h_size: size,
            v_size: size,
            passes,
            spread,
            color,
        }
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

    /// Returns the horizontal width of an equivalent gaussian kernel.
    ///
    /// Each pass widens the kernel by `h_size - 1`.
    pub fn gaussian_width(&self) -> f32 {
        (self.h_size.max(1) - 1) as f32 * self.passes as f32 + 1.0
    }

    /// Sets box sizes on both axes to approximate a gaussian kernel width.
    ///
    /// Sizes are rounded, so `gaussian_width` can differ afterwards.
    pub fn set_gaussian_width(&mut self, width: f32) -> Result<(), Error> {
        let width = check_finite("gaussian width", width)?;
        let size = box_size_for_width(width, self.passes);
        let max = (MAX_BOX_SIZE_F - 1.0) * self.passes.max(1) as f32 + 1.0;
        if width < 0.0 || size > MAX_BOX_SIZE_F {
            return Err(Error::OutOfRange {
                param: "gaussian width",
                value: width,
                min: 0.0,
                max,
            });
        }

        self.h_size = size as u32;
        self.v_size = size as u32;
        Ok(())
    }

    /// Returns the radius of an equivalent gaussian kernel.
    #[inline]
    pub fn gaussian_radius(&self) -> f32 {
        (self.gaussian_width() - 1.0) / 2.0
    }

    /// Sets box sizes to approximate a gaussian kernel radius.
    #[inline]
    pub fn set_gaussian_radius(&mut self, radius: f32) -> Result<(), Error> {
        self.set_gaussian_width(radius * 2.0 + 1.0)
    }

    /// Returns the spread.
    #[inline]
    pub fn spread(&self) -> f32 {
        self.spread
    }

    /// Sets the spread.
    pub fn set_spread(&mut self, spread: f32) -> Result<(), Error> {
        self.spread = check_spread(spread)?;
        Ok(())
    }

    /// Returns the shadow color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the shadow color.
    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

const MAX_BOX_SIZE_F: f32 = super::blur::MAX_BOX_SIZE as f32;

/// Returns a rounded box size that approximates a gaussian width.
pub(crate) fn box_size_for_width(width: f32, passes: u32) -> f32 {
    ((width - 1.0) / passes.max(1) as f32 + 1.0).round().max(0.0)
}

impl LinearConvolveKernel for BoxShadow {
    fn pass_kernels(&self, scale_x: f32, scale_y: f32) -> [PassKernel; 2] {
        let h = scale_box_size(self.h_size, scale_x);
        let v = scale_box_size(self.v_size, scale_y);
        [
            PassKernel::new(box_weights(h, self.passes, self.spread), 1.0, 0.0),
            PassKernel::new(box_weights(v, self.passes, self.spread), 0.0, 1.0),
        ]
    }

    fn max_pass_pad(&self, scale_x: f32, scale_y: f32) -> f32 {
        box_pad(self.h_size, scale_x, self.passes).max(box_pad(self.v_size, scale_y, self.passes))
    }

    fn shadow_color(&self) -> Option<Color> {
        Some(self.color)
    }
}

impl_convolve_effect!(BoxShadow);
