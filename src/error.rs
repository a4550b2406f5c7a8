// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::EffectId;

/// List of all errors.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Error {
    /// A parameter value is outside of its valid range.
    OutOfRange {
        /// Parameter name.
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// Lowest valid value.
        min: f32,
        /// Highest valid value.
        max: f32,
    },

    /// A parameter value is NaN or infinite.
    NotFinite(&'static str),

    /// An image or map size is zero or too big.
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// An input index is not lower than the effect arity.
    InputIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Effect arity.
        arity: usize,
    },

    /// The number of provided inputs doesn't match the effect arity.
    ArityMismatch {
        /// Effect arity.
        expected: usize,
        /// Provided inputs count.
        actual: usize,
    },

    /// Setting an input would make the graph cyclic.
    Cycle,

    /// An effect id doesn't belong to the graph.
    UnknownEffect(EffectId),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::OutOfRange {
                param,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{} must be in a {}..={} range, got {}",
                    param, min, max, value
                )
            }
            Error::NotFinite(param) => {
                write!(f, "{} must be finite", param)
            }
            Error::InvalidSize { width, height } => {
                write!(f, "invalid size {}x{}", width, height)
            }
            Error::InputIndexOutOfRange { index, arity } => {
                write!(
                    f,
                    "input index {} is out of range for an effect with {} inputs",
                    index, arity
                )
            }
            Error::ArityMismatch { expected, actual } => {
                write!(f, "expected {} inputs, got {}", expected, actual)
            }
            Error::Cycle => {
                write!(f, "input would create a cycle")
            }
            Error::UnknownEffect(id) => {
                write!(f, "unknown effect {}", id.get())
            }
        }
    }
}

impl std::error::Error for Error {}

/// Checks that a value is finite and inside the `min..=max` range.
pub(crate) fn check_range(param: &'static str, value: f32, min: f32, max: f32) -> Result<f32, Error> {
    if !value.is_finite() {
        return Err(Error::NotFinite(param));
    }

    if value < min || value > max {
        return Err(Error::OutOfRange {
            param,
            value,
            min,
            max,
        });
    }

    Ok(value)
}

/// Checks that a value is finite.
pub(crate) fn check_finite(param: &'static str, value: f32) -> Result<f32, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NotFinite(param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range() {
        assert_eq!(check_range("radius", 5.0, 0.0, 63.0), Ok(5.0));
        assert_eq!(
            check_range("radius", -1.0, 0.0, 63.0),
            Err(Error::OutOfRange {
                param: "radius",
                value: -1.0,
                min: 0.0,
                max: 63.0,
            })
        );
        assert_eq!(
            check_range("radius", f32::NAN, 0.0, 63.0),
            Err(Error::NotFinite("radius"))
        );
    }

    #[test]
    fn display() {
        let e = Error::OutOfRange {
            param: "radius",
            value: 70.0,
            min: 0.0,
            max: 63.0,
        };
        assert_eq!(e.to_string(), "radius must be in a 0..=63 range, got 70");
    }
}
