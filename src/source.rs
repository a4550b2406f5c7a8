// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::Error;

/// The biggest `FloatMap` side.
pub const MAX_FLOAT_MAP_SIZE: u32 = 4096;

/// An application-provided image.
///
/// Cheap to clone. Every `FilterContext` uploads a source once
/// and shares the uploaded surface between all effects using it.
#[derive(Clone, Debug)]
pub struct Source(Rc<tiny_skia::Pixmap>);

impl Source {
    /// Creates a new source from a pixmap.
    ///
    /// Pixmap pixels should have a **premultiplied alpha**, like all tiny-skia pixmaps.
    pub fn new(pixmap: tiny_skia::Pixmap) -> Self {
        Source(Rc::new(pixmap))
    }

    /// Returns source width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Returns source height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Returns source pixels.
    #[inline]
    pub fn pixmap(&self) -> &tiny_skia::Pixmap {
        &self.0
    }

    pub(crate) fn downgrade(&self) -> Weak<tiny_skia::Pixmap> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn is(&self, other: &Weak<tiny_skia::Pixmap>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.0), other.as_ptr())
    }
}

/// A mutable two-dimensional array of 4-band floating point samples.
///
/// Cheap to clone, clones share samples.
/// Every mutation bumps the map version, which invalidates
/// copies cached by filter contexts.
#[derive(Clone, Debug)]
pub struct FloatMap(Rc<FloatMapData>);

#[derive(Debug)]
pub(crate) struct FloatMapData {
    width: u32,
    height: u32,
    samples: RefCell<Vec<f32>>,
    version: Cell<u64>,
}

impl FloatMap {
    /// Creates a new map filled with zeros.
    ///
    /// Both sides must be in a 1..=4096 range.
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        if width == 0 || height == 0 || width > MAX_FLOAT_MAP_SIZE || height > MAX_FLOAT_MAP_SIZE {
            return Err(Error::InvalidSize { width, height });
        }

        Ok(FloatMap(Rc::new(FloatMapData {
            width,
            height,
            samples: RefCell::new(vec![0.0; (width * height * 4) as usize]),
            version: Cell::new(0),
        })))
    }

    /// Returns map width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.0.width
    }

    /// Returns map height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.0.height
    }

    /// Returns the current version.
    #[inline]
    pub fn version(&self) -> u64 {
        self.0.version.get()
    }

    fn index(&self, x: u32, y: u32, band: usize) -> usize {
        assert!(x < self.0.width && y < self.0.height && band < 4);
        ((self.0.width * y + x) * 4) as usize + band
    }

    /// Returns a sample band.
    ///
    /// # Panics
    ///
    /// When coordinates are outside the map or `band` is not lower than 4.
    pub fn sample(&self, x: u32, y: u32, band: usize) -> f32 {
        let idx = self.index(x, y, band);
        self.0.samples.borrow()[idx]
    }

    /// Sets a sample band.
    ///
    /// # Panics
    ///
    /// When coordinates are outside the map or `band` is not lower than 4.
    pub fn set_sample(&self, x: u32, y: u32, band: usize, value: f32) {
        let idx = self.index(x, y, band);
        self.0.samples.borrow_mut()[idx] = value;
        self.bump();
    }

    /// Sets all bands of a sample.
    ///
    /// # Panics
    ///
    /// When coordinates are outside the map.
    pub fn set_samples(&self, x: u32, y: u32, values: [f32; 4]) {
        let idx = self.index(x, y, 0);
        self.0.samples.borrow_mut()[idx..idx + 4].copy_from_slice(&values);
        self.bump();
    }

    /// Fills every sample with the same values.
    pub fn fill(&self, values: [f32; 4]) {
        for chunk in self.0.samples.borrow_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&values);
        }
        self.bump();
    }

    fn bump(&self) {
        self.0.version.set(self.0.version.get() + 1);
    }

    pub(crate) fn snapshot(&self) -> Vec<f32> {
        self.0.samples.borrow().clone()
    }

    pub(crate) fn downgrade(&self) -> Weak<FloatMapData> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn is(&self, other: &Weak<FloatMapData>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.0), other.as_ptr())
    }
}
