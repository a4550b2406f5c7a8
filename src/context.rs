// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::image_data::Surface;
use crate::pool::{ImagePool, PoolStats};
use crate::renderer::{AccelType, CpuRenderer, Renderer};
use crate::source::FloatMapData;
use crate::{FloatMap, IntRect, OptionLog, Source};

/// Filtering options.
#[derive(Clone, Debug)]
pub struct Options {
    /// The biggest image side a context will allocate.
    ///
    /// Bigger requests produce invalid images.
    ///
    /// Default: 8192
    pub max_image_size: u32,

    /// The number of released buffers kept for reuse.
    ///
    /// Default: 16
    pub pool_capacity: usize,

    /// The number of rectangles a dirty region container can hold.
    ///
    /// Default: 6
    pub dirty_region_count: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            max_image_size: 8192,
            pool_capacity: 16,
            dirty_region_count: crate::dirty::DEFAULT_REGION_COUNT,
        }
    }
}

/// A filtering target.
///
/// Owns the renderer, the pixel buffer pool and per-context caches.
/// Cheap to clone, clones refer to the same context.
#[derive(Clone)]
pub struct FilterContext(Rc<ContextData>);

pub(crate) struct ContextData {
    opt: Options,
    renderer: Box<dyn Renderer>,
    pub(crate) pool: RefCell<ImagePool>,
    pub(crate) generation: Cell<u32>,
    sources: RefCell<Vec<SourceEntry>>,
    maps: RefCell<Vec<MapEntry>>,
}

struct SourceEntry {
    source: Weak<tiny_skia::Pixmap>,
    surface: Rc<Surface>,
}

struct MapEntry {
    map: Weak<FloatMapData>,
    version: u64,
    samples: Rc<MapSamples>,
}

/// A context-local copy of a `FloatMap`.
pub(crate) struct MapSamples {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FilterContext")
            .field("accel_type", &self.accel_type())
            .field("generation", &self.generation())
            .finish()
    }
}

impl FilterContext {
    /// Creates a new context backed by the CPU renderer.
    pub fn new(opt: Options) -> Self {
        Self::with_renderer(opt, Box::new(CpuRenderer::new()))
    }

    /// Creates a new context with a custom renderer.
    pub fn with_renderer(opt: Options, renderer: Box<dyn Renderer>) -> Self {
        let pool = ImagePool::new(opt.pool_capacity);
        FilterContext(Rc::new(ContextData {
            opt,
            renderer,
            pool: RefCell::new(pool),
            generation: Cell::new(0),
            sources: RefCell::new(Vec::new()),
            maps: RefCell::new(Vec::new()),
        }))
    }

    /// Returns context options.
    #[inline]
    pub fn options(&self) -> &Options {
        &self.0.opt
    }

    /// Returns context renderer.
    #[inline]
    pub fn renderer(&self) -> &dyn Renderer {
        self.0.renderer.as_ref()
    }

    /// Returns renderer acceleration type.
    #[inline]
    pub fn accel_type(&self) -> AccelType {
        self.0.renderer.accel_type()
    }

    /// Returns the biggest image side this context can allocate.
    #[inline]
    pub fn max_image_size(&self) -> u32 {
        self.0.opt.max_image_size.min(self.0.renderer.max_image_size())
    }

    /// Returns pool counters.
    pub fn pool_stats(&self) -> PoolStats {
        self.0.pool.borrow().stats()
    }

    /// Returns the current resources generation.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.0.generation.get()
    }

    /// Checks that both handles refer to the same context.
    #[inline]
    pub fn ptr_eq(&self, other: &FilterContext) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Invalidates all resources, like a device reset would.
    ///
    /// Images produced before this call become lost:
    /// they will fail `validate` and `addref` will return `None`.
    /// Pooled buffers and cached sources are freed.
    pub fn invalidate_resources(&self) {
        self.0.generation.set(self.0.generation.get().wrapping_add(1));
        log::debug!("Context resources invalidated.");

        // Drop caches outside of the borrow, surfaces check the pool on drop.
        let sources = std::mem::take(&mut *self.0.sources.borrow_mut());
        drop(sources);
        self.0.maps.borrow_mut().clear();
        self.0.pool.borrow_mut().clear();
    }

    pub(crate) fn downgrade(&self) -> Weak<ContextData> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn is(&self, other: &Weak<ContextData>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.0), other.as_ptr())
    }

    /// Allocates a transparent pixmap for the provided region.
    ///
    /// Empty regions get a 1x1 pixmap.
    /// Returns `None` when the region exceeds the context size limit
    /// or the allocation fails.
    ///
    /// The pixmap comes from the context pool and should be wrapped
    /// into an `ImageData` via `ImageData::new`, which will return it back.
    pub fn create_pixmap(&self, region: IntRect) -> Option<tiny_skia::Pixmap> {
        let width = region.width().max(1);
        let height = region.height().max(1);

        let max = self.max_image_size();
        if width > max || height > max {
            log::warn!(
                "Image size {}x{} exceeds the {} limit.",
                width,
                height,
                max
            );
            return None;
        }

        self.0
            .pool
            .borrow_mut()
            .check_out(width, height)
            .log_none(|| log::warn!("Failed to allocate a {}x{} image.", width, height))
    }

    /// Returns a context-local surface for the source.
    ///
    /// The source is copied only once per context.
    pub(crate) fn source_surface(&self, source: &Source) -> Rc<Surface> {
        let mut sources = self.0.sources.borrow_mut();
        sources.retain(|e| e.source.strong_count() != 0);

        if let Some(entry) = sources.iter().find(|e| source.is(&e.source)) {
            return entry.surface.clone();
        }

        log::trace!("Uploading a {}x{} source.", source.width(), source.height());
        let surface = Rc::new(Surface::new_shared(self, source.pixmap().clone()));
        sources.push(SourceEntry {
            source: source.downgrade(),
            surface: surface.clone(),
        });

        surface
    }

    /// Returns a context-local copy of the map, updating it when the map has changed.
    pub(crate) fn map_samples(&self, map: &FloatMap) -> Rc<MapSamples> {
        let mut maps = self.0.maps.borrow_mut();
        maps.retain(|e| e.map.strong_count() != 0);

        let version = map.version();
        if let Some(entry) = maps.iter_mut().find(|e| map.is(&e.map)) {
            if entry.version != version {
                entry.samples = Rc::new(MapSamples::new(map));
                entry.version = version;
            }

            return entry.samples.clone();
        }

        let samples = Rc::new(MapSamples::new(map));
        maps.push(MapEntry {
            map: map.downgrade(),
            version,
            samples: samples.clone(),
        });

        samples
    }

    #[cfg(test)]
    pub(crate) fn cached_sources(&self) -> usize {
        self.0.sources.borrow().len()
    }
}

impl MapSamples {
    fn new(map: &FloatMap) -> Self {
        MapSamples {
            data: map.snapshot(),
            width: map.width(),
            height: map.height(),
        }
    }
}
