// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::rc::{Rc, Weak};

use tiny_skia::Transform;

use crate::context::ContextData;
use crate::geom::TransformExt;
use crate::{FilterContext, IntRect};

/// A backing pixel buffer.
///
/// Pooled surfaces go back to the context pool when the last `ImageData` releases them.
pub(crate) struct Surface {
    pixmap: Option<tiny_skia::Pixmap>,
    ctx: Weak<ContextData>,
    generation: u32,
    reusable: bool,
}

impl Surface {
    fn new_pooled(fctx: &FilterContext, pixmap: tiny_skia::Pixmap) -> Self {
        Surface {
            pixmap: Some(pixmap),
            ctx: fctx.downgrade(),
            generation: fctx.generation(),
            reusable: true,
        }
    }

    /// Creates a surface that is freed instead of being returned to the pool.
    pub(crate) fn new_shared(fctx: &FilterContext, pixmap: tiny_skia::Pixmap) -> Self {
        Surface {
            pixmap: Some(pixmap),
            ctx: fctx.downgrade(),
            generation: fctx.generation(),
            reusable: false,
        }
    }

    fn is_lost(&self) -> bool {
        match self.ctx.upgrade() {
            Some(ctx) => ctx.generation.get() != self.generation,
            None => true,
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        if !self.reusable {
            return;
        }

        let pixmap = match self.pixmap.take() {
            Some(v) => v,
            None => return,
        };

        if let Some(ctx) = self.ctx.upgrade() {
            let mut pool = ctx.pool.borrow_mut();
            if ctx.generation.get() == self.generation {
                pool.check_in(pixmap);
            } else {
                pool.discard();
            }
        }
    }
}

/// A reference-counted image handle.
///
/// Holds a share of a pixel buffer, the buffer region and a transform
/// that is not applied to the pixels yet.
///
/// Handles are released on drop. The last released handle returns
/// the buffer to the context pool.
/// An image without a buffer is invalid and signals that a filter
/// failed to produce a result.
pub struct ImageData {
    surface: Option<Rc<Surface>>,
    ctx: FilterContext,
    bounds: IntRect,
    transform: Transform,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("valid", &self.surface.is_some())
            .field("bounds", &self.bounds)
            .field("transform", &self.transform)
            .finish()
    }
}

impl ImageData {
    /// Wraps a pixmap into a new image.
    ///
    /// `pixmap` should be allocated via `FilterContext::create_pixmap`,
    /// since it will be returned to the context pool afterwards.
    /// `bounds` is the region the pixmap covers.
    pub fn new(fctx: &FilterContext, pixmap: tiny_skia::Pixmap, bounds: IntRect) -> Self {
        ImageData {
            surface: Some(Rc::new(Surface::new_pooled(fctx, pixmap))),
            ctx: fctx.clone(),
            bounds,
            transform: Transform::identity(),
        }
    }

    /// Creates an invalid image.
    pub fn invalid(fctx: &FilterContext, bounds: IntRect) -> Self {
        ImageData {
            surface: None,
            ctx: fctx.clone(),
            bounds,
            transform: Transform::identity(),
        }
    }

    /// Creates a valid image without pixels.
    pub(crate) fn empty(fctx: &FilterContext) -> Self {
        match fctx.create_pixmap(IntRect::EMPTY) {
            Some(pixmap) => ImageData::new(fctx, pixmap, IntRect::EMPTY),
            None => ImageData::invalid(fctx, IntRect::EMPTY),
        }
    }

    pub(crate) fn from_surface(
        fctx: &FilterContext,
        surface: Rc<Surface>,
        bounds: IntRect,
        transform: Transform,
    ) -> Self {
        ImageData {
            surface: Some(surface),
            ctx: fctx.clone(),
            bounds,
            transform,
        }
    }

    /// Returns the owning context.
    #[inline]
    pub fn context(&self) -> &FilterContext {
        &self.ctx
    }

    /// Takes one more reference to the image buffer.
    ///
    /// Returns `None` when the image is invalid or its buffer was lost.
    pub fn addref(&self) -> Option<ImageData> {
        let surface = self.surface.as_ref()?;
        if surface.is_lost() {
            return None;
        }

        Some(ImageData {
            surface: Some(surface.clone()),
            ctx: self.ctx.clone(),
            bounds: self.bounds,
            transform: self.transform,
        })
    }

    /// Releases this reference.
    ///
    /// Same as dropping the handle.
    #[inline]
    pub fn unref(self) {}

    /// Returns the number of live references to the image buffer.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.surface.as_ref().map_or(0, Rc::strong_count)
    }

    /// Checks that the buffer was invalidated.
    pub fn is_lost(&self) -> bool {
        self.surface.as_ref().map_or(false, |s| s.is_lost())
    }

    /// Checks that the image can be used with the provided context.
    pub fn validate(&self, fctx: &FilterContext) -> bool {
        match self.surface {
            Some(ref surface) => fctx.is(&surface.ctx) && !surface.is_lost(),
            None => false,
        }
    }

    /// Returns the region covered by the buffer, before the pending transform.
    #[inline]
    pub fn untransformed_bounds(&self) -> IntRect {
        self.bounds
    }

    /// Returns the region covered by the image after the pending transform.
    pub fn transformed_bounds(&self) -> IntRect {
        if self.transform.is_identity() {
            self.bounds
        } else {
            self.bounds.to_bounds().transform(&self.transform).round_out()
        }
    }

    /// Returns the pending transform.
    #[inline]
    pub fn pending_transform(&self) -> Transform {
        self.transform
    }

    /// Checks that the image has a pending transform.
    #[inline]
    pub fn is_transformed(&self) -> bool {
        !self.transform.is_identity()
    }

    /// Returns the image pixels, if any.
    ///
    /// Pixels are premultiplied and positioned at the untransformed bounds origin.
    pub fn pixmap(&self) -> Option<&tiny_skia::Pixmap> {
        self.surface.as_ref().and_then(|s| s.pixmap.as_ref())
    }

    /// Returns an image sharing this buffer with `ts` applied after the pending transform.
    pub fn transform(&self, ts: Transform) -> ImageData {
        ImageData {
            surface: self.surface.clone(),
            ctx: self.ctx.clone(),
            bounds: self.bounds,
            transform: ts.pre_concat(self.transform),
        }
    }

    /// Applies the pending transform to the pixels.
    ///
    /// Integer translations only move the bounds and keep sharing the buffer.
    /// The result covers at most `clip`, when set.
    pub fn untransform(self, fctx: &FilterContext, clip: Option<IntRect>) -> ImageData {
        if self.transform.is_identity() || self.surface.is_none() {
            return self;
        }

        if self.transform.is_integer_translate() {
            let ImageData {
                surface,
                ctx,
                bounds,
                transform,
            } = self;
            return ImageData {
                surface,
                ctx,
                bounds: bounds.translate(transform.tx as i32, transform.ty as i32),
                transform: Transform::identity(),
            };
        }

        let mut region = self.transformed_bounds();
        if let Some(clip) = clip {
            region = region.intersect(&clip);
        }

        let mut pixmap = match fctx.create_pixmap(region) {
            Some(v) => v,
            None => return ImageData::invalid(fctx, region),
        };

        if let Some(src) = self.pixmap() {
            if !region.is_empty() {
                let ts = self
                    .transform
                    .pre_translate(self.bounds.x() as f32, self.bounds.y() as f32)
                    .post_translate(-(region.x() as f32), -(region.y() as f32));

                pixmap.draw_pixmap(
                    0,
                    0,
                    src.as_ref(),
                    &tiny_skia::PixmapPaint {
                        quality: tiny_skia::FilterQuality::Bilinear,
                        ..tiny_skia::PixmapPaint::default()
                    },
                    ts,
                    None,
                );
            }
        }

        ImageData::new(fctx, pixmap, region)
    }
}

/// Renders filtered images.
pub trait ImageDataRenderer {
    /// Renders an image with its pending transform.
    fn render_image(&mut self, image: &ImageData);
}

/// Renders images onto a canvas using source-over compositing.
pub struct CanvasRenderer<'a> {
    canvas: tiny_skia::PixmapMut<'a>,
}

impl<'a> CanvasRenderer<'a> {
    /// Creates a new renderer.
    pub fn new(canvas: tiny_skia::PixmapMut<'a>) -> Self {
        CanvasRenderer { canvas }
    }
}

impl ImageDataRenderer for CanvasRenderer<'_> {
    fn render_image(&mut self, image: &ImageData) {
        let bounds = image.untransformed_bounds();
        if bounds.is_empty() {
            return;
        }

        let pixmap = match image.pixmap() {
            Some(v) => v,
            None => return,
        };

        let ts = image
            .pending_transform()
            .pre_translate(bounds.x() as f32, bounds.y() as f32);

        let quality = if ts.is_integer_translate() {
            tiny_skia::FilterQuality::Nearest
        } else {
            tiny_skia::FilterQuality::Bilinear
        };

        self.canvas.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &tiny_skia::PixmapPaint {
                quality,
                ..tiny_skia::PixmapPaint::default()
            },
            ts,
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;

    fn image(fctx: &FilterContext, w: u32, h: u32) -> ImageData {
        let bounds = IntRect::from_xywh(0, 0, w, h);
        let pixmap = fctx.create_pixmap(bounds).unwrap();
        ImageData::new(fctx, pixmap, bounds)
    }

    #[test]
    fn addref_unref_balance() {
        let fctx = FilterContext::new(Options::default());
        let img = image(&fctx, 4, 4);

        let refs: Vec<_> = (0..3).map(|_| img.addref().unwrap()).collect();
        assert_eq!(img.ref_count(), 4);

        for r in refs {
            r.unref();
        }
        assert_eq!(img.ref_count(), 1);
        assert_eq!(fctx.pool_stats().returned, 0);

        img.unref();
        let stats = fctx.pool_stats();
        assert_eq!(stats.returned, 1);
        assert_eq!(stats.outstanding, 0);
    }

    #[test]
    fn shared_owner_keeps_buffer() {
        let fctx = FilterContext::new(Options::default());
        let img = image(&fctx, 4, 4);
        let moved = img.transform(Transform::from_scale(2.0, 2.0));
        assert_eq!(moved.ref_count(), 2);
        assert_eq!(moved.transformed_bounds(), IntRect::from_xywh(0, 0, 8, 8));

        drop(img);
        assert_eq!(fctx.pool_stats().returned, 0);
        drop(moved);
        assert_eq!(fctx.pool_stats().returned, 1);
    }

    #[test]
    fn invalid_image() {
        let fctx = FilterContext::new(Options::default());
        let img = ImageData::invalid(&fctx, IntRect::EMPTY);
        assert!(!img.validate(&fctx));
        assert!(img.addref().is_none());
        assert_eq!(img.ref_count(), 0);
    }

    #[test]
    fn lost_after_invalidation() {
        let fctx = FilterContext::new(Options::default());
        let img = image(&fctx, 4, 4);
        assert!(img.validate(&fctx));

        fctx.invalidate_resources();
        assert!(img.is_lost());
        assert!(!img.validate(&fctx));
        assert!(img.addref().is_none());

        drop(img);
        let stats = fctx.pool_stats();
        assert_eq!(stats.returned, 0);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.outstanding, 0);
    }

    #[test]
    fn foreign_context() {
        let a = FilterContext::new(Options::default());
        let b = FilterContext::new(Options::default());
        let img = image(&a, 1, 1);
        assert!(img.validate(&a));
        assert!(!img.validate(&b));
    }

    #[test]
    fn integer_translate_shares_buffer() {
        let fctx = FilterContext::new(Options::default());
        let img = image(&fctx, 2, 2);
        let keep = img.addref().unwrap();

        let moved = img.transform(Transform::from_translate(3.0, 4.0));
        drop(img);
        let flat = moved.untransform(&fctx, None);
        assert!(!flat.is_transformed());
        assert_eq!(flat.untransformed_bounds(), IntRect::from_xywh(3, 4, 2, 2));
        assert_eq!(flat.ref_count(), 2);
        drop(keep);
    }

    #[test]
    fn scaled_untransform() {
        let fctx = FilterContext::new(Options::default());
        let bounds = IntRect::from_xywh(1, 1, 2, 2);
        let mut pixmap = fctx.create_pixmap(bounds).unwrap();
        pixmap.fill(tiny_skia::Color::BLACK);
        let img = ImageData::new(&fctx, pixmap, bounds);

        let flat = img
            .transform(Transform::from_scale(2.0, 2.0))
            .untransform(&fctx, None);
        assert_eq!(flat.untransformed_bounds(), IntRect::from_xywh(2, 2, 4, 4));
        let pixmap = flat.pixmap().unwrap();
        assert!(pixmap.pixel(1, 1).unwrap().alpha() > 250);
    }
}
