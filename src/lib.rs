// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`decora` is an image effects filter graph.

Effects are stored in an [`EffectGraph`] and evaluated on demand into
reference-counted [`ImageData`] buffers, owned by a [`FilterContext`].

```
use decora::{EffectGraph, FilterContext, GaussianBlur, Identity, Input, Options, Source};

let source = Source::new(tiny_skia::Pixmap::new(32, 32).unwrap());

let mut graph = EffectGraph::new();
let image = graph.add(Identity::new(Some(source)), &[]).unwrap();
let blur = graph.add(GaussianBlur::new(4.0).unwrap(), &[Input::Effect(image)]).unwrap();

let fctx = FilterContext::new(Options::default());
let result = graph.filter(blur, &fctx, &tiny_skia::Transform::identity(), None, None);
assert!(result.validate(&fctx));
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::new_without_default)]

mod context;
mod dirty;
mod effect;
mod error;
mod geom;
mod graph;
mod image_data;
mod pool;
mod render_state;
mod renderer;
mod source;

pub use context::{FilterContext, Options};
pub use dirty::{DirtyRegionContainer, DirtyRegionPool, DEFAULT_REGION_COUNT};
pub use effect::{
    Blend, BlendMode, BoxBlur, BoxShadow, ColorAdjust, Crop, DisplacementMap, DropShadow, Effect,
    EffectKind, Flood, GaussianBlur, GaussianShadow, Identity, InnerShadow, InvertMask, Merge,
    MotionBlur, Offset, PerspectiveTransform, Reflection, SepiaTone, ShadowMode,
};
pub use error::Error;
pub use geom::{is_undefined, undefined_point, Bounds, IntRect, ProjectiveTransform};
pub use graph::{EffectGraph, EffectId, Input};
pub use image_data::{CanvasRenderer, ImageData, ImageDataRenderer};
pub use pool::PoolStats;
pub use render_state::{
    ConvolveRenderState, CustomRenderState, EffectCoordinateSpace, PaddedRenderState, PassKernel,
    RenderState,
};
pub use renderer::{AccelType, ConvolvePass, ConvolvePeer, CpuRenderer, Renderer};
pub use source::{FloatMap, Source, MAX_FLOAT_MAP_SIZE};

pub use tiny_skia;

pub(crate) trait OptionLog {
    fn log_none<F: FnOnce()>(self, f: F) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn log_none<F: FnOnce()>(self, f: F) -> Self {
        self.or_else(|| {
            f();
            None
        })
    }
}
