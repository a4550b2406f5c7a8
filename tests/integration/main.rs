use decora::{EffectGraph, EffectId, FilterContext, Identity, Options, Source};
use once_cell::sync::Lazy;
use rgb::{FromSlice, RGBA8};

mod dirty;
mod effects;
mod graph;
mod image_data;
mod limits;

const IMAGE_SIZE: u32 = 32;

/// A transparent image with an opaque red square at 8x8.
static SQUARE: Lazy<tiny_skia::Pixmap> = Lazy::new(|| {
    let mut pixmap = tiny_skia::Pixmap::new(IMAGE_SIZE, IMAGE_SIZE).unwrap();
    let data = pixmap.data_mut().as_rgba_mut();
    for y in 8..24 {
        for x in 8..24 {
            data[(y * IMAGE_SIZE + x) as usize] = RGBA8::new(255, 0, 0, 255);
        }
    }

    pixmap
});

pub fn square_source() -> Source {
    Source::new(SQUARE.clone())
}

/// Creates a graph with a single source effect.
pub fn square_graph() -> (EffectGraph, EffectId) {
    let mut graph = EffectGraph::new();
    let id = graph.add(Identity::new(Some(square_source())), &[]).unwrap();
    (graph, id)
}

pub fn context() -> FilterContext {
    FilterContext::new(Options::default())
}

pub fn pixel(pixmap: &tiny_skia::Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
    let c = pixmap.pixel(x, y).unwrap();
    (c.red(), c.green(), c.blue(), c.alpha())
}

#[test]
fn fixture() {
    let pixmap = &*SQUARE;
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 0, 0));
    assert_eq!(pixel(pixmap, 8, 8), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 23, 23), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 24, 24), (0, 0, 0, 0));
}
