use decora::{
    ColorAdjust, FilterContext, GaussianBlur, IntRect, InvertMask, Merge, Options, Reflection,
};
use tiny_skia::Transform;

use crate::{context, pixel, square_graph};

#[test]
fn invert_mask_with_min_offset() {
    let (mut graph, image) = square_graph();
    let mut mask = InvertMask::new(0);
    mask.set_offset(i32::MIN, 0);
    let mask = graph.add(mask, &[image.into()]).unwrap();
    let fctx = context();

    let clip = IntRect::from_xywh(0, 0, 10, 10);
    let result = graph.filter(mask, &fctx, &Transform::identity(), Some(clip), None);
    assert!(result.validate(&fctx));
    assert!(result.untransformed_bounds().is_empty());

    let bounds = graph.bounds(mask, &Transform::identity(), None);
    assert!(bounds.max_x() < 0.0);
}

#[test]
fn invert_mask_with_max_pad() {
    let (mut graph, image) = square_graph();
    let mask = graph.add(InvertMask::new(u32::MAX), &[image.into()]).unwrap();
    let fctx = context();

    let clip = IntRect::from_xywh(0, 0, 10, 10);
    let result = graph.filter(mask, &fctx, &Transform::identity(), Some(clip), None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), clip);

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 0, 255));
    assert_eq!(pixel(pixmap, 9, 9), (0, 0, 0, 0));

    // Too big to allocate.
    let result = graph.filter(mask, &fctx, &Transform::identity(), None, None);
    assert!(!result.validate(&fctx));
}

#[test]
fn reflection_far_away() {
    let (mut graph, image) = square_graph();
    let mut reflection = Reflection::new();
    reflection.set_top_offset(1e10).unwrap();
    let reflection = graph.add(reflection, &[image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(reflection, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, 32, 32));

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 16, 16), (255, 0, 0, 255));

    let bounds = graph.bounds(reflection, &Transform::identity(), None);
    assert!(bounds.max_y() > 1e9);
}

#[test]
fn blur_at_extreme_scale() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(4.0).unwrap(), &[image.into()]).unwrap();

    // Blurred in user space, then scaled.
    let bounds = graph.bounds(blur, &Transform::from_scale(1e9, 1e9), None);
    assert!((bounds.min_x() / 1e9 + 4.0).abs() < 1e-3);
    assert!((bounds.max_x() / 1e9 - 36.0).abs() < 1e-3);
}

#[test]
fn invalid_intermediate_fails_fast() {
    let (mut graph, image) = square_graph();
    // 72x72, above the limit.
    let mask = graph.add(InvertMask::new(20), &[image.into()]).unwrap();
    let adjust = graph.add(ColorAdjust::new(), &[mask.into()]).unwrap();
    let merge = graph.add(Merge::new(2), &[image.into(), adjust.into()]).unwrap();
    let fctx = FilterContext::new(Options {
        max_image_size: 64,
        ..Options::default()
    });

    let result = graph.filter(image, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    drop(result);

    for id in &[mask, adjust, merge] {
        let result = graph.filter(*id, &fctx, &Transform::identity(), None, None);
        assert!(!result.validate(&fctx));
    }

    assert_eq!(fctx.pool_stats().outstanding, 0);
}
