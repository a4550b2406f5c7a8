use decora::{FilterContext, GaussianBlur, Options};
use tiny_skia::Transform;

use crate::{context, square_graph};

#[test]
fn buffers_return_to_pool() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(4.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(fctx.pool_stats().outstanding, 1);
    drop(result);

    let stats = fctx.pool_stats();
    assert_eq!(stats.outstanding, 0);
    assert!(stats.returned > 0);

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    drop(result);

    let stats2 = fctx.pool_stats();
    assert_eq!(stats2.created, stats.created);
    assert!(stats2.reused > 0);
    assert_eq!(stats2.outstanding, 0);
}

#[test]
fn ref_counting() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(2.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert_eq!(result.ref_count(), 1);

    let other = result.addref().unwrap();
    assert_eq!(result.ref_count(), 2);

    other.unref();
    assert_eq!(result.ref_count(), 1);
    assert_eq!(fctx.pool_stats().outstanding, 1);
}

#[test]
fn lost_resources() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(2.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));

    fctx.invalidate_resources();
    assert!(result.is_lost());
    assert!(!result.validate(&fctx));
    assert!(result.addref().is_none());

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
}

#[test]
fn foreign_context() {
    let (graph, image) = square_graph();
    let fctx = context();
    let other = context();

    let result = graph.filter(image, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert!(!result.validate(&other));
}

#[test]
fn size_limit() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(4.0).unwrap(), &[image.into()]).unwrap();
    let fctx = FilterContext::new(Options {
        max_image_size: 16,
        ..Options::default()
    });

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(!result.validate(&fctx));
}

#[test]
fn clipped_filtering() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(4.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let clip = decora::IntRect::from_xywh(0, 0, 8, 8);
    let result = graph.filter(blur, &fctx, &Transform::identity(), Some(clip), None);
    assert!(result.validate(&fctx));
    assert!(result.transformed_bounds().contains(&clip));
    assert!(result.transformed_bounds().width() < 40);
}
