use decora::{
    is_undefined, Blend, BlendMode, Bounds, BoxBlur, BoxShadow, ColorAdjust, Crop,
    DisplacementMap, DropShadow, EffectGraph, EffectId, Flood, FloatMap, GaussianBlur, Identity,
    InnerShadow, Input, IntRect, InvertMask, Merge, MotionBlur, Offset, PerspectiveTransform,
    Reflection, SepiaTone,
};
use tiny_skia::{Color, Point, Transform};

use crate::{context, pixel, square_graph, square_source, IMAGE_SIZE};

#[test]
fn identity_bounds() {
    let (graph, image) = square_graph();
    let fctx = context();

    let result = graph.filter(image, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert!(!result.is_transformed());
    assert_eq!(result.untransformed_bounds(), IntRect::from_xywh(0, 0, IMAGE_SIZE, IMAGE_SIZE));
}

#[test]
fn identity_keeps_scale_pending() {
    let (graph, image) = square_graph();
    let fctx = context();

    let result = graph.filter(image, &fctx, &Transform::from_scale(2.0, 2.0), None, None);
    assert!(result.validate(&fctx));
    assert!(result.is_transformed());
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, 64, 64));
}

#[test]
fn identity_without_source() {
    let mut graph = EffectGraph::new();
    let id = graph.add(Identity::new(None), &[]).unwrap();
    let fctx = context();

    let result = graph.filter(id, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert!(result.untransformed_bounds().is_empty());
    assert!(graph.bounds(id, &Transform::identity(), None).is_empty());
}

#[test]
fn offset_bounds() {
    let (mut graph, image) = square_graph();
    let offset = graph.add(Offset::new(5, 3), &[image.into()]).unwrap();
    let fctx = context();

    let bounds = graph.bounds(offset, &Transform::identity(), None);
    assert_eq!(bounds.round_out(), IntRect::from_xywh(5, 3, IMAGE_SIZE, IMAGE_SIZE));

    let result = graph.filter(offset, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(5, 3, IMAGE_SIZE, IMAGE_SIZE));
}

#[test]
fn offset_point_mapping() {
    let mut graph = EffectGraph::new();
    let empty = graph.add(Merge::new(0), &[]).unwrap();
    let offset = graph.add(Offset::new(5, 3), &[empty.into()]).unwrap();

    let p = graph.transform(offset, Point::from_xy(1.0, 1.0), None);
    assert_eq!((p.x, p.y), (6.0, 4.0));

    let p = graph.untransform(offset, Point::from_xy(6.0, 4.0), None);
    assert_eq!((p.x, p.y), (1.0, 1.0));
}

#[test]
fn undefined_points() {
    let (mut graph, image) = square_graph();
    let flood = graph.add(Flood::default(), &[]).unwrap();
    let mask = graph.add(InvertMask::default(), &[image.into()]).unwrap();
    let map = FloatMap::new(4, 4).unwrap();
    let displace = graph.add(DisplacementMap::new(map), &[image.into()]).unwrap();
    let offset = graph.add(Offset::new(1, 1), &[image.into()]).unwrap();

    let p = Point::from_xy(10.0, 10.0);
    for id in &[image, flood, mask, displace, offset] {
        assert!(is_undefined(graph.transform(*id, p, None)));
        assert!(is_undefined(graph.untransform(*id, p, None)));
    }
}

#[test]
fn default_input() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(2.0).unwrap(), &[Input::Default]).unwrap();
    let fctx = context();

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, Some(image));
    assert!(result.validate(&fctx));

    // No default input to resolve.
    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(!result.validate(&fctx));
}

#[test]
fn gaussian_blur() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(4.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let ts = Transform::identity();
    let bounds = graph.bounds(blur, &ts, None).round_out();
    assert_eq!(bounds, IntRect::from_xywh(-4, -4, 40, 40));

    let result = graph.filter(blur, &fctx, &ts, None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), bounds);

    let pixmap = result.pixmap().unwrap();
    // Pixmap coordinates are shifted by the blur pad.
    assert_eq!(pixel(pixmap, 0, 0).3, 0);
    let (r, g, b, a) = pixel(pixmap, 20, 20);
    assert!(a > 250);
    assert!(r > 250);
    assert_eq!((g, b), (0, 0));

    // Blurred edge.
    let a = pixel(pixmap, 12, 20).3;
    assert!(a > 0 && a < 255);
}

#[test]
fn identity_configurations_keep_pixels() {
    let (mut graph, image) = square_graph();
    let ids = vec![
        graph.add(ColorAdjust::new(), &[image.into()]).unwrap(),
        graph.add(SepiaTone::new(0.0).unwrap(), &[image.into()]).unwrap(),
        graph.add(GaussianBlur::new(0.0).unwrap(), &[image.into()]).unwrap(),
        graph.add(BoxBlur::new(1, 1, 1).unwrap(), &[image.into()]).unwrap(),
        graph.add(Offset::new(0, 0), &[image.into()]).unwrap(),
    ];

    let fctx = context();
    let source = square_source();
    for id in ids {
        let result = graph.filter(id, &fctx, &Transform::identity(), None, None);
        assert!(result.validate(&fctx));
        assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, IMAGE_SIZE, IMAGE_SIZE));
        assert_eq!(result.pixmap().unwrap().data(), source.pixmap().data());
    }
}

#[test]
fn sepia_tone() {
    let (mut graph, image) = square_graph();
    let sepia = graph.add(SepiaTone::new(1.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(sepia, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 0, 0));
    assert_eq!(pixel(pixmap, 16, 16).3, 255);
    assert_ne!(pixel(pixmap, 16, 16), (255, 0, 0, 255));
}

#[test]
fn flood() {
    let mut graph = EffectGraph::new();
    let color = Color::from_rgba8(0, 0, 255, 255);
    let flood = graph
        .add(Flood::new(color, Bounds::from_xywh(2.0, 3.0, 4.0, 5.0)).unwrap(), &[])
        .unwrap();
    let fctx = context();

    let result = graph.filter(flood, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(2, 3, 4, 5));

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 255, 255));
    assert_eq!(pixel(pixmap, 3, 4), (0, 0, 255, 255));

    assert!(!graph.reduces_opaque_pixels(flood));
    assert!(Flood::new(color, Bounds::from_xywh(f32::NAN, 0.0, 1.0, 1.0)).is_err());
}

#[test]
fn flood_with_fractional_bounds() {
    let mut graph = EffectGraph::new();
    let color = Color::from_rgba8(0, 0, 255, 255);
    let flood = graph
        .add(Flood::new(color, Bounds::from_ltrb(0.5, 0.0, 2.0, 1.0)).unwrap(), &[])
        .unwrap();
    let fctx = context();

    let result = graph.filter(flood, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, 2, 1));

    let pixmap = result.pixmap().unwrap();
    // Half covered.
    let a = pixel(pixmap, 0, 0).3;
    assert!(a > 100 && a < 155);
    assert_eq!(pixel(pixmap, 1, 0), (0, 0, 255, 255));
}

#[test]
fn crop() {
    let (mut graph, image) = square_graph();
    let area = Flood::new(Color::BLACK, Bounds::from_xywh(4.0, 4.0, 10.0, 10.0)).unwrap();
    let area = graph.add(area, &[]).unwrap();
    let crop = graph.add(Crop::new(), &[image.into(), area.into()]).unwrap();
    let fctx = context();

    let bounds = graph.bounds(crop, &Transform::identity(), None);
    assert_eq!(bounds.round_out(), IntRect::from_xywh(4, 4, 10, 10));

    let result = graph.filter(crop, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(4, 4, 10, 10));

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixmap.width(), 10);
    // Source pixels at 4x4 and 8x8.
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 0, 0));
    assert_eq!(pixel(pixmap, 4, 4), (255, 0, 0, 255));

    assert!(graph.reduces_opaque_pixels(crop));
}

#[test]
fn crop_without_overlap() {
    let (mut graph, image) = square_graph();
    let area = Flood::new(Color::BLACK, Bounds::from_xywh(100.0, 100.0, 10.0, 10.0)).unwrap();
    let area = graph.add(area, &[]).unwrap();
    let crop = graph.add(Crop::new(), &[image.into(), area.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(crop, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert!(result.untransformed_bounds().is_empty());
}

#[test]
fn merge_bounds() {
    let (mut graph, image) = square_graph();
    let moved = graph.add(Offset::new(8, 0), &[image.into()]).unwrap();
    let merge = graph.add(Merge::new(2), &[image.into(), moved.into()]).unwrap();
    let fctx = context();

    let bounds = graph.bounds(merge, &Transform::identity(), None);
    assert_eq!(bounds.round_out(), IntRect::from_xywh(0, 0, 40, 32));

    let result = graph.filter(merge, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, 40, 32));

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 30, 16), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 4, 16), (0, 0, 0, 0));
}

#[test]
fn drop_shadow() {
    let (mut graph, image) = square_graph();
    let mut shadow = DropShadow::new();
    shadow.set_radius(1.0).unwrap();
    shadow.set_offset(3.0, 2.0).unwrap();
    let shadow = graph.add(shadow, &[image.into(), image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(shadow, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds().x(), 0);
    assert_eq!(result.transformed_bounds().y(), 0);

    let pixmap = result.pixmap().unwrap();
    // Content.
    assert_eq!(pixel(pixmap, 16, 16), (255, 0, 0, 255));
    // Shadow.
    let (r, g, b, a) = pixel(pixmap, 25, 24);
    assert!(a > 250);
    assert!(r < 5 && g < 5 && b < 5);
    // Nothing.
    assert_eq!(pixel(pixmap, 2, 2).3, 0);
}

#[test]
fn invalid_parameters() {
    assert!(GaussianBlur::new(64.0).is_err());
    assert!(GaussianBlur::new(-1.0).is_err());
    assert!(SepiaTone::new(1.5).is_err());

    let mut adjust = ColorAdjust::new();
    assert!(adjust.set_contrast(0.1).is_err());
    assert!(adjust.set_hue(f32::NAN).is_err());
    assert_eq!(adjust, ColorAdjust::default());
}

#[test]
fn zero_blur() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(0.0).unwrap(), &[image.into()]).unwrap();
    let ts = Transform::from_row(1.5, 0.0, 0.0, 1.5, 3.0, 4.0);

    assert_eq!(graph.bounds(blur, &ts, None), graph.bounds(image, &ts, None));
    assert_eq!(graph.reduces_opaque_pixels(blur), graph.reduces_opaque_pixels(image));
    assert!(!graph.reduces_opaque_pixels(blur));
}

#[test]
fn perspective_scale() {
    let (mut graph, image) = square_graph();
    let quad = PerspectiveTransform::new(
        Point::from_xy(0.0, 0.0),
        Point::from_xy(64.0, 0.0),
        Point::from_xy(64.0, 64.0),
        Point::from_xy(0.0, 64.0),
    )
    .unwrap();
    let quad = graph.add(quad, &[image.into()]).unwrap();
    let fctx = context();

    let bounds = graph.bounds(quad, &Transform::identity(), None);
    assert!((bounds.min_x() - 0.0).abs() < 1e-3);
    assert!((bounds.max_x() - 64.0).abs() < 1e-3);
    assert!((bounds.max_y() - 64.0).abs() < 1e-3);

    let result = graph.filter(quad, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    let rect = result.transformed_bounds();
    let pixmap = result.pixmap().unwrap();
    let (x, y) = ((32 - rect.x()) as u32, (32 - rect.y()) as u32);
    let (r, g, b, a) = pixel(pixmap, x, y);
    assert!(r > 250 && a > 250);
    assert_eq!((g, b), (0, 0));

    assert!(graph.reduces_opaque_pixels(quad));
}

#[test]
fn perspective_point_mapping() {
    let mut graph = EffectGraph::new();
    // Defined point mapping with non-empty bounds.
    let flood = Flood::new(Color::BLACK, Bounds::from_xywh(0.0, 0.0, 32.0, 32.0)).unwrap();
    let flood = graph.add(flood, &[]).unwrap();
    let empty = graph.add(Merge::new(0), &[]).unwrap();
    let base = graph.add(Merge::new(2), &[flood.into(), empty.into()]).unwrap();
    let offset = graph.add(Offset::new(5, 3), &[base.into()]).unwrap();

    // Same as the input bounds.
    let quad = PerspectiveTransform::new(
        Point::from_xy(5.0, 3.0),
        Point::from_xy(37.0, 3.0),
        Point::from_xy(37.0, 35.0),
        Point::from_xy(5.0, 35.0),
    )
    .unwrap();
    let quad = graph.add(quad, &[offset.into()]).unwrap();

    let p = graph.transform(quad, Point::from_xy(1.0, 1.0), None);
    assert!((p.x - 6.0).abs() < 1e-3 && (p.y - 4.0).abs() < 1e-3);

    let p = graph.untransform(quad, Point::from_xy(6.0, 4.0), None);
    assert!((p.x - 1.0).abs() < 1e-3 && (p.y - 1.0).abs() < 1e-3);

    for &(x, y) in &[(0.0, 0.0), (10.5, 20.25), (31.0, 2.0)] {
        let p = Point::from_xy(x, y);

        let q = graph.untransform(quad, graph.transform(quad, p, None), None);
        assert!((q.x - x).abs() < 1e-3 && (q.y - y).abs() < 1e-3);

        let q = graph.untransform(offset, graph.transform(offset, p, None), None);
        assert_eq!((q.x, q.y), (x, y));
    }
}

#[test]
fn invert_mask() {
    let (mut graph, image) = square_graph();
    let mask = graph.add(InvertMask::new(2), &[image.into()]).unwrap();
    let fctx = context();

    let result = graph.filter(mask, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(-2, -2, 36, 36));

    let pixmap = result.pixmap().unwrap();
    // Fringe.
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 0, 255));
    // Transparent source.
    assert_eq!(pixel(pixmap, 5, 5), (0, 0, 0, 255));
    // Opaque source.
    assert_eq!(pixel(pixmap, 18, 18), (0, 0, 0, 0));
}

#[test]
fn invert_mask_with_offset() {
    let (mut graph, image) = square_graph();
    let mut mask = InvertMask::new(0);
    mask.set_offset(4, 0);
    let mask = graph.add(mask, &[image.into()]).unwrap();
    let fctx = context();

    let clip = IntRect::from_xywh(8, 8, 8, 8);
    let result = graph.filter(mask, &fctx, &Transform::identity(), Some(clip), None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), clip);

    let pixmap = result.pixmap().unwrap();
    // Reads the source at x - 4.
    assert_eq!(pixel(pixmap, 0, 0), (0, 0, 0, 255));
    assert_eq!(pixel(pixmap, 3, 0), (0, 0, 0, 255));
    assert_eq!(pixel(pixmap, 4, 0), (0, 0, 0, 0));
}

#[test]
fn reflection() {
    let (mut graph, image) = square_graph();
    let reflection = graph.add(Reflection::new(), &[image.into()]).unwrap();
    let fctx = context();

    // 3/4 of the input height.
    let bounds = graph.bounds(reflection, &Transform::identity(), None);
    assert_eq!(bounds.round_out(), IntRect::from_xywh(0, 0, 32, 56));

    let result = graph.filter(reflection, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, 32, 56));

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 16, 16), (255, 0, 0, 255));
    // Mirrors the transparent last row.
    assert_eq!(pixel(pixmap, 16, 32), (0, 0, 0, 0));
    // The last square row at a third of the opacity.
    let (r, g, b, a) = pixel(pixmap, 16, 40);
    assert!((84..=86).contains(&a));
    assert_eq!((r, g, b), (a, 0, 0));
    // Fades out.
    let a2 = pixel(pixmap, 16, 50).3;
    assert!(a2 > 0 && a2 < a);
    assert_eq!(pixel(pixmap, 4, 40), (0, 0, 0, 0));
}

fn displacement_graph(wrap: bool) -> (EffectGraph, EffectId) {
    let (mut graph, image) = square_graph();
    let map = FloatMap::new(1, 1).unwrap();
    map.fill([0.5, 0.0, 0.0, 0.0]);
    let mut displace = DisplacementMap::new(map);
    displace.set_wrap(wrap);
    let displace = graph.add(displace, &[image.into()]).unwrap();
    (graph, displace)
}

#[test]
fn displacement_map() {
    let (graph, displace) = displacement_graph(false);
    let fctx = context();

    let result = graph.filter(displace, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, IMAGE_SIZE, IMAGE_SIZE));

    let pixmap = result.pixmap().unwrap();
    // Shifted left by half of the image.
    assert_eq!(pixel(pixmap, 0, 16), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 4, 16), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 12, 16), (0, 0, 0, 0));
    // Reads past the right edge.
    assert_eq!(pixel(pixmap, 28, 16), (0, 0, 0, 0));
}

#[test]
fn displacement_map_wrapped() {
    let (graph, displace) = displacement_graph(true);
    let fctx = context();

    let result = graph.filter(displace, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));

    let pixmap = result.pixmap().unwrap();
    assert_eq!(pixel(pixmap, 4, 16), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 12, 16), (0, 0, 0, 0));
    // Reads the left side of the source.
    assert_eq!(pixel(pixmap, 28, 16), (255, 0, 0, 255));
    assert_eq!(pixel(pixmap, 20, 16), (0, 0, 0, 0));
}

#[test]
fn inner_shadow() {
    let (mut graph, image) = square_graph();
    let mut shadow = InnerShadow::new();
    shadow.set_radius(3.0).unwrap();
    shadow.set_offset(0.0, 0.0).unwrap();
    let shadow = graph.add(shadow, &[image.into(), image.into()]).unwrap();
    let fctx = context();

    let bounds = graph.bounds(shadow, &Transform::identity(), None);
    assert_eq!(bounds.round_out(), IntRect::from_xywh(0, 0, IMAGE_SIZE, IMAGE_SIZE));

    let result = graph.filter(shadow, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, IMAGE_SIZE, IMAGE_SIZE));

    let pixmap = result.pixmap().unwrap();
    // Far from the edges.
    assert_eq!(pixel(pixmap, 16, 16), (255, 0, 0, 255));
    // Darkened inside the edge.
    let (r, g, b, a) = pixel(pixmap, 8, 16);
    assert_eq!(a, 255);
    assert!(r < 200);
    assert_eq!((g, b), (0, 0));
    // Nothing outside of the content.
    assert_eq!(pixel(pixmap, 2, 2).3, 0);
}

#[test]
fn motion_blur() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(MotionBlur::new(4.0, 0.0).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    // Horizontal only.
    let bounds = graph.bounds(blur, &Transform::identity(), None).round_out();
    assert_eq!(bounds, IntRect::from_xywh(-4, 0, 40, 32));

    let result = graph.filter(blur, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), bounds);

    let pixmap = result.pixmap().unwrap();
    // Pixmap x is shifted by 4.
    let (r, _, _, a) = pixel(pixmap, 20, 16);
    assert!(r > 250 && a > 250);
    let a = pixel(pixmap, 12, 16).3;
    assert!(a > 0 && a < 255);
    // Rows above the square are not touched.
    assert_eq!(pixel(pixmap, 20, 6).3, 0);
    assert!(pixel(pixmap, 20, 8).3 > 250);
}

#[test]
fn box_shadow() {
    let (mut graph, image) = square_graph();
    let shadow = graph.add(BoxShadow::new(3, 3, 1).unwrap(), &[image.into()]).unwrap();
    let fctx = context();

    let bounds = graph.bounds(shadow, &Transform::identity(), None).round_out();
    assert_eq!(bounds, IntRect::from_xywh(-1, -1, 34, 34));

    let result = graph.filter(shadow, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));
    assert_eq!(result.transformed_bounds(), bounds);

    let pixmap = result.pixmap().unwrap();
    // Pixmap coordinates are shifted by 1.
    assert_eq!(pixel(pixmap, 17, 17), (0, 0, 0, 255));
    let (r, g, b, a) = pixel(pixmap, 9, 17);
    assert!((165..=175).contains(&a));
    assert_eq!((r, g, b), (0, 0, 0));
    let a = pixel(pixmap, 8, 17).3;
    assert!((80..=90).contains(&a));
    assert_eq!(pixel(pixmap, 7, 17).3, 0);
}

#[test]
fn color_adjust() {
    let (mut graph, image) = square_graph();
    let mut desaturate = ColorAdjust::new();
    desaturate.set_saturation(-1.0).unwrap();
    let desaturate = graph.add(desaturate, &[image.into()]).unwrap();
    let mut rotate = ColorAdjust::new();
    rotate.set_hue(1.0).unwrap();
    let rotate = graph.add(rotate, &[image.into()]).unwrap();
    let fctx = context();

    for &(id, color) in &[(desaturate, (255, 255, 255, 255)), (rotate, (0, 255, 255, 255))] {
        let result = graph.filter(id, &fctx, &Transform::identity(), None, None);
        assert!(result.validate(&fctx));
        let pixmap = result.pixmap().unwrap();
        assert_eq!(pixel(pixmap, 16, 16), color);
        assert_eq!(pixel(pixmap, 2, 2), (0, 0, 0, 0));
    }
}

fn blend_graph(mode: BlendMode, top: Color, top_bounds: Bounds) -> (EffectGraph, EffectId) {
    let (mut graph, image) = square_graph();
    let top = graph.add(Flood::new(top, top_bounds).unwrap(), &[]).unwrap();
    let blend = graph.add(Blend::new(mode), &[image.into(), top.into()]).unwrap();
    (graph, blend)
}

#[test]
fn blend_channels() {
    let white = Color::WHITE;
    let cyan = Color::from_rgba8(0, 255, 255, 255);
    let cases = [
        (BlendMode::Red, cyan, (0, 0, 0, 255)),
        (BlendMode::Green, white, (255, 255, 0, 255)),
        (BlendMode::Blue, white, (255, 0, 255, 255)),
    ];

    let fctx = context();
    for &(mode, top, color) in &cases {
        let (graph, blend) = blend_graph(mode, top, Bounds::from_xywh(12.0, 12.0, 8.0, 8.0));
        let result = graph.filter(blend, &fctx, &Transform::identity(), None, None);
        assert!(result.validate(&fctx));
        assert_eq!(result.transformed_bounds(), IntRect::from_xywh(0, 0, IMAGE_SIZE, IMAGE_SIZE));

        let pixmap = result.pixmap().unwrap();
        assert_eq!(pixel(pixmap, 16, 16), color);
        // Outside of the top input.
        assert_eq!(pixel(pixmap, 10, 10), (255, 0, 0, 255));
        // Transparent bottom.
        assert_eq!(pixel(pixmap, 2, 2), (0, 0, 0, 0));
    }
}

#[test]
fn blend_src_in() {
    let bounds = Bounds::from_xywh(4.0, 4.0, 8.0, 8.0);
    let (graph, blend) = blend_graph(BlendMode::SrcIn, Color::WHITE, bounds);
    let fctx = context();

    let result = graph.filter(blend, &fctx, &Transform::identity(), None, None);
    assert!(result.validate(&fctx));

    let pixmap = result.pixmap().unwrap();
    // Top inside the bottom.
    assert_eq!(pixel(pixmap, 10, 10), (255, 255, 255, 255));
    // Top outside the bottom.
    assert_eq!(pixel(pixmap, 5, 5), (0, 0, 0, 0));
    // Bottom outside the top.
    assert_eq!(pixel(pixmap, 16, 16), (0, 0, 0, 0));
    assert!(graph.reduces_opaque_pixels(blend));
}
