use decora::{
    Bounds, DirtyRegionPool, GaussianBlur, Identity, InvertMask, Offset, DEFAULT_REGION_COUNT,
};

use crate::square_graph;

#[test]
fn source_changes() {
    let (mut graph, image) = square_graph();
    let mut pool = DirtyRegionPool::new(DEFAULT_REGION_COUNT);

    let regions = graph.dirty_regions(image, None, &mut pool);
    assert!(regions.is_empty());
    pool.check_in(regions);

    graph
        .node_mut::<Identity>(image)
        .unwrap()
        .mark_dirty(Bounds::from_xywh(0.0, 0.0, 4.0, 4.0));

    let regions = graph.dirty_regions(image, None, &mut pool);
    assert_eq!(regions.size(), 1);
    assert_eq!(regions.region(0), Bounds::from_xywh(0.0, 0.0, 4.0, 4.0));
}

#[test]
fn blur_grows_regions() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::new(2.0).unwrap(), &[image.into()]).unwrap();
    graph
        .node_mut::<Identity>(image)
        .unwrap()
        .mark_dirty(Bounds::from_xywh(0.0, 0.0, 4.0, 4.0));

    let mut pool = DirtyRegionPool::new(DEFAULT_REGION_COUNT);
    let regions = graph.dirty_regions(blur, None, &mut pool);
    assert_eq!(regions.size(), 1);
    assert_eq!(regions.region(0), Bounds::from_xywh(-2.0, -2.0, 8.0, 8.0));
}

#[test]
fn offset_moves_regions() {
    let (mut graph, image) = square_graph();
    let offset = graph.add(Offset::new(5, 3), &[image.into()]).unwrap();
    let mask = graph.add(InvertMask::new(1), &[offset.into()]).unwrap();
    graph
        .node_mut::<Identity>(image)
        .unwrap()
        .mark_dirty(Bounds::from_xywh(0.0, 0.0, 4.0, 4.0));

    let mut pool = DirtyRegionPool::new(DEFAULT_REGION_COUNT);
    let regions = graph.dirty_regions(offset, None, &mut pool);
    assert_eq!(regions.union_bounds(), Bounds::from_xywh(5.0, 3.0, 4.0, 4.0));
    pool.check_in(regions);

    let regions = graph.dirty_regions(mask, None, &mut pool);
    assert_eq!(regions.union_bounds(), Bounds::from_xywh(4.0, 2.0, 6.0, 6.0));
}

#[test]
fn moving_a_source() {
    let (mut graph, image) = square_graph();
    graph
        .node_mut::<Identity>(image)
        .unwrap()
        .set_location(40.0, 0.0)
        .unwrap();

    let mut pool = DirtyRegionPool::new(DEFAULT_REGION_COUNT);
    let regions = graph.dirty_regions(image, None, &mut pool);
    assert_eq!(regions.size(), 2);
    assert_eq!(regions.union_bounds(), Bounds::from_xywh(0.0, 0.0, 72.0, 32.0));

    graph.node_mut::<Identity>(image).unwrap().clear_dirty();
    let regions = graph.dirty_regions(image, None, &mut pool);
    assert!(regions.is_empty());
}
