use decora::{Crop, EffectGraph, Error, GaussianBlur, Input, Merge, Offset};

use crate::square_graph;

#[test]
fn arity_mismatch() {
    let mut graph = EffectGraph::new();
    let res = graph.add(GaussianBlur::default(), &[]);
    assert_eq!(res, Err(Error::ArityMismatch { expected: 1, actual: 0 }));

    let res = graph.add(Crop::new(), &[Input::Default]);
    assert_eq!(res, Err(Error::ArityMismatch { expected: 2, actual: 1 }));
    assert!(graph.is_empty());
}

#[test]
fn cycle_is_rejected() {
    let mut graph = EffectGraph::new();
    let a = graph.add(GaussianBlur::default(), &[Input::Default]).unwrap();
    let b = graph.add(Offset::new(1, 1), &[a.into()]).unwrap();

    assert_eq!(graph.set_input(a, 0, b.into()), Err(Error::Cycle));
    assert_eq!(graph.set_input(a, 0, a.into()), Err(Error::Cycle));
    assert_eq!(graph.input(a, 0), Ok(Input::Default));
}

#[test]
fn input_index_out_of_range() {
    let (mut graph, image) = square_graph();
    let blur = graph.add(GaussianBlur::default(), &[Input::Default]).unwrap();

    assert_eq!(
        graph.set_input(blur, 1, image.into()),
        Err(Error::InputIndexOutOfRange { index: 1, arity: 1 })
    );
    assert_eq!(
        graph.input(blur, 3),
        Err(Error::InputIndexOutOfRange { index: 3, arity: 1 })
    );
}

#[test]
fn shared_input() {
    let (mut graph, image) = square_graph();
    let merge = graph.add(Merge::new(2), &[image.into(), image.into()]).unwrap();
    assert_eq!(graph.inputs(merge), Some(&[Input::Effect(image), Input::Effect(image)][..]));
    assert_eq!(graph.len(), 2);
}

#[test]
fn node_access() {
    let mut graph = EffectGraph::new();
    let id = graph.add(Offset::new(1, 2), &[Input::Default]).unwrap();
    assert!(graph.node::<GaussianBlur>(id).is_none());

    graph.node_mut::<Offset>(id).unwrap().set_offset(3, 4);
    assert_eq!(graph.node::<Offset>(id).map(|o| (o.x(), o.y())), Some((3, 4)));
}

#[test]
fn node_kind_is_fixed() {
    let mut graph = EffectGraph::new();
    let id = graph.add(Offset::new(1, 2), &[Input::Default]).unwrap();

    assert!(graph.node_mut::<Merge>(id).is_none());
    assert!(graph.node_mut::<Crop>(id).is_none());
    assert_eq!(graph.get(id).map(|e| e.arity()), Some(1));
    assert_eq!(graph.inputs(id).map(|i| i.len()), Some(1));
}

#[test]
fn unknown_input() {
    let (mut graph, _) = square_graph();
    let mut other = EffectGraph::new();
    for _ in 0..3 {
        other.add(Offset::new(0, 0), &[Input::Default]).unwrap();
    }
    let foreign = other.add(Offset::new(0, 0), &[Input::Default]).unwrap();

    let res = graph.add(Offset::new(0, 0), &[foreign.into()]);
    assert_eq!(res, Err(Error::UnknownEffect(foreign)));
}
