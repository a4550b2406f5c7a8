// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tiny_skia::{Point, Transform};

use crate::dirty::{DirtyRegionContainer, DirtyRegionPool};
use crate::effect::{Effect, EffectKind};
use crate::geom::undefined_point;
use crate::image_data::ImageDataRenderer;
use crate::renderer::AccelType;
use crate::{Bounds, Error, FilterContext, ImageData, IntRect};

/// An effect handle.
///
/// Valid only for the graph that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EffectId(u32);

impl EffectId {
    /// Returns the raw index.
    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// An effect input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Input {
    /// Use the default input provided by the caller.
    Default,
    /// Use an effect output.
    Effect(EffectId),
}

impl Default for Input {
    #[inline]
    fn default() -> Self {
        Input::Default
    }
}

impl From<EffectId> for Input {
    #[inline]
    fn from(id: EffectId) -> Self {
        Input::Effect(id)
    }
}

struct Node {
    effect: Effect,
    inputs: Vec<Input>,
}

/// An effects graph.
///
/// Effects are stored in an arena and addressed by `EffectId`.
/// One effect can be an input of any number of other effects,
/// but the graph can never have cycles.
///
/// All evaluation methods accept a `default_input`. It is used by every
/// `Input::Default` input, recursively, and is itself evaluated
/// without a default input.
#[derive(Default)]
pub struct EffectGraph {
    nodes: Vec<Node>,
}

impl std::fmt::Debug for EffectGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|n| (n.effect.kind_name(), &n.inputs)))
            .finish()
    }
}

impl EffectGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        EffectGraph::default()
    }

    /// Returns the number of effects.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks that the graph has no effects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks that the id belongs to this graph.
    #[inline]
    pub fn contains(&self, id: EffectId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    /// Adds an effect.
    ///
    /// The number of `inputs` must match the effect arity.
    pub fn add<E: Into<Effect>>(&mut self, effect: E, inputs: &[Input]) -> Result<EffectId, Error> {
        let effect = effect.into();
        let arity = effect.arity();
        if inputs.len() != arity {
            return Err(Error::ArityMismatch {
                expected: arity,
                actual: inputs.len(),
            });
        }

        for input in inputs {
            if let Input::Effect(id) = *input {
                self.node_ref(id)?;
            }
        }

        let id = EffectId(self.nodes.len() as u32);
        self.nodes.push(Node {
            effect,
            inputs: inputs.to_vec(),
        });

        Ok(id)
    }

    /// Returns an effect.
    #[inline]
    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.nodes.get(id.0 as usize).map(|n| &n.effect)
    }

    /// Returns an effect of a specific kind.
    ///
    /// # Example
    ///
    /// ```
    /// use decora::{EffectGraph, GaussianBlur, Input};
    ///
    /// let mut graph = EffectGraph::new();
    /// let id = graph.add(GaussianBlur::new(4.0).unwrap(), &[Input::Default]).unwrap();
    /// graph.node_mut::<GaussianBlur>(id).unwrap().set_radius(2.0).unwrap();
    /// assert_eq!(graph.node::<GaussianBlur>(id).unwrap().radius(), 2.0);
    /// ```
    pub fn node<T: EffectKind>(&self, id: EffectId) -> Option<&T> {
        self.get(id).and_then(T::from_effect)
    }

    /// Returns a mutable effect of a specific kind.
    ///
    /// Only the effect parameters can be changed this way.
    /// The effect kind and the number of inputs stay the same.
    pub fn node_mut<T: EffectKind>(&mut self, id: EffectId) -> Option<&mut T> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|n| T::from_effect_mut(&mut n.effect))
    }

    /// Returns effect inputs.
    #[inline]
    pub fn inputs(&self, id: EffectId) -> Option<&[Input]> {
        self.nodes.get(id.0 as usize).map(|n| n.inputs.as_slice())
    }

    /// Returns an effect input.
    pub fn input(&self, id: EffectId, index: usize) -> Result<Input, Error> {
        let node = self.node_ref(id)?;
        node.inputs
            .get(index)
            .cloned()
            .ok_or(Error::InputIndexOutOfRange {
                index,
                arity: node.inputs.len(),
            })
    }

    /// Replaces an effect input.
    ///
    /// Inputs that would make the graph cyclic are rejected.
    pub fn set_input(&mut self, id: EffectId, index: usize, input: Input) -> Result<(), Error> {
        let arity = self.node_ref(id)?.inputs.len();
        if index >= arity {
            return Err(Error::InputIndexOutOfRange { index, arity });
        }

        if let Input::Effect(target) = input {
            self.node_ref(target)?;
            if self.reaches(target, id) {
                return Err(Error::Cycle);
            }
        }

        self.nodes[id.0 as usize].inputs[index] = input;
        Ok(())
    }

    fn node_ref(&self, id: EffectId) -> Result<&Node, Error> {
        self.nodes.get(id.0 as usize).ok_or(Error::UnknownEffect(id))
    }

    /// Checks that `to` is `from` or one of its direct or indirect inputs.
    fn reaches(&self, from: EffectId, to: EffectId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }

            let idx = id.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            for input in &self.nodes[idx].inputs {
                if let Input::Effect(child) = *input {
                    stack.push(child);
                }
            }
        }

        false
    }

    fn eval(&self, id: EffectId, default_input: Option<EffectId>) -> Option<(&Effect, Inputs)> {
        let node = match self.nodes.get(id.0 as usize) {
            Some(v) => v,
            None => {
                log::warn!("Effect {} is not a part of the graph.", id.0);
                return None;
            }
        };

        let inputs = Inputs {
            graph: self,
            inputs: &node.inputs,
            default_input,
        };

        Some((&node.effect, inputs))
    }

    /// Returns the output bounds.
    pub fn bounds(&self, id: EffectId, ts: &Transform, default_input: Option<EffectId>) -> Bounds {
        match self.eval(id, default_input) {
            Some((effect, inputs)) => effect.imp().bounds(&inputs, ts),
            None => Bounds::EMPTY,
        }
    }

    /// Filters an effect.
    ///
    /// `clip` is the device region that has to be produced, `None` means everything.
    /// The result can cover more than `clip` and can carry a pending transform.
    ///
    /// Callers must check the result with `ImageData::validate`.
    pub fn filter(
        &self,
        id: EffectId,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
        default_input: Option<EffectId>,
    ) -> ImageData {
        match self.eval(id, default_input) {
            Some((effect, inputs)) => effect.imp().filter(&inputs, fctx, ts, clip),
            None => ImageData::invalid(fctx, IntRect::EMPTY),
        }
    }

    /// Maps a point from the input space into the output space.
    ///
    /// Returns an undefined point when the effect has no point mapping.
    pub fn transform(&self, id: EffectId, p: Point, default_input: Option<EffectId>) -> Point {
        match self.eval(id, default_input) {
            Some((effect, inputs)) => effect.imp().transform_point(&inputs, p),
            None => undefined_point(),
        }
    }

    /// Maps a point from the output space into the input space.
    ///
    /// Returns an undefined point when the effect has no point mapping.
    pub fn untransform(&self, id: EffectId, p: Point, default_input: Option<EffectId>) -> Point {
        match self.eval(id, default_input) {
            Some((effect, inputs)) => effect.imp().untransform_point(&inputs, p),
            None => undefined_point(),
        }
    }

    /// Returns the output regions affected by input changes.
    pub fn dirty_regions(
        &self,
        id: EffectId,
        default_input: Option<EffectId>,
        pool: &mut DirtyRegionPool,
    ) -> DirtyRegionContainer {
        match self.eval(id, default_input) {
            Some((effect, inputs)) => effect.imp().dirty_regions(&inputs, pool),
            None => pool.check_out(),
        }
    }

    /// Checks that the effect can make opaque pixels transparent.
    ///
    /// Can return `true` when unsure.
    pub fn reduces_opaque_pixels(&self, id: EffectId) -> bool {
        match self.eval(id, None) {
            Some((effect, inputs)) => effect.imp().reduces_opaque_pixels(&inputs),
            None => true,
        }
    }

    /// Returns the acceleration tier used by the effect.
    pub fn accel_type(&self, id: EffectId, fctx: &FilterContext) -> AccelType {
        match self.get(id) {
            Some(effect) => effect.imp().accel_type(fctx),
            None => fctx.accel_type(),
        }
    }

    /// Filters an effect and renders the result with its pending transform.
    ///
    /// Invalid results are skipped.
    pub fn render(
        &self,
        id: EffectId,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
        default_input: Option<EffectId>,
        renderer: &mut dyn ImageDataRenderer,
    ) {
        let image = self.filter(id, fctx, ts, clip, default_input);
        if !image.validate(fctx) {
            log::warn!("Effect {} produced an invalid image.", id.0);
            return;
        }

        renderer.render_image(&image);
    }
}

/// Inputs of an effect being evaluated.
pub(crate) struct Inputs<'a> {
    graph: &'a EffectGraph,
    inputs: &'a [Input],
    default_input: Option<EffectId>,
}

impl Inputs<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the effect to evaluate and the default input it should get.
    fn resolve(&self, i: usize) -> Option<(EffectId, Option<EffectId>)> {
        match self.inputs.get(i)? {
            Input::Effect(id) => Some((*id, self.default_input)),
            Input::Default => self.default_input.map(|id| (id, None)),
        }
    }

    fn resolve_or_warn(&self, i: usize) -> Option<(EffectId, Option<EffectId>)> {
        let r = self.resolve(i);
        if r.is_none() {
            log::warn!("Input {} has no default to fall back to.", i);
        }

        r
    }

    pub fn bounds(&self, i: usize, ts: &Transform) -> Bounds {
        match self.resolve_or_warn(i) {
            Some((id, default)) => self.graph.bounds(id, ts, default),
            None => Bounds::EMPTY,
        }
    }

    pub fn filter(
        &self,
        i: usize,
        fctx: &FilterContext,
        ts: &Transform,
        clip: Option<IntRect>,
    ) -> ImageData {
        match self.resolve_or_warn(i) {
            Some((id, default)) => self.graph.filter(id, fctx, ts, clip, default),
            None => ImageData::invalid(fctx, IntRect::EMPTY),
        }
    }

    pub fn transform(&self, i: usize, p: Point) -> Point {
        match self.resolve_or_warn(i) {
            Some((id, default)) => self.graph.transform(id, p, default),
            None => undefined_point(),
        }
    }

    pub fn untransform(&self, i: usize, p: Point) -> Point {
        match self.resolve_or_warn(i) {
            Some((id, default)) => self.graph.untransform(id, p, default),
            None => undefined_point(),
        }
    }

    pub fn dirty_regions(&self, i: usize, pool: &mut DirtyRegionPool) -> DirtyRegionContainer {
        match self.resolve_or_warn(i) {
            Some((id, default)) => self.graph.dirty_regions(id, default, pool),
            None => pool.check_out(),
        }
    }

    /// An unset input is considered not reducing, since its content is unknown.
    pub fn reduces_opaque_pixels(&self, i: usize) -> bool {
        match self.inputs.get(i) {
            Some(Input::Effect(id)) => self.graph.reduces_opaque_pixels(*id),
            _ => false,
        }
    }
}
