// Copyright 2024 the conlog developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module turns the undirected puzzle graph into the set of legal walks.
//! The trick is to work with *directed steps* (one per direction of each
//! undirected edge) rather than with vertices: from the step `u -> v`, the
//! legal continuations are the steps `v -> w` with `w != u`, which makes the
//! no-u-turn rule a purely local constraint.
//!
//! The module also implements the optional no-op chain elision: a step whose
//! two endpoints both carry the identity operation forwards to its own
//! successors, which shortens the walks the search must enumerate. The
//! vertex skipped by such a shortcut is remembered on the transition so a
//! full walk can always be reconstructed.

use fxhash::FxHashMap;

use crate::{Graph, VertexId};

// ----------------------------------------------------------------------------
// --- STEP -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes one directed step of a walk: the traversal of a single
/// undirected edge in a definite direction. Steps are identified with a
/// dense integer id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StepId(pub usize);
impl StepId {
    #[inline]
    /// This function returns the id (numeric value) of the step.
    pub fn id(self) -> usize {
        self.0
    }
}

/// The endpoints of a directed step: the walk leaves `from` and arrives at
/// `to`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Step {
    pub from: VertexId,
    pub to: VertexId,
}

/// One legal continuation of a step. When the transition results from the
/// elision of a no-op chain, `elided` lists the skipped vertices in walk
/// order; it is empty for plain transitions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub step: StepId,
    pub elided: Vec<VertexId>,
}

// ----------------------------------------------------------------------------
// --- WALK GRAPH -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The precomputed directed-step view of a graph. Step ids, the steps out of
/// each vertex, and the successors of each step are all enumerated in edge
/// insertion order, so that every traversal of the same graph visits them in
/// the same order.
#[derive(Debug, Clone)]
pub struct WalkGraph {
    steps: Vec<Step>,
    /// Per step, the u-turn-free continuations.
    successors: Vec<Vec<Transition>>,
    /// Per vertex, the steps leaving it.
    outgoing: Vec<Vec<StepId>>,
}

impl WalkGraph {
    /// Builds the directed-step view of the given graph, without elision.
    pub fn new(graph: &Graph) -> Self {
        Self::build(graph, false)
    }

    /// Builds the directed-step view of the given graph and applies one pass
    /// of no-op chain elision to its transitions.
    pub fn with_elision(graph: &Graph) -> Self {
        Self::build(graph, true)
    }

    fn build(graph: &Graph, elide: bool) -> Self {
        let mut steps = vec![];
        let mut outgoing = vec![vec![]; graph.nb_vertices()];
        let mut index: FxHashMap<(usize, usize), StepId> = FxHashMap::default();

        for (u, v) in graph.edges() {
            for (from, to) in [(u, v), (v, u)] {
                let id = StepId(steps.len());
                steps.push(Step { from, to });
                outgoing[from.id()].push(id);
                let _ = index.insert((from.id(), to.id()), id);
            }
        }

        let successors = steps
            .iter()
            .map(|step| {
                graph
                    .neighbors(step.to)
                    .iter()
                    .filter(|&&w| w != step.from)
                    .map(|&w| Transition {
                        step: index[&(step.to.id(), w.id())],
                        elided: vec![],
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut walks = WalkGraph {
            steps,
            successors,
            outgoing,
        };
        if elide {
            walks.elide_noop_chains(graph);
        }
        walks
    }

    /// Rewrites the transition lists so that any continuation onto a step
    /// whose both endpoints are no-op vertices forwards to the continuations
    /// of that step instead, remembering the vertex it skipped.
    fn elide_noop_chains(&mut self, graph: &Graph) {
        let elidable = |step: &Step| {
            graph.op(step.from).is_noop() && graph.op(step.to).is_noop()
        };
        let base = self.successors.clone();
        for transitions in self.successors.iter_mut() {
            let mut rewritten = vec![];
            for transition in transitions.drain(..) {
                let step = self.steps[transition.step.id()];
                if elidable(&step) {
                    for next in base[transition.step.id()].iter() {
                        rewritten.push(Transition {
                            step: next.step,
                            elided: vec![step.to],
                        });
                    }
                } else {
                    rewritten.push(transition);
                }
            }
            *transitions = rewritten;
        }
    }

    /// The number of directed steps (twice the number of undirected edges).
    pub fn nb_steps(&self) -> usize {
        self.steps.len()
    }
    /// The endpoints of the given step.
    pub fn step(&self, id: StepId) -> Step {
        self.steps[id.id()]
    }
    /// The legal continuations of the given step.
    pub fn successors(&self, id: StepId) -> &[Transition] {
        &self.successors[id.id()]
    }
    /// The steps leaving the given vertex, in edge insertion order.
    pub fn steps_from(&self, vertex: VertexId) -> &[StepId] {
        &self.outgoing[vertex.id()]
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_walks {
    use crate::*;

    /// initial -- a -- terminal, plus a branch a -- b -- initial.
    fn diamond() -> Graph {
        let mut builder = GraphBuilder::new();
        let initial = builder.vertex("initial", Operation::Initial).unwrap();
        let a = builder.vertex("a", Operation::NoOp).unwrap();
        let b = builder.vertex("b", Operation::NoOp).unwrap();
        let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
        builder.edge(initial, a).unwrap();
        builder.edge(a, terminal).unwrap();
        builder.edge(a, b).unwrap();
        builder.edge(b, initial).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn there_are_two_steps_per_edge() {
        let graph = diamond();
        let walks = WalkGraph::new(&graph);
        assert_eq!(2 * graph.nb_edges(), walks.nb_steps());
    }

    #[test]
    fn successors_never_make_a_u_turn() {
        let graph = diamond();
        let walks = WalkGraph::new(&graph);
        for id in 0..walks.nb_steps() {
            let step = walks.step(StepId(id));
            for transition in walks.successors(StepId(id)) {
                let next = walks.step(transition.step);
                assert_eq!(step.to, next.from);
                assert_ne!(step.from, next.to);
            }
        }
    }

    #[test]
    fn steps_from_a_vertex_leave_that_vertex() {
        let graph = diamond();
        let walks = WalkGraph::new(&graph);
        let terminal = graph.terminal();
        let seeds = walks.steps_from(terminal);
        assert_eq!(1, seeds.len());
        assert_eq!(terminal, walks.step(seeds[0]).from);
    }

    #[test]
    fn a_dead_end_step_has_no_successor() {
        let mut builder = GraphBuilder::new();
        let initial = builder.vertex("initial", Operation::Initial).unwrap();
        let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
        builder.edge(initial, terminal).unwrap();
        let graph = builder.build().unwrap();
        let walks = WalkGraph::new(&graph);

        for id in 0..walks.nb_steps() {
            assert!(walks.successors(StepId(id)).is_empty());
        }
    }

    #[test]
    fn elision_skips_noop_noop_steps_and_remembers_the_skipped_vertex() {
        // initial -- a -- b -- terminal where a and b are junctions
        let mut builder = GraphBuilder::new();
        let initial = builder.vertex("initial", Operation::Initial).unwrap();
        let a = builder.vertex("a", Operation::NoOp).unwrap();
        let b = builder.vertex("b", Operation::NoOp).unwrap();
        let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
        builder.edge(initial, a).unwrap();
        builder.edge(a, b).unwrap();
        builder.edge(b, terminal).unwrap();
        let graph = builder.build().unwrap();
        let walks = WalkGraph::with_elision(&graph);

        // from the step terminal -> b, the continuation b -> a is a
        // noop-noop step: it is elided and forwards straight to a -> initial
        let seed = walks.steps_from(terminal)[0];
        let successors = walks.successors(seed);
        assert_eq!(1, successors.len());
        let next = walks.step(successors[0].step);
        assert_eq!(a, next.from);
        assert_eq!(initial, next.to);
        assert_eq!(vec![a], successors[0].elided);
    }

    #[test]
    fn elision_leaves_operation_bearing_chains_alone() {
        let mut builder = GraphBuilder::new();
        let x = builder.free("x").unwrap();
        let initial = builder.vertex("initial", Operation::Initial).unwrap();
        let add = builder
            .vertex(
                "add",
                Operation::Add {
                    lhs: x,
                    rhs: Operand::Int(1),
                },
            )
            .unwrap();
        let n = builder.vertex("n", Operation::NoOp).unwrap();
        let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
        builder.edge(initial, add).unwrap();
        builder.edge(add, n).unwrap();
        builder.edge(n, terminal).unwrap();
        let graph = builder.build().unwrap();

        let plain = WalkGraph::new(&graph);
        let elided = WalkGraph::with_elision(&graph);
        for id in 0..plain.nb_steps() {
            assert_eq!(plain.successors(StepId(id)), elided.successors(StepId(id)));
        }
    }
}
