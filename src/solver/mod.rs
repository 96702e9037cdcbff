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

//! This module provides the implementation of the search engine: a
//! breadth-first exploration of walk states that runs *backwards*, from the
//! terminal vertex towards the initial one, applying the inverse of each
//! vertex operation as it goes.
//!
//! Starting from the terminal with every variable at zero and undoing the
//! operations has a pleasant property: whatever values a reverse walk
//! reaches at some vertex are exactly the forward values a solution walk
//! would have at that same point. A reverse walk that arrives at the
//! initial vertex with values agreeing with the fixed variable
//! prescriptions therefore *is* a candidate solution, with the free
//! variables read straight off the state. Every candidate is nevertheless
//! re-checked by the forward evaluator before it is returned.
//!
//! The exploration is kept tractable by the monotonicity bounds: a state
//! whose values have left the interval derived for some variable can never
//! be completed into a solution, and none of its continuations is
//! generated.

use std::sync::Arc;

use derive_builder::Builder;
use log::{debug, trace, warn};

use crate::{
    analyze_monotonicity, evaluate, Assignment, Cutoff, Graph, Monotonicity, NoCutoff, Operation,
    Solution, SolveResult, StepId, VertexId, WalkGraph,
};

#[cfg(test)]
mod tests;

/// The default maximum number of states the engine may pop before giving up.
pub const DEFAULT_ITERATION_LIMIT: usize = 65_536;
/// The default maximum number of states the engine may keep in memory.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 24;

// ----------------------------------------------------------------------------
// --- CONFIG -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This is how you configure the behavior of the search engine, e.g. if you
/// want to grant it a larger iteration budget or turn the monotonicity
/// pruning off.
#[derive(Debug, Clone, Builder)]
pub struct SolverConfig {
    /// The maximum number of states the engine may pop from its queue before
    /// it reports `BudgetExceeded`.
    #[builder(default = "DEFAULT_ITERATION_LIMIT")]
    pub iteration_limit: usize,
    /// The maximum number of states the engine may ever allocate. Running
    /// out of room is reported exactly like running out of iterations.
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    pub queue_capacity: usize,
    /// Whether states violating the monotonicity bounds are pruned (the
    /// default). Turning this off never changes which graphs are declared
    /// satisfiable, only how much of the state space gets visited.
    #[builder(default = "true")]
    pub use_pruning: bool,
    /// Whether chains of no-op junctions are collapsed in the walk model,
    /// shortening the walks the search must enumerate. Off by default.
    #[builder(default = "false")]
    pub elide_noop_chains: bool,
}
impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            use_pruning: true,
            elide_noop_chains: false,
        }
    }
}

// ----------------------------------------------------------------------------
// --- SEARCH STATE -----------------------------------------------------------
// ----------------------------------------------------------------------------
/// One entry of the reverse frontier: the directed step the reverse walk
/// just traversed, the values at that point, and a back pointer to the state
/// it was expanded from.
///
/// All states live in a single arena owned by the solver; the back pointers
/// are arena indices, so the whole search forest is released at once when
/// the solver is dropped. Sibling states share their (immutable) values
/// vector.
struct SearchState {
    /// The step the reverse walk arrived by; its target is the vertex this
    /// state sits at.
    step: StepId,
    /// The value of every variable upon entering the vertex. These are
    /// forward-walk values: the inverse operations make the reverse
    /// traversal reconstruct them exactly.
    values: Arc<[i64]>,
    /// The arena index of the parent state; `None` for the seeds.
    parent: Option<usize>,
    /// The vertices skipped by no-op elision when transitioning into this
    /// state, in reverse walk order. Empty unless elision is enabled.
    via: Box<[VertexId]>,
}

// ----------------------------------------------------------------------------
// --- SOLVER -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This is the structure implementing the reverse breadth-first solver.
///
/// # Example
/// ```
/// # use conlog::*;
/// let mut builder = GraphBuilder::new();
/// let a = builder.fixed("a", 2)?;
/// let initial  = builder.vertex("initial", Operation::Initial)?;
/// let dec      = builder.vertex("dec", Operation::Sub { lhs: a, rhs: Operand::Int(2) })?;
/// let terminal = builder.vertex("terminal", Operation::Terminal)?;
/// builder.edge(initial, dec)?;
/// builder.edge(dec, terminal)?;
/// let graph = builder.build()?;
///
/// let mut solver = Solver::new(&graph, SolverConfig::default());
/// let result = solver.solve();
/// assert!(result.is_satisfiable());
/// # Ok::<(), conlog::GraphError>(())
/// ```
pub struct Solver<'a> {
    /// The puzzle being solved; shared immutably with the walk model and the
    /// evaluator.
    graph: &'a Graph,
    /// The directed-step view of the graph the states range over.
    walks: WalkGraph,
    /// The static facts used to prune hopeless states.
    monotonicity: Monotonicity,
    /// The knobs: iteration budget, queue capacity, pruning, elision.
    config: SolverConfig,
    /// The externally supplied cancellation criterion, polled once per
    /// popped state.
    cutoff: &'a dyn Cutoff,
    /// The arena holding every state ever created. Since the exploration is
    /// breadth first, the arena doubles as the FIFO queue: states are pushed
    /// at the back and `head` is the index of the next state to pop.
    arena: Vec<SearchState>,
    head: usize,
    /// The number of states popped so far.
    explored: usize,
}

static NO_CUTOFF: NoCutoff = NoCutoff;

impl<'a> Solver<'a> {
    /// Creates a solver for the given graph, without a cancellation
    /// criterion.
    pub fn new(graph: &'a Graph, config: SolverConfig) -> Self {
        Self::with_cutoff(graph, config, &NO_CUTOFF)
    }

    /// Creates a solver for the given graph which polls the given cutoff
    /// once per expanded state.
    pub fn with_cutoff(graph: &'a Graph, config: SolverConfig, cutoff: &'a dyn Cutoff) -> Self {
        let walks = if config.elide_noop_chains {
            WalkGraph::with_elision(graph)
        } else {
            WalkGraph::new(graph)
        };
        Solver {
            graph,
            walks,
            monotonicity: analyze_monotonicity(graph),
            config,
            cutoff,
            arena: vec![],
            head: 0,
            explored: 0,
        }
    }

    /// Runs the search to completion and reports its outcome. The call is
    /// CPU bound, blocking, and returns exactly once; re-solving requires a
    /// fresh solver.
    pub fn solve(&mut self) -> SolveResult {
        debug!(
            "solving: {} vertices, {} edges, {} variables, limit {}",
            self.graph.nb_vertices(),
            self.graph.nb_edges(),
            self.graph.nb_variables(),
            self.config.iteration_limit,
        );
        self.seed();
        if self.arena.len() > self.config.queue_capacity {
            return SolveResult::BudgetExceeded;
        }

        while self.head < self.arena.len() {
            if self.explored >= self.config.iteration_limit {
                debug!("iteration budget exhausted after {} states", self.explored);
                return SolveResult::BudgetExceeded;
            }
            if self.cutoff.must_stop() {
                debug!("cancellation requested after {} states", self.explored);
                return SolveResult::Cancelled;
            }

            let sid = self.head;
            self.head += 1;
            self.explored += 1;

            let step = self.walks.step(self.arena[sid].step);
            trace!(
                "pop {}: {} -> {}, values {:?}",
                sid,
                self.graph.vertex_name(step.from),
                self.graph.vertex_name(step.to),
                &self.arena[sid].values,
            );

            // A reverse walk reaching the initial vertex with values that
            // satisfy the boundary conditions is a candidate solution.
            if step.to == self.graph.initial() && self.boundary_holds(&self.arena[sid].values) {
                if let Some(solution) = self.emit(sid) {
                    debug!("witness found after {} states", self.explored);
                    return SolveResult::Satisfiable(solution);
                }
                warn!("candidate witness failed forward evaluation; resuming search");
            }
            // The terminal cannot be traversed mid-walk.
            if step.to == self.graph.terminal() {
                continue;
            }

            let values = self.undo(step.to, &self.arena[sid].values);
            if self.config.use_pruning && !self.monotonicity.within_bounds(&values) {
                continue;
            }
            let values: Arc<[i64]> = Arc::from(values);

            let transitions = self.walks.successors(self.arena[sid].step);
            for transition in transitions {
                if self.arena.len() >= self.config.queue_capacity {
                    debug!("queue capacity exhausted after {} states", self.explored);
                    return SolveResult::BudgetExceeded;
                }
                self.arena.push(SearchState {
                    step: transition.step,
                    values: Arc::clone(&values),
                    parent: Some(sid),
                    via: transition.elided.clone().into_boxed_slice(),
                });
            }
        }

        debug!("state space exhausted after {} states", self.explored);
        SolveResult::Unsatisfiable
    }

    /// The number of states popped so far.
    pub fn explored(&self) -> usize {
        self.explored
    }

    /// Posts one state per directed step out of the terminal vertex, with
    /// every variable at zero.
    fn seed(&mut self) {
        let zero: Arc<[i64]> = vec![0; self.graph.nb_variables()].into();
        for &step in self.walks.steps_from(self.graph.terminal()) {
            self.arena.push(SearchState {
                step,
                values: Arc::clone(&zero),
                parent: None,
                via: Box::default(),
            });
        }
    }

    fn boundary_holds(&self, values: &[i64]) -> bool {
        self.graph
            .fixed_variables()
            .all(|(var, value)| values[var.id()] == value)
    }

    /// Applies the inverse of the operation at the given vertex. The operand
    /// is resolved against the current values, which is consistent with
    /// forward evaluation: addition and subtraction are self-inverse on the
    /// integers, and the conditional updates leave their own guard variable
    /// untouched.
    fn undo(&self, vertex: VertexId, values: &[i64]) -> Vec<i64> {
        let mut values = values.to_vec();
        match *self.graph.op(vertex) {
            Operation::Add { lhs, rhs } => {
                let rhs = rhs.resolve(&values);
                values[lhs.id()] = values[lhs.id()].wrapping_sub(rhs);
            }
            Operation::Sub { lhs, rhs } => {
                let rhs = rhs.resolve(&values);
                values[lhs.id()] = values[lhs.id()].wrapping_add(rhs);
            }
            Operation::CondInc { lhs, rhs } => {
                if rhs.resolve(&values) > 0 {
                    values[lhs.id()] = values[lhs.id()].wrapping_sub(1);
                }
            }
            Operation::CondDec { lhs, rhs } => {
                if rhs.resolve(&values) > 0 {
                    values[lhs.id()] = values[lhs.id()].wrapping_add(1);
                }
            }
            Operation::Initial
            | Operation::Terminal
            | Operation::IntegerPrint(_)
            | Operation::UnicodePrint(_)
            | Operation::NoOp => {}
        }
        values
    }

    /// Rebuilds the forward walk of the accepted state and verifies it with
    /// the evaluator. Only a verified witness is emitted; `None` sends the
    /// engine back to its queue.
    fn emit(&self, accepted: usize) -> Option<Solution> {
        let assignment = Assignment::from_values(self.arena[accepted].values.to_vec());
        let walk = self.reconstruct(accepted);
        evaluate(self.graph, &walk, &assignment)
    }

    /// Chases the back pointers from the accepted state to its seed,
    /// splicing the vertices skipped by elision back in, and reverses the
    /// whole sequence into a forward walk from the initial vertex to the
    /// terminal.
    fn reconstruct(&self, accepted: usize) -> Vec<VertexId> {
        let mut chain = vec![];
        let mut current = Some(accepted);
        while let Some(sid) = current {
            chain.push(sid);
            current = self.arena[sid].parent;
        }

        let mut walk = vec![self.graph.terminal()];
        for &sid in chain.iter().rev() {
            let state = &self.arena[sid];
            walk.extend_from_slice(&state.via);
            walk.push(self.walks.step(state.step).to);
        }
        walk.reverse();
        walk
    }
}

/// Solves the given graph with the given configuration and no cancellation
/// criterion. This is the everyday entry point of the library.
pub fn solve(graph: &Graph, config: &SolverConfig) -> SolveResult {
    Solver::new(graph, config.clone()).solve()
}
