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

//! This module implements the static analysis which makes the search
//! tractable: from the operations alone (without exploring any walk) it
//! decides which variables can only ever grow and which can only ever
//! shrink, and derives from that a `[lo, hi]` interval every reachable value
//! of the variable must stay inside.
//!
//! The analysis works on an auxiliary directed graph over three symbols per
//! variable (`v`, `v+`, `v-`) plus two sink symbols standing for "something
//! increases" and "something decreases". Each operation vertex contributes a
//! handful of edges; a variable is monotone nondecreasing iff the decreasing
//! sink is unreachable from its plain symbol, and monotone nonincreasing iff
//! the increasing sink is unreachable. Reachability is transitive, so one
//! depth-first traversal per variable computes the fixpoint: no iterative
//! relaxation is needed even though a variable's monotonicity may hinge on
//! that of the variables used as its right hand sides.

use fxhash::FxHashSet;

use crate::{Graph, Operand, Operation, Variable, VertexId};

/// The monotonicity facts derived for a graph, along with the per-variable
/// value intervals they imply. A variable may belong to both sets at once:
/// such a variable is constant along every walk.
#[derive(Debug, Clone)]
pub struct Monotonicity {
    nondecreasing: FxHashSet<Variable>,
    nonincreasing: FxHashSet<Variable>,
    bounds: Vec<(i64, i64)>,
}

impl Monotonicity {
    /// True iff the values of the given variable never decrease along any
    /// walk.
    pub fn is_nondecreasing(&self, var: Variable) -> bool {
        self.nondecreasing.contains(&var)
    }
    /// True iff the values of the given variable never increase along any
    /// walk.
    pub fn is_nonincreasing(&self, var: Variable) -> bool {
        self.nonincreasing.contains(&var)
    }
    /// The set of monotone nondecreasing variables.
    pub fn nondecreasing(&self) -> &FxHashSet<Variable> {
        &self.nondecreasing
    }
    /// The set of monotone nonincreasing variables.
    pub fn nonincreasing(&self) -> &FxHashSet<Variable> {
        &self.nonincreasing
    }
    /// The interval every reachable value of the given variable must stay
    /// inside. Unbounded sides are the i64 extremes.
    pub fn bounds(&self, var: Variable) -> (i64, i64) {
        self.bounds[var.id()]
    }
    /// True iff every value of the given vector lies within the interval of
    /// its variable. This is the pruning predicate of the search engine: a
    /// state whose values violate it admits no continuation worth exploring.
    pub fn within_bounds(&self, values: &[i64]) -> bool {
        values
            .iter()
            .zip(self.bounds.iter())
            .all(|(&x, &(lo, hi))| lo <= x && x <= hi)
    }
}

// Symbol ids of the auxiliary graph: for a graph of n variables, symbol k is
// the plain symbol of variable k, n + k its increasing use, 2n + k its
// decreasing use; 3n and 3n + 1 are the increasing and decreasing sinks.
struct SymbolGraph {
    nb_vars: usize,
    edges: Vec<Vec<usize>>,
}

impl SymbolGraph {
    fn new(nb_vars: usize) -> Self {
        SymbolGraph {
            nb_vars,
            edges: vec![vec![]; 3 * nb_vars + 2],
        }
    }
    fn plain(&self, var: Variable) -> usize {
        var.id()
    }
    fn pos(&self, var: Variable) -> usize {
        self.nb_vars + var.id()
    }
    fn neg(&self, var: Variable) -> usize {
        2 * self.nb_vars + var.id()
    }
    fn pos_sink(&self) -> usize {
        3 * self.nb_vars
    }
    fn neg_sink(&self) -> usize {
        3 * self.nb_vars + 1
    }

    /// Records that some operation increases `var` by a (conditionally)
    /// positive amount.
    fn increases(&mut self, var: Variable) {
        let (p, ps, ns) = (self.plain(var), self.pos_sink(), self.neg_sink());
        let (pos, neg) = (self.pos(var), self.neg(var));
        self.edges[p].push(ps);
        self.edges[pos].push(ns);
        self.edges[neg].push(ps);
    }
    /// Records that some operation decreases `var` by a (conditionally)
    /// positive amount.
    fn decreases(&mut self, var: Variable) {
        let (p, ps, ns) = (self.plain(var), self.pos_sink(), self.neg_sink());
        let (pos, neg) = (self.pos(var), self.neg(var));
        self.edges[p].push(ns);
        self.edges[pos].push(ps);
        self.edges[neg].push(ns);
    }
    /// Records that `lhs` changes by the value of `rhs` (added).
    fn adds(&mut self, lhs: Variable, rhs: Variable) {
        let edge = (self.plain(lhs), self.pos(rhs));
        self.edges[edge.0].push(edge.1);
    }
    /// Records that `lhs` changes by the value of `rhs` (subtracted).
    fn subtracts(&mut self, lhs: Variable, rhs: Variable) {
        let edge = (self.plain(lhs), self.neg(rhs));
        self.edges[edge.0].push(edge.1);
    }

    /// Depth first reachability from the plain symbol of the variable;
    /// returns which of the two sinks can be reached.
    fn reachable_sinks(&self, var: Variable) -> (bool, bool) {
        let mut visited = vec![false; self.edges.len()];
        let mut stack = vec![self.plain(var)];
        let (mut reaches_pos, mut reaches_neg) = (false, false);
        while let Some(symbol) = stack.pop() {
            if visited[symbol] {
                continue;
            }
            visited[symbol] = true;
            if symbol == self.pos_sink() {
                reaches_pos = true;
            } else if symbol == self.neg_sink() {
                reaches_neg = true;
            } else {
                stack.extend(self.edges[symbol].iter().copied());
            }
        }
        (reaches_pos, reaches_neg)
    }
}

/// Runs the monotonicity analysis on the given graph. The result also
/// carries the derived value intervals, which combine the monotonicity facts
/// with the free/fixed status of each variable:
/// * a nondecreasing variable must end at zero and can only grow, so its
///   values never exceed zero; when it is also fixed at `c`, they never drop
///   below `c`;
/// * symmetrically, a nonincreasing variable never drops below zero, and
///   never exceeds its fixed starting value when it has one.
pub fn analyze_monotonicity(graph: &Graph) -> Monotonicity {
    let mut symbols = SymbolGraph::new(graph.nb_variables());

    for vertex in 0..graph.nb_vertices() {
        match *graph.op(VertexId(vertex)) {
            Operation::Add { lhs, rhs } => match rhs {
                Operand::Int(k) if k > 0 => symbols.increases(lhs),
                Operand::Int(k) if k < 0 => symbols.decreases(lhs),
                Operand::Int(_) => {}
                Operand::Var(rhs) => symbols.adds(lhs, rhs),
            },
            Operation::Sub { lhs, rhs } => match rhs {
                Operand::Int(k) if k > 0 => symbols.decreases(lhs),
                Operand::Int(k) if k < 0 => symbols.increases(lhs),
                Operand::Int(_) => {}
                Operand::Var(rhs) => symbols.subtracts(lhs, rhs),
            },
            Operation::CondInc { lhs, rhs } => match rhs {
                Operand::Int(k) if k <= 0 => {}
                _ => symbols.increases(lhs),
            },
            Operation::CondDec { lhs, rhs } => match rhs {
                Operand::Int(k) if k <= 0 => {}
                _ => symbols.decreases(lhs),
            },
            Operation::Initial
            | Operation::Terminal
            | Operation::IntegerPrint(_)
            | Operation::UnicodePrint(_)
            | Operation::NoOp => {}
        }
    }

    let mut nondecreasing = FxHashSet::default();
    let mut nonincreasing = FxHashSet::default();
    for var in graph.variables() {
        let (reaches_pos, reaches_neg) = symbols.reachable_sinks(var);
        if !reaches_neg {
            let _ = nondecreasing.insert(var);
        }
        if !reaches_pos {
            let _ = nonincreasing.insert(var);
        }
    }

    let bounds = graph
        .variables()
        .map(|var| {
            let (mut lo, mut hi) = (i64::MIN, i64::MAX);
            if nondecreasing.contains(&var) {
                hi = hi.min(0);
                if let Some(c) = graph.fixed_value(var) {
                    lo = lo.max(c);
                }
            }
            if nonincreasing.contains(&var) {
                lo = lo.max(0);
                if let Some(c) = graph.fixed_value(var) {
                    hi = hi.min(c);
                }
            }
            (lo, hi)
        })
        .collect();

    Monotonicity {
        nondecreasing,
        nonincreasing,
        bounds,
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
