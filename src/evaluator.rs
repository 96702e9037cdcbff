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

//! This module defines the forward evaluator: the source of truth for what a
//! walk does. The reverse search may only ever return a witness that this
//! evaluator accepts.

use crate::{Assignment, Domain, Graph, Operand, Operation, OutputItem, Solution, VertexId};

/// Runs the walk forward from the given assignment and decides whether it is
/// a solution.
///
/// The function is total: rather than failing, it returns `None` for every
/// walk/assignment pair that is not a witness. That covers walks which
/// * do not start at the initial vertex or do not end at the terminal one,
/// * pass through the terminal vertex before their last position,
/// * use a pair of consecutive vertices that is not an edge of the graph,
/// * immediately backtrack over the edge they just traversed,
/// as well as assignments which disagree with the fixed variable
/// prescriptions, and evaluations which reach the terminal with a non-zero
/// variable. This totality is precisely what lets the search engine use the
/// evaluator as a witness verifier and resume searching on rejection.
///
/// All arithmetic wraps on 64 bit signed integers.
pub fn evaluate(graph: &Graph, walk: &[VertexId], assignment: &Assignment) -> Option<Solution> {
    if assignment.len() != graph.nb_variables() {
        return None;
    }
    if walk.first() != Some(&graph.initial()) || walk.last() != Some(&graph.terminal()) {
        return None;
    }
    // The walk must agree with the boundary conditions
    for (var, value) in graph.fixed_variables() {
        if assignment.get(var) != value {
            return None;
        }
    }

    let mut values = assignment.as_slice().to_vec();
    let mut output = vec![];

    for (i, &vertex) in walk.iter().enumerate().skip(1) {
        if !graph.has_edge(walk[i - 1], vertex) {
            return None;
        }
        if i >= 2 && walk[i - 2] == vertex {
            return None;
        }
        match *graph.op(vertex) {
            Operation::Initial | Operation::NoOp => {}
            Operation::Terminal => {
                if i != walk.len() - 1 {
                    return None;
                }
            }
            Operation::Add { lhs, rhs } => {
                let rhs = rhs.resolve(&values);
                values[lhs.id()] = values[lhs.id()].wrapping_add(rhs);
            }
            Operation::Sub { lhs, rhs } => {
                let rhs = rhs.resolve(&values);
                values[lhs.id()] = values[lhs.id()].wrapping_sub(rhs);
            }
            Operation::CondInc { lhs, rhs } => {
                if rhs.resolve(&values) > 0 {
                    values[lhs.id()] = values[lhs.id()].wrapping_add(1);
                }
            }
            Operation::CondDec { lhs, rhs } => {
                if rhs.resolve(&values) > 0 {
                    values[lhs.id()] = values[lhs.id()].wrapping_sub(1);
                }
            }
            Operation::IntegerPrint(arg) => {
                output.push(OutputItem::Int(arg.resolve(&values)));
            }
            Operation::UnicodePrint(arg) => {
                output.push(OutputItem::Char(codepoint(arg.resolve(&values))));
            }
        }
    }

    if values.iter().any(|&x| x != 0) {
        return None;
    }
    Some(Solution {
        walk: walk.to_vec(),
        assignment: assignment.clone(),
        output,
    })
}

/// Runs the same forward sweep as [`evaluate`] over an arbitrary value
/// domain, and returns the values reached at the end of the walk. Unlike
/// [`evaluate`] this performs no legality checking, does not require the
/// walk to reach the terminal vertex (it stops there when it does), and
/// skips the print operations. The first vertex of the walk contributes
/// nothing.
pub fn partial_evaluate<D: Domain>(graph: &Graph, walk: &[VertexId], initial: &[D]) -> Vec<D> {
    let mut values = initial.to_vec();

    for &vertex in walk.iter().skip(1) {
        let resolve = |values: &[D], operand: Operand| match operand {
            Operand::Var(v) => values[v.id()],
            Operand::Int(k) => D::exact(k),
        };
        match *graph.op(vertex) {
            Operation::Terminal => break,
            Operation::Add { lhs, rhs } => {
                let rhs = resolve(&values, rhs);
                values[lhs.id()] = values[lhs.id()] + rhs;
            }
            Operation::Sub { lhs, rhs } => {
                let rhs = resolve(&values, rhs);
                values[lhs.id()] = values[lhs.id()] - rhs;
            }
            Operation::CondInc { lhs, rhs } => {
                values[lhs.id()] = match resolve(&values, rhs).positive() {
                    Some(true) => values[lhs.id()] + D::exact(1),
                    Some(false) => values[lhs.id()],
                    None => values[lhs.id()].maybe_inc(),
                };
            }
            Operation::CondDec { lhs, rhs } => {
                values[lhs.id()] = match resolve(&values, rhs).positive() {
                    Some(true) => values[lhs.id()] - D::exact(1),
                    Some(false) => values[lhs.id()],
                    None => values[lhs.id()].maybe_dec(),
                };
            }
            Operation::Initial
            | Operation::NoOp
            | Operation::IntegerPrint(_)
            | Operation::UnicodePrint(_) => {}
        }
    }
    values
}

/// A helper used by the replay of prefixes in tests and by the demos: the
/// forward value of every variable after each position of the walk.
pub fn value_trace(graph: &Graph, walk: &[VertexId], assignment: &Assignment) -> Vec<Vec<i64>> {
    use std::num::Wrapping;
    let start = assignment
        .as_slice()
        .iter()
        .map(|&x| Wrapping(x))
        .collect::<Vec<_>>();

    (0..walk.len())
        .map(|i| {
            partial_evaluate(graph, &walk[..=i], &start)
                .iter()
                .map(|w| w.0)
                .collect()
        })
        .collect()
}

fn codepoint(value: i64) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
