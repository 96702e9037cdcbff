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

//! This module defines the most basic data types that are used throughout all
//! the code of our library: variables, vertex operations, assignments and the
//! solution/result types returned by the solver.

use std::fmt;
use std::ops::{Index, IndexMut};

// ----------------------------------------------------------------------------
// --- VARIABLE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes a variable from the puzzle program at hand. Each variable
/// is identified with an integer ranging from 0 until `graph.nb_variables()`.
/// The mapping between a variable and its textual name is established once,
/// when the graph is built.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable(pub usize);
impl Variable {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    ///
    /// # Examples:
    /// ```
    /// # use conlog::Variable;
    /// assert_eq!(0, Variable(0).id());
    /// assert_eq!(1, Variable(1).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- VERTEX -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes a vertex of the puzzle graph. Just like variables, the
/// vertices are identified with a dense integer id so that all hot-path
/// structures can be plain vectors rather than string-keyed maps.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VertexId(pub usize);
impl VertexId {
    #[inline]
    /// This function returns the id (numeric value) of the vertex.
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- OPERAND ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The right hand side of an arithmetic operation: either a variable (whose
/// value is looked up at evaluation time) or an integer literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operand {
    /// The operand is a variable, resolved against the current values.
    Var(Variable),
    /// The operand is a plain integer constant.
    Int(i64),
}
impl Operand {
    /// Resolves this operand against the given values (one slot per variable).
    #[inline]
    pub fn resolve(self, values: &[i64]) -> i64 {
        match self {
            Operand::Var(v) => values[v.id()],
            Operand::Int(k) => k,
        }
    }
}

// ----------------------------------------------------------------------------
// --- OPERATION --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The operation carried by a vertex of the graph. Walking onto a vertex
/// applies its operation to the current values. All arithmetic is wrapping
/// two's complement on 64 bit signed integers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    /// The marker of the start vertex. It contributes nothing to the values:
    /// the free/fixed status of each variable is a property of the graph.
    /// Walks may legally pass through the initial vertex again; doing so is
    /// an identity.
    Initial,
    /// The marker of the end vertex. A solution walk stops here with every
    /// variable equal to zero.
    Terminal,
    /// `lhs <- lhs + rhs`
    Add { lhs: Variable, rhs: Operand },
    /// `lhs <- lhs - rhs`
    Sub { lhs: Variable, rhs: Operand },
    /// `if rhs > 0 { lhs <- lhs + 1 }`
    CondInc { lhs: Variable, rhs: Operand },
    /// `if rhs > 0 { lhs <- lhs - 1 }`
    CondDec { lhs: Variable, rhs: Operand },
    /// Appends the integer value of the operand to the output stream.
    IntegerPrint(Operand),
    /// Appends the character whose codepoint is the value of the operand to
    /// the output stream. A value which is not a valid unicode scalar prints
    /// U+FFFD instead.
    UnicodePrint(Operand),
    /// The identity operation; a plain junction in the maze.
    NoOp,
}
impl Operation {
    /// True iff this operation is the `Initial` marker.
    #[inline]
    pub fn is_initial(&self) -> bool {
        matches!(self, Operation::Initial)
    }
    /// True iff this operation is the `Terminal` marker.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Operation::Terminal)
    }
    /// True iff this operation is the identity.
    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, Operation::NoOp)
    }
}

// ----------------------------------------------------------------------------
// --- ASSIGNMENT -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An assignment maps every variable of a graph to an integer. It is the
/// value vector at the start of a walk. The representation is a fixed-length
/// array indexed by the dense variable ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: Box<[i64]>,
}
impl Assignment {
    /// Creates an assignment binding each of the `nb_variables` variables
    /// to zero.
    pub fn zeroed(nb_variables: usize) -> Self {
        Assignment {
            values: vec![0; nb_variables].into_boxed_slice(),
        }
    }
    /// Creates an assignment from one value per variable, in variable id
    /// order.
    pub fn from_values(values: Vec<i64>) -> Self {
        Assignment {
            values: values.into_boxed_slice(),
        }
    }
    /// The value bound to the given variable.
    #[inline]
    pub fn get(&self, var: Variable) -> i64 {
        self.values[var.id()]
    }
    /// Binds the given variable to a new value.
    #[inline]
    pub fn set(&mut self, var: Variable, value: i64) {
        self.values[var.id()] = value;
    }
    /// The number of variables this assignment binds.
    pub fn len(&self) -> usize {
        self.values.len()
    }
    /// True iff the assignment binds no variable at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// The raw values, in variable id order.
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }
}
impl Index<Variable> for Assignment {
    type Output = i64;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.values[index.id()]
    }
}
impl IndexMut<Variable> for Assignment {
    fn index_mut(&mut self, index: Variable) -> &mut Self::Output {
        &mut self.values[index.id()]
    }
}

// ----------------------------------------------------------------------------
// --- OUTPUT -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One item of the output stream produced while evaluating a walk.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OutputItem {
    /// Produced by an `IntegerPrint` vertex.
    Int(i64),
    /// Produced by a `UnicodePrint` vertex.
    Char(char),
}
impl fmt::Display for OutputItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputItem::Int(x) => write!(f, "{x}"),
            OutputItem::Char(c) => write!(f, "{c}"),
        }
    }
}

// ----------------------------------------------------------------------------
// --- SOLUTION ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A witness that a puzzle graph is satisfiable: a legal walk from the
/// initial to the terminal vertex together with the initial assignment which
/// zeroes every variable at the end of that walk, and the output the walk
/// produced along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The vertices of the walk, in order, from the initial vertex to the
    /// terminal vertex.
    pub walk: Vec<VertexId>,
    /// The values of all variables at the start of the walk.
    pub assignment: Assignment,
    /// The output stream accumulated by the print vertices along the walk.
    pub output: Vec<OutputItem>,
}

// ----------------------------------------------------------------------------
// --- RESULTS ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The outcome of a solve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// The graph admits at least one solution; this is the first witness the
    /// search encountered.
    Satisfiable(Solution),
    /// The whole space of walk states was exhausted without a witness.
    Unsatisfiable,
    /// The iteration budget (or the queue capacity) ran out before the
    /// search could conclude either way.
    BudgetExceeded,
    /// The caller requested cancellation through the cutoff.
    Cancelled,
}
impl SolveResult {
    /// True iff a witness was found.
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveResult::Satisfiable(_))
    }
    /// Borrows the witness, if one was found.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveResult::Satisfiable(solution) => Some(solution),
            _ => None,
        }
    }
    /// Consumes the result and takes the witness out of it, if one was found.
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveResult::Satisfiable(solution) => Some(solution),
            _ => None,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_common {
    use super::*;

    #[test]
    fn test_var_id() {
        assert_eq!(0, Variable(0).id());
        assert_eq!(1, Variable(1).id());
        assert_eq!(42, VertexId(42).id());
    }

    #[test]
    fn operand_resolution_reads_literals_and_variables() {
        let values = [7, -3];
        assert_eq!(5, Operand::Int(5).resolve(&values));
        assert_eq!(7, Operand::Var(Variable(0)).resolve(&values));
        assert_eq!(-3, Operand::Var(Variable(1)).resolve(&values));
    }

    #[test]
    fn a_zeroed_assignment_binds_every_variable_to_zero() {
        let assignment = Assignment::zeroed(3);
        assert_eq!(3, assignment.len());
        assert!(assignment.as_slice().iter().all(|&x| x == 0));
    }

    #[test]
    fn assignments_can_be_indexed_by_variable() {
        let mut assignment = Assignment::from_values(vec![1, 2, 3]);
        assert_eq!(2, assignment[Variable(1)]);
        assignment[Variable(1)] = 9;
        assert_eq!(9, assignment.get(Variable(1)));
    }

    #[test]
    fn output_items_display_like_their_payload() {
        assert_eq!("42", OutputItem::Int(42).to_string());
        assert_eq!("*", OutputItem::Char('*').to_string());
    }

    #[test]
    fn only_the_satisfiable_result_carries_a_solution() {
        assert!(SolveResult::Unsatisfiable.solution().is_none());
        assert!(SolveResult::BudgetExceeded.solution().is_none());
        assert!(SolveResult::Cancelled.solution().is_none());
        assert!(!SolveResult::Unsatisfiable.is_satisfiable());
    }
}
