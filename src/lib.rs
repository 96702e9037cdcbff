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

//! # Conlog
//! Conlog is a solver for a little puzzle language of *satisfying maze
//! traversals*. A program is an undirected graph whose vertices carry small
//! arithmetic operations over named integer variables; one vertex is marked
//! initial, another terminal. Some variables start fixed at prescribed
//! values, the others are free. Solving the program means finding a walk
//! from the initial to the terminal vertex (traversing edges, never
//! immediately backtracking over the edge just used) together with starting
//! values for the free variables, such that applying the operations along
//! the walk leaves *every* variable at zero when the terminal is reached.
//!
//! The solver explores walks backwards: it starts at the terminal vertex
//! where every variable is known to be zero, undoes one operation per step,
//! and accepts as soon as it reaches the initial vertex with values that
//! match the fixed prescriptions. A static monotonicity analysis of the
//! operations supplies per-variable value intervals which prune entire
//! subtrees of that search, and every candidate is re-checked by the forward
//! evaluator before it is returned.
//!
//! ## Quick Example
//! The following program is the "diode" gadget: `y` starts at one and must
//! come back to zero, and the conditional increment on `z` only fires while
//! `y` is positive, which forces the direction the walk crosses the gadget.
//!
//! ```
//! use conlog::*;
//!
//! let mut builder = GraphBuilder::new();
//! let y = builder.fixed("y", 1)?;
//! let z = builder.fixed("z", 0)?;
//!
//! let initial  = builder.vertex("initial", Operation::Initial)?;
//! let dec1     = builder.vertex("dec1", Operation::Sub { lhs: y, rhs: Operand::Int(1) })?;
//! let diode    = builder.vertex("diode", Operation::CondInc { lhs: z, rhs: Operand::Var(y) })?;
//! let inc      = builder.vertex("inc", Operation::Add { lhs: y, rhs: Operand::Int(1) })?;
//! let dec2     = builder.vertex("dec2", Operation::Sub { lhs: y, rhs: Operand::Int(1) })?;
//! let terminal = builder.vertex("terminal", Operation::Terminal)?;
//!
//! builder.edge(initial, dec1)?;
//! builder.edge(dec1, diode)?;
//! builder.edge(diode, inc)?;
//! builder.edge(inc, dec2)?;
//! builder.edge(dec2, terminal)?;
//! let graph = builder.build()?;
//!
//! match solve(&graph, &SolverConfig::default()) {
//!     SolveResult::Satisfiable(solution) => {
//!         // the walk crosses the whole gadget, and no variable was free
//!         assert_eq!(6, solution.walk.len());
//!         for var in graph.free_variables() {
//!             println!("{} = {}", graph.variable_name(var), solution.assignment[var]);
//!         }
//!     }
//!     SolveResult::Unsatisfiable  => println!("unsatisfiable"),
//!     SolveResult::BudgetExceeded => println!("gave up"),
//!     SolveResult::Cancelled      => println!("cancelled"),
//! }
//! # Ok::<(), conlog::GraphError>(())
//! ```
//!
//! ## Getting a grasp on the codebase
//! The easiest way in is to follow the data: a [`GraphBuilder`] produces a
//! [`Graph`], [`analyze_monotonicity`] derives the pruning intervals from
//! it, a [`WalkGraph`] turns it into the set of legal walks, and a
//! [`Solver`] searches those walks backwards, double checking every witness
//! with [`evaluate`] before returning it as a [`Solution`].

mod bounds;
mod common;
mod cutoff;
mod evaluator;
mod graph;
mod monotonicity;
mod solver;

pub use bounds::*;
pub use common::*;
pub use cutoff::*;
pub use evaluator::*;
pub use graph::walks::*;
pub use graph::*;
pub use monotonicity::*;
pub use solver::*;
