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

//! This module defines the graph intermediate representation a puzzle program
//! is compiled to before it can be solved: an undirected simple graph of
//! operation-bearing vertices with one initial and one terminal vertex.
//!
//! Graphs are created through a [`GraphBuilder`] which interns every variable
//! and vertex name into a dense integer id. Name resolution thus happens
//! exactly once, at ingest; everything past this point works with plain
//! vector lookups.

pub mod walks;

use fxhash::{FxHashMap, FxHashSet};

use crate::{Operand, Operation, Variable, VertexId};

/// The ways in which a would-be graph can violate the structural invariants
/// of the representation. These are programmer errors on the side of the
/// front end: they are reported eagerly, before any solving takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A variable was declared with an empty name.
    #[error("variable names may not be empty")]
    EmptyVariableName,
    /// The same variable name was declared twice.
    #[error("duplicate variable `{0}`")]
    DuplicateVariable(String),
    /// A vertex was declared with an empty name.
    #[error("vertex names may not be empty")]
    EmptyVertexName,
    /// The same vertex name was declared twice.
    #[error("duplicate vertex `{0}`")]
    DuplicateVertex(String),
    /// An operation refers to a variable id that was not produced by this
    /// builder.
    #[error("vertex `{0}` refers to an undeclared variable")]
    UnknownVariable(String),
    /// An edge endpoint is not a vertex id produced by this builder.
    #[error("edge endpoint is not a known vertex")]
    UnknownVertex,
    /// An operation uses its own target variable as operand. The reverse
    /// semantics of such operations are not well defined, hence they are
    /// rejected at ingest.
    #[error("vertex `{0}` mutates a variable with itself")]
    SelfMutation(String),
    /// An edge connects a vertex to itself.
    #[error("vertex `{0}` may not be linked to itself")]
    SelfLoop(String),
    /// The same undirected edge was added twice.
    #[error("duplicate edge between `{0}` and `{1}`")]
    DuplicateEdge(String, String),
    /// No vertex carries the `Initial` marker.
    #[error("the graph has no initial vertex")]
    MissingInitial,
    /// More than one vertex carries the `Initial` marker.
    #[error("the graph has more than one initial vertex")]
    MultipleInitial,
    /// No vertex carries the `Terminal` marker.
    #[error("the graph has no terminal vertex")]
    MissingTerminal,
    /// More than one vertex carries the `Terminal` marker.
    #[error("the graph has more than one terminal vertex")]
    MultipleTerminal,
}

#[derive(Debug, Clone, PartialEq)]
struct VariableInfo {
    name: String,
    /// `Some(c)` when the variable starts every walk fixed at `c`; `None`
    /// when its starting value is free (to be solved for).
    fixed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
struct VertexInfo {
    name: String,
    op: Operation,
}

// ----------------------------------------------------------------------------
// --- GRAPH BUILDER ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// This is how you create a [`Graph`]: declare the variables (free or fixed),
/// then the vertices with their operations, then the undirected edges, and
/// finally call [`GraphBuilder::build`] which validates the structural
/// invariants.
///
/// # Example
/// ```
/// # use conlog::*;
/// let mut builder = GraphBuilder::new();
/// let a = builder.fixed("a", 3)?;
/// let initial  = builder.vertex("initial", Operation::Initial)?;
/// let dec      = builder.vertex("dec", Operation::Sub { lhs: a, rhs: Operand::Int(3) })?;
/// let terminal = builder.vertex("terminal", Operation::Terminal)?;
/// builder.edge(initial, dec)?;
/// builder.edge(dec, terminal)?;
/// let graph = builder.build()?;
/// assert_eq!(1, graph.nb_variables());
/// # Ok::<(), conlog::GraphError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    variables: Vec<VariableInfo>,
    var_index: FxHashMap<String, Variable>,
    vertices: Vec<VertexInfo>,
    vertex_index: FxHashMap<String, VertexId>,
    edges: Vec<(VertexId, VertexId)>,
    edge_set: FxHashSet<(usize, usize)>,
}

impl GraphBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a free variable: one whose starting value is unknown and
    /// must be discovered by the solver.
    pub fn free(&mut self, name: &str) -> Result<Variable, GraphError> {
        self.declare(name, None)
    }

    /// Declares a fixed variable: one whose starting value is prescribed.
    pub fn fixed(&mut self, name: &str, value: i64) -> Result<Variable, GraphError> {
        self.declare(name, Some(value))
    }

    fn declare(&mut self, name: &str, fixed: Option<i64>) -> Result<Variable, GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyVariableName);
        }
        if self.var_index.contains_key(name) {
            return Err(GraphError::DuplicateVariable(name.to_string()));
        }
        let var = Variable(self.variables.len());
        self.variables.push(VariableInfo {
            name: name.to_string(),
            fixed,
        });
        let _ = self.var_index.insert(name.to_string(), var);
        Ok(var)
    }

    /// Declares a vertex carrying the given operation. Every variable the
    /// operation mentions must have been declared on this builder first.
    pub fn vertex(&mut self, name: &str, op: Operation) -> Result<VertexId, GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyVertexName);
        }
        if self.vertex_index.contains_key(name) {
            return Err(GraphError::DuplicateVertex(name.to_string()));
        }
        self.check_operands(name, &op)?;

        let id = VertexId(self.vertices.len());
        self.vertices.push(VertexInfo {
            name: name.to_string(),
            op,
        });
        let _ = self.vertex_index.insert(name.to_string(), id);
        Ok(id)
    }

    fn check_operands(&self, name: &str, op: &Operation) -> Result<(), GraphError> {
        let check_var = |v: Variable| {
            if v.id() < self.variables.len() {
                Ok(())
            } else {
                Err(GraphError::UnknownVariable(name.to_string()))
            }
        };
        let check_operand = |o: Operand| match o {
            Operand::Var(v) => check_var(v),
            Operand::Int(_) => Ok(()),
        };
        match *op {
            Operation::Add { lhs, rhs }
            | Operation::Sub { lhs, rhs }
            | Operation::CondInc { lhs, rhs }
            | Operation::CondDec { lhs, rhs } => {
                check_var(lhs)?;
                check_operand(rhs)?;
                if rhs == Operand::Var(lhs) {
                    return Err(GraphError::SelfMutation(name.to_string()));
                }
                Ok(())
            }
            Operation::IntegerPrint(arg) | Operation::UnicodePrint(arg) => check_operand(arg),
            Operation::Initial | Operation::Terminal | Operation::NoOp => Ok(()),
        }
    }

    /// Adds an undirected edge between two vertices. The insertion order of
    /// edges fixes the neighbor enumeration order of the graph, which in
    /// turn makes the search deterministic.
    pub fn edge(&mut self, u: VertexId, v: VertexId) -> Result<(), GraphError> {
        if u.id() >= self.vertices.len() || v.id() >= self.vertices.len() {
            return Err(GraphError::UnknownVertex);
        }
        if u == v {
            return Err(GraphError::SelfLoop(self.vertices[u.id()].name.clone()));
        }
        let canonical = (u.id().min(v.id()), u.id().max(v.id()));
        if !self.edge_set.insert(canonical) {
            return Err(GraphError::DuplicateEdge(
                self.vertices[u.id()].name.clone(),
                self.vertices[v.id()].name.clone(),
            ));
        }
        self.edges.push((u, v));
        Ok(())
    }

    /// Validates the invariants and produces the immutable graph.
    pub fn build(self) -> Result<Graph, GraphError> {
        let mut initial = None;
        let mut terminal = None;
        for (id, vertex) in self.vertices.iter().enumerate() {
            match vertex.op {
                Operation::Initial => {
                    if initial.replace(VertexId(id)).is_some() {
                        return Err(GraphError::MultipleInitial);
                    }
                }
                Operation::Terminal => {
                    if terminal.replace(VertexId(id)).is_some() {
                        return Err(GraphError::MultipleTerminal);
                    }
                }
                _ => {}
            }
        }
        let initial = initial.ok_or(GraphError::MissingInitial)?;
        let terminal = terminal.ok_or(GraphError::MissingTerminal)?;

        let mut adjacency = vec![vec![]; self.vertices.len()];
        for &(u, v) in self.edges.iter() {
            adjacency[u.id()].push(v);
            adjacency[v.id()].push(u);
        }

        Ok(Graph {
            variables: self.variables,
            var_index: self.var_index,
            vertices: self.vertices,
            vertex_index: self.vertex_index,
            edges: self.edges,
            adjacency,
            initial,
            terminal,
        })
    }
}

// ----------------------------------------------------------------------------
// --- GRAPH ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A validated puzzle program: an undirected simple graph whose vertices
/// carry operations, with exactly one initial and one terminal vertex.
/// Graphs are immutable; they are shared by the walk model, the evaluator
/// and the search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    variables: Vec<VariableInfo>,
    var_index: FxHashMap<String, Variable>,
    vertices: Vec<VertexInfo>,
    vertex_index: FxHashMap<String, VertexId>,
    edges: Vec<(VertexId, VertexId)>,
    adjacency: Vec<Vec<VertexId>>,
    initial: VertexId,
    terminal: VertexId,
}

impl Graph {
    /// The number of declared variables.
    pub fn nb_variables(&self) -> usize {
        self.variables.len()
    }
    /// The number of vertices.
    pub fn nb_vertices(&self) -> usize {
        self.vertices.len()
    }
    /// The number of undirected edges.
    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }
    /// The unique vertex bearing the `Initial` marker.
    pub fn initial(&self) -> VertexId {
        self.initial
    }
    /// The unique vertex bearing the `Terminal` marker.
    pub fn terminal(&self) -> VertexId {
        self.terminal
    }
    /// The operation carried by the given vertex.
    pub fn op(&self, vertex: VertexId) -> &Operation {
        &self.vertices[vertex.id()].op
    }
    /// The name of the given vertex.
    pub fn vertex_name(&self, vertex: VertexId) -> &str {
        &self.vertices[vertex.id()].name
    }
    /// The name of the given variable.
    pub fn variable_name(&self, var: Variable) -> &str {
        &self.variables[var.id()].name
    }
    /// Looks a variable up by name.
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.var_index.get(name).copied()
    }
    /// Looks a vertex up by name.
    pub fn vertex(&self, name: &str) -> Option<VertexId> {
        self.vertex_index.get(name).copied()
    }
    /// The prescribed starting value of the given variable, or `None` when
    /// the variable is free.
    pub fn fixed_value(&self, var: Variable) -> Option<i64> {
        self.variables[var.id()].fixed
    }
    /// Iterates over all variables, in id order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> {
        (0..self.variables.len()).map(Variable)
    }
    /// Iterates over the free variables, in id order.
    pub fn free_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, info)| info.fixed.is_none())
            .map(|(id, _)| Variable(id))
    }
    /// Iterates over the fixed variables and their prescribed values, in id
    /// order.
    pub fn fixed_variables(&self) -> impl Iterator<Item = (Variable, i64)> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter_map(|(id, info)| info.fixed.map(|value| (Variable(id), value)))
    }
    /// The neighbors of the given vertex, in edge insertion order.
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        &self.adjacency[vertex.id()]
    }
    /// The undirected edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.edges.iter().copied()
    }
    /// True iff the two vertices are connected by an edge.
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency[u.id()].contains(&v)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_graph {
    use crate::*;

    fn tiny() -> Result<Graph, GraphError> {
        let mut builder = GraphBuilder::new();
        let a = builder.fixed("a", 1)?;
        let b = builder.free("b")?;
        let initial = builder.vertex("initial", Operation::Initial)?;
        let add = builder.vertex(
            "add",
            Operation::Add {
                lhs: a,
                rhs: Operand::Var(b),
            },
        )?;
        let terminal = builder.vertex("terminal", Operation::Terminal)?;
        builder.edge(initial, add)?;
        builder.edge(add, terminal)?;
        builder.build()
    }

    #[test]
    fn a_well_formed_graph_builds() {
        let graph = tiny().unwrap();
        assert_eq!(2, graph.nb_variables());
        assert_eq!(3, graph.nb_vertices());
        assert_eq!(2, graph.nb_edges());
        assert_eq!("initial", graph.vertex_name(graph.initial()));
        assert_eq!("terminal", graph.vertex_name(graph.terminal()));
    }

    #[test]
    fn names_resolve_to_their_dense_ids() {
        let graph = tiny().unwrap();
        assert_eq!(Some(Variable(0)), graph.variable("a"));
        assert_eq!(Some(Variable(1)), graph.variable("b"));
        assert_eq!(None, graph.variable("c"));
        assert_eq!(Some(VertexId(1)), graph.vertex("add"));
        assert_eq!(None, graph.vertex("nowhere"));
    }

    #[test]
    fn fixed_and_free_variables_are_told_apart() {
        let graph = tiny().unwrap();
        assert_eq!(Some(1), graph.fixed_value(Variable(0)));
        assert_eq!(None, graph.fixed_value(Variable(1)));
        assert_eq!(vec![Variable(1)], graph.free_variables().collect::<Vec<_>>());
        assert_eq!(
            vec![(Variable(0), 1)],
            graph.fixed_variables().collect::<Vec<_>>()
        );
    }

    #[test]
    fn neighbors_are_listed_in_edge_insertion_order() {
        let mut builder = GraphBuilder::new();
        let initial = builder.vertex("initial", Operation::Initial).unwrap();
        let a = builder.vertex("a", Operation::NoOp).unwrap();
        let b = builder.vertex("b", Operation::NoOp).unwrap();
        let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
        builder.edge(initial, b).unwrap();
        builder.edge(initial, a).unwrap();
        builder.edge(a, terminal).unwrap();
        builder.edge(b, terminal).unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(&[b, a], graph.neighbors(initial));
        assert_eq!(&[a, b], graph.neighbors(terminal));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut builder = GraphBuilder::new();
        assert_eq!(Err(GraphError::EmptyVariableName), builder.free(""));
        assert_eq!(
            Err(GraphError::EmptyVertexName),
            builder.vertex("", Operation::NoOp)
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut builder = GraphBuilder::new();
        let _ = builder.free("x").unwrap();
        assert_eq!(
            Err(GraphError::DuplicateVariable("x".to_string())),
            builder.fixed("x", 0)
        );
        let _ = builder.vertex("n", Operation::NoOp).unwrap();
        assert_eq!(
            Err(GraphError::DuplicateVertex("n".to_string())),
            builder.vertex("n", Operation::NoOp)
        );
    }

    #[test]
    fn foreign_variable_ids_are_rejected() {
        let mut builder = GraphBuilder::new();
        assert_eq!(
            Err(GraphError::UnknownVariable("bad".to_string())),
            builder.vertex(
                "bad",
                Operation::Add {
                    lhs: Variable(7),
                    rhs: Operand::Int(1)
                }
            )
        );
    }

    #[test]
    fn self_mutation_is_rejected() {
        let mut builder = GraphBuilder::new();
        let x = builder.free("x").unwrap();
        assert_eq!(
            Err(GraphError::SelfMutation("twice".to_string())),
            builder.vertex(
                "twice",
                Operation::Add {
                    lhs: x,
                    rhs: Operand::Var(x)
                }
            )
        );
    }

    #[test]
    fn self_loops_and_duplicate_edges_are_rejected() {
        let mut builder = GraphBuilder::new();
        let a = builder.vertex("a", Operation::Initial).unwrap();
        let b = builder.vertex("b", Operation::Terminal).unwrap();
        assert_eq!(Err(GraphError::SelfLoop("a".to_string())), builder.edge(a, a));
        builder.edge(a, b).unwrap();
        assert_eq!(
            Err(GraphError::DuplicateEdge("b".to_string(), "a".to_string())),
            builder.edge(b, a)
        );
        assert_eq!(Err(GraphError::UnknownVertex), builder.edge(a, VertexId(9)));
    }

    #[test]
    fn initial_and_terminal_markers_must_be_unique() {
        let mut builder = GraphBuilder::new();
        let _ = builder.vertex("terminal", Operation::Terminal).unwrap();
        assert_eq!(Err(GraphError::MissingInitial), builder.build());

        let mut builder = GraphBuilder::new();
        let _ = builder.vertex("initial", Operation::Initial).unwrap();
        assert_eq!(Err(GraphError::MissingTerminal), builder.build());

        let mut builder = GraphBuilder::new();
        let _ = builder.vertex("i1", Operation::Initial).unwrap();
        let _ = builder.vertex("i2", Operation::Initial).unwrap();
        let _ = builder.vertex("t", Operation::Terminal).unwrap();
        assert_eq!(Err(GraphError::MultipleInitial), builder.build());

        let mut builder = GraphBuilder::new();
        let _ = builder.vertex("i", Operation::Initial).unwrap();
        let _ = builder.vertex("t1", Operation::Terminal).unwrap();
        let _ = builder.vertex("t2", Operation::Terminal).unwrap();
        assert_eq!(Err(GraphError::MultipleTerminal), builder.build());
    }
}
