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

//! Scenario tests for the solver: small mazes with known satisfiability.
//! Each scenario validates the witness against the forward evaluator
//! rather than against a hard-coded walk, so the suite pins the semantics
//! without over-constraining the exploration order.

use crate::*;

/// The triangle-sum maze. The walk loops through the triangle, adding the
/// decreasing countdown to `T`, and may exit to the terminal whenever it
/// passes the junction:
///
/// ```plain
///     initial ----------------- none --- terminal
///        |                       |
///        '--- decr_x -- sub_t_x -'
/// ```
fn triangle_sum(n: i64) -> Graph {
    let mut builder = GraphBuilder::new();
    let t = builder.free("T").unwrap();
    let n_var = builder.fixed("n", n).unwrap();
    let initial = builder.vertex("initial", Operation::Initial).unwrap();
    let decr_x = builder
        .vertex(
            "decr_x",
            Operation::Sub {
                lhs: n_var,
                rhs: Operand::Int(1),
            },
        )
        .unwrap();
    let sub_t_x = builder
        .vertex(
            "sub_t_x",
            Operation::Sub {
                lhs: t,
                rhs: Operand::Var(n_var),
            },
        )
        .unwrap();
    let none = builder.vertex("none", Operation::NoOp).unwrap();
    let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
    builder.edge(initial, decr_x).unwrap();
    builder.edge(decr_x, sub_t_x).unwrap();
    builder.edge(sub_t_x, none).unwrap();
    builder.edge(none, initial).unwrap();
    builder.edge(none, terminal).unwrap();
    builder.build().unwrap()
}

/// The diode gadget: a one-way corridor for walks. Both variables are
/// fixed, so a solution carries an empty free assignment.
fn diode() -> Graph {
    let mut builder = GraphBuilder::new();
    let y = builder.fixed("y", 1).unwrap();
    let z = builder.fixed("z", 0).unwrap();
    let initial = builder.vertex("initial", Operation::Initial).unwrap();
    let dec1 = builder
        .vertex(
            "dec1",
            Operation::Sub {
                lhs: y,
                rhs: Operand::Int(1),
            },
        )
        .unwrap();
    let diode = builder
        .vertex(
            "diode",
            Operation::CondInc {
                lhs: z,
                rhs: Operand::Var(y),
            },
        )
        .unwrap();
    let inc = builder
        .vertex(
            "inc",
            Operation::Add {
                lhs: y,
                rhs: Operand::Int(1),
            },
        )
        .unwrap();
    let dec2 = builder
        .vertex(
            "dec2",
            Operation::Sub {
                lhs: y,
                rhs: Operand::Int(1),
            },
        )
        .unwrap();
    let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
    builder.edge(initial, dec1).unwrap();
    builder.edge(dec1, diode).unwrap();
    builder.edge(diode, inc).unwrap();
    builder.edge(inc, dec2).unwrap();
    builder.edge(dec2, terminal).unwrap();
    builder.build().unwrap()
}

/// A linear chain that shuffles `x`, `y` and `z` around; forward evaluation
/// amounts to exchanging `x` and `y`, so both must start at zero.
fn fibonacci_swap() -> Graph {
    let mut builder = GraphBuilder::new();
    let x = builder.free("x").unwrap();
    let y = builder.free("y").unwrap();
    let z = builder.fixed("z", 0).unwrap();
    let initial = builder.vertex("initial", Operation::Initial).unwrap();
    let ops = [
        ("add_z_y", Operation::Add { lhs: z, rhs: Operand::Var(y) }),
        ("sub_y_z", Operation::Sub { lhs: y, rhs: Operand::Var(z) }),
        ("add_y_x", Operation::Add { lhs: y, rhs: Operand::Var(x) }),
        ("sub_x_y", Operation::Sub { lhs: x, rhs: Operand::Var(y) }),
        ("add_x_z", Operation::Add { lhs: x, rhs: Operand::Var(z) }),
        ("sub_z_x", Operation::Sub { lhs: z, rhs: Operand::Var(x) }),
    ];
    let mut previous = initial;
    for (name, op) in ops {
        let vertex = builder.vertex(name, op).unwrap();
        builder.edge(previous, vertex).unwrap();
        previous = vertex;
    }
    let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
    builder.edge(previous, terminal).unwrap();
    builder.build().unwrap()
}

/// A single bare edge with a fixed variable that nothing ever changes.
fn stuck_at_one() -> Graph {
    let mut builder = GraphBuilder::new();
    let _ = builder.fixed("a", 1).unwrap();
    let initial = builder.vertex("initial", Operation::Initial).unwrap();
    let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
    builder.edge(initial, terminal).unwrap();
    builder.build().unwrap()
}

/// A maze whose corridor is nothing but junctions; useful to exercise the
/// no-op chain elision end to end.
fn junction_corridor() -> Graph {
    let mut builder = GraphBuilder::new();
    let a = builder.fixed("a", 2).unwrap();
    let initial = builder.vertex("initial", Operation::Initial).unwrap();
    let dec = builder
        .vertex(
            "dec",
            Operation::Sub {
                lhs: a,
                rhs: Operand::Int(2),
            },
        )
        .unwrap();
    let n1 = builder.vertex("n1", Operation::NoOp).unwrap();
    let n2 = builder.vertex("n2", Operation::NoOp).unwrap();
    let n3 = builder.vertex("n3", Operation::NoOp).unwrap();
    let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
    builder.edge(initial, dec).unwrap();
    builder.edge(dec, n1).unwrap();
    builder.edge(n1, n2).unwrap();
    builder.edge(n2, n3).unwrap();
    builder.edge(n3, terminal).unwrap();
    builder.build().unwrap()
}

fn assert_valid_witness(graph: &Graph, solution: &Solution) {
    // the walk starts at the initial vertex, ends at the terminal one,
    // uses only edges, and never backtracks
    assert_eq!(Some(&graph.initial()), solution.walk.first());
    assert_eq!(Some(&graph.terminal()), solution.walk.last());
    for window in solution.walk.windows(2) {
        assert!(graph.has_edge(window[0], window[1]));
    }
    for window in solution.walk.windows(3) {
        assert_ne!(window[0], window[2]);
    }
    // the assignment honors the boundary conditions
    for (var, value) in graph.fixed_variables() {
        assert_eq!(value, solution.assignment.get(var));
    }
    // replaying the walk forward accepts it and reproduces it exactly
    let replayed = evaluate(graph, &solution.walk, &solution.assignment).unwrap();
    assert_eq!(solution, &replayed);
}

// =================================================================
// scenarios
// =================================================================

#[test]
fn triangle_sum_binds_the_free_variable_to_a_triangular_number() {
    let graph = triangle_sum(6);
    let result = solve(&graph, &SolverConfig::default());
    let solution = result.solution().expect("expected a witness");

    assert_valid_witness(&graph, solution);
    let t = graph.variable("T").unwrap();
    let bound = solution.assignment.get(t);
    assert!(
        bound == 15 || bound == 21,
        "T was bound to {bound}, expected a triangular number"
    );
}

#[test]
fn the_diode_gadget_is_satisfiable_with_an_empty_free_assignment() {
    let graph = diode();
    let result = solve(&graph, &SolverConfig::default());
    let solution = result.solution().expect("expected a witness");

    assert_valid_witness(&graph, solution);
    assert_eq!(0, graph.free_variables().count());
}

#[test]
fn the_swap_chain_forces_both_free_variables_to_zero() {
    let graph = fibonacci_swap();
    let result = solve(&graph, &SolverConfig::default());
    let solution = result.solution().expect("expected a witness");

    assert_valid_witness(&graph, solution);
    let x = graph.variable("x").unwrap();
    let y = graph.variable("y").unwrap();
    assert_eq!(0, solution.assignment.get(x));
    assert_eq!(0, solution.assignment.get(y));
}

#[test]
fn a_fixed_variable_nothing_changes_makes_the_graph_unsatisfiable() {
    let graph = stuck_at_one();
    assert_eq!(
        SolveResult::Unsatisfiable,
        solve(&graph, &SolverConfig::default())
    );
}

#[test]
fn a_one_iteration_budget_is_exceeded_by_any_real_search() {
    let graph = triangle_sum(6);
    let config = SolverConfigBuilder::default()
        .iteration_limit(1)
        .build()
        .unwrap();
    assert_eq!(SolveResult::BudgetExceeded, solve(&graph, &config));
}

#[test]
fn a_tiny_queue_capacity_is_reported_like_an_exhausted_budget() {
    let graph = triangle_sum(6);
    let config = SolverConfigBuilder::default()
        .queue_capacity(2)
        .build()
        .unwrap();
    assert_eq!(SolveResult::BudgetExceeded, solve(&graph, &config));
}

#[test]
fn a_cancelled_solve_returns_promptly() {
    let graph = triangle_sum(6);
    let flag = CancellationFlag::new();
    flag.cancel();
    let mut solver = Solver::with_cutoff(&graph, SolverConfig::default(), &flag);
    assert_eq!(SolveResult::Cancelled, solver.solve());
    assert_eq!(0, solver.explored());
}

// =================================================================
// cross-cutting properties
// =================================================================

#[test]
fn every_witness_survives_forward_replay() {
    for graph in [triangle_sum(6), diode(), fibonacci_swap(), junction_corridor()] {
        let result = solve(&graph, &SolverConfig::default());
        let solution = result.solution().expect("expected a witness");
        assert_valid_witness(&graph, solution);
    }
}

#[test]
fn nondecreasing_variables_never_decrease_along_a_witness_walk() {
    for graph in [triangle_sum(6), diode(), fibonacci_swap()] {
        let facts = analyze_monotonicity(&graph);
        let result = solve(&graph, &SolverConfig::default());
        let solution = result.solution().expect("expected a witness");

        let trace = value_trace(&graph, &solution.walk, &solution.assignment);
        for var in graph.variables() {
            for window in trace.windows(2) {
                if facts.is_nondecreasing(var) {
                    assert!(window[0][var.id()] <= window[1][var.id()]);
                }
                if facts.is_nonincreasing(var) {
                    assert!(window[0][var.id()] >= window[1][var.id()]);
                }
            }
        }
    }
}

#[test]
fn disabling_the_pruner_does_not_change_satisfiability() {
    let config = SolverConfigBuilder::default()
        .use_pruning(false)
        .build()
        .unwrap();

    for graph in [triangle_sum(6), diode(), fibonacci_swap()] {
        let result = solve(&graph, &config);
        let solution = result.solution().expect("expected a witness");
        assert_valid_witness(&graph, solution);
    }
    assert_eq!(SolveResult::Unsatisfiable, solve(&stuck_at_one(), &config));
}

#[test]
fn two_identical_solves_return_identical_results() {
    for graph in [triangle_sum(6), diode(), fibonacci_swap(), stuck_at_one()] {
        let config = SolverConfig::default();
        assert_eq!(solve(&graph, &config), solve(&graph, &config));
    }
}

#[test]
fn raising_the_iteration_limit_never_loses_a_solution() {
    let graph = triangle_sum(6);
    let mut last_satisfiable = false;
    for limit in [1, 16, 256, 4096, 65_536] {
        let config = SolverConfigBuilder::default()
            .iteration_limit(limit)
            .build()
            .unwrap();
        let satisfiable = solve(&graph, &config).is_satisfiable();
        assert!(satisfiable || !last_satisfiable);
        last_satisfiable = satisfiable;
    }
    assert!(last_satisfiable);
}

#[test]
fn the_budget_counts_popped_states() {
    let graph = stuck_at_one();
    let mut solver = Solver::new(&graph, SolverConfig::default());
    let _ = solver.solve();
    // one seed popped, no successors generated past the initial vertex
    assert!(solver.explored() >= 1);
}

// =================================================================
// no-op chain elision
// =================================================================

#[test]
fn elision_agrees_with_the_plain_walk_model_on_satisfiability() {
    let plain = SolverConfig::default();
    let elided = SolverConfigBuilder::default()
        .elide_noop_chains(true)
        .build()
        .unwrap();

    for graph in [junction_corridor(), triangle_sum(6), diode()] {
        assert_eq!(
            solve(&graph, &plain).is_satisfiable(),
            solve(&graph, &elided).is_satisfiable()
        );
    }
    assert_eq!(SolveResult::Unsatisfiable, solve(&stuck_at_one(), &elided));
}

#[test]
fn elision_still_returns_a_fully_spliced_legal_walk() {
    let graph = junction_corridor();
    let config = SolverConfigBuilder::default()
        .elide_noop_chains(true)
        .build()
        .unwrap();
    let result = solve(&graph, &config);
    let solution = result.solution().expect("expected a witness");

    // the witness must contain the junction vertices even though the search
    // skipped over them
    assert_valid_witness(&graph, solution);
    assert_eq!(6, solution.walk.len());
}

#[test]
fn elision_explores_fewer_states_on_junction_heavy_graphs() {
    let graph = junction_corridor();
    let mut plain = Solver::new(&graph, SolverConfig::default());
    let _ = plain.solve();
    let config = SolverConfigBuilder::default()
        .elide_noop_chains(true)
        .build()
        .unwrap();
    let mut elided = Solver::new(&graph, config);
    let _ = elided.solve();

    assert!(elided.explored() <= plain.explored());
}

// =================================================================
// output streams
// =================================================================

#[test]
fn print_vertices_contribute_to_the_witness_output() {
    let mut builder = GraphBuilder::new();
    let a = builder.fixed("a", 42).unwrap();
    let initial = builder.vertex("initial", Operation::Initial).unwrap();
    let star = builder
        .vertex("star", Operation::UnicodePrint(Operand::Var(a)))
        .unwrap();
    let show = builder
        .vertex("show", Operation::IntegerPrint(Operand::Var(a)))
        .unwrap();
    let dec = builder
        .vertex(
            "dec",
            Operation::Sub {
                lhs: a,
                rhs: Operand::Int(42),
            },
        )
        .unwrap();
    let terminal = builder.vertex("terminal", Operation::Terminal).unwrap();
    builder.edge(initial, star).unwrap();
    builder.edge(star, show).unwrap();
    builder.edge(show, dec).unwrap();
    builder.edge(dec, terminal).unwrap();
    let graph = builder.build().unwrap();

    let result = solve(&graph, &SolverConfig::default());
    let solution = result.solution().expect("expected a witness");
    assert_eq!(
        vec![OutputItem::Char('*'), OutputItem::Int(42)],
        solution.output
    );
}
