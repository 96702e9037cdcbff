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

//! This example solves the triangle-sum maze: a walk keeps looping through a
//! triangle that subtracts a decreasing countdown from the free variable
//! `T`, and may leave for the terminal whenever it passes the junction. The
//! solver discovers for which triangular number `T` the maze is satisfiable.
//!
//! ```plain
//!     initial ----------------- none --- terminal
//!        |                       |
//!        '--- decr_x -- sub_t_x -'
//! ```

use clap::Parser;
use conlog::*;

/// This structure uses `clap-derive` annotations and defines the arguments
/// that can be passed on to the executable.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The starting value of the fixed countdown variable
    #[clap(short, long, default_value = "6")]
    countdown: i64,
    /// The maximum number of states the search may expand
    #[clap(short, long, default_value = "65536")]
    limit: usize,
    /// Disable the monotonicity pruning
    #[clap(long)]
    no_pruning: bool,
    /// Print the value of every variable after each position of the walk
    #[clap(long)]
    trace: bool,
}

fn build(countdown: i64) -> Result<Graph, GraphError> {
    let mut builder = GraphBuilder::new();
    let t = builder.free("T")?;
    let n = builder.fixed("n", countdown)?;

    let initial = builder.vertex("initial", Operation::Initial)?;
    let decr_x = builder.vertex("decr_x", Operation::Sub { lhs: n, rhs: Operand::Int(1) })?;
    let sub_t_x = builder.vertex("sub_t_x", Operation::Sub { lhs: t, rhs: Operand::Var(n) })?;
    let none = builder.vertex("none", Operation::NoOp)?;
    let terminal = builder.vertex("terminal", Operation::Terminal)?;

    builder.edge(initial, decr_x)?;
    builder.edge(decr_x, sub_t_x)?;
    builder.edge(sub_t_x, none)?;
    builder.edge(none, initial)?;
    builder.edge(none, terminal)?;
    builder.build()
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let graph = build(args.countdown).unwrap();
    let config = SolverConfigBuilder::default()
        .iteration_limit(args.limit)
        .use_pruning(!args.no_pruning)
        .build()
        .unwrap();

    let mut solver = Solver::new(&graph, config);
    match solver.solve() {
        SolveResult::Satisfiable(solution) => {
            for var in graph.free_variables() {
                println!("{} = {}", graph.variable_name(var), solution.assignment[var]);
            }
            let names = solution
                .walk
                .iter()
                .map(|&v| graph.vertex_name(v))
                .collect::<Vec<_>>();
            println!("walk ({} vertices): {}", names.len(), names.join(" -- "));
            println!("states explored: {}", solver.explored());

            if args.trace {
                for (position, values) in
                    value_trace(&graph, &solution.walk, &solution.assignment)
                        .iter()
                        .enumerate()
                {
                    let pretty = graph
                        .variables()
                        .map(|var| format!("{}={}", graph.variable_name(var), values[var.id()]))
                        .collect::<Vec<_>>();
                    println!("{:>4} {:<10} {}", position, names[position], pretty.join(" "));
                }
            }
        }
        SolveResult::Unsatisfiable => println!("unsatisfiable"),
        SolveResult::BudgetExceeded => println!("unsatisfiable (budget exceeded)"),
        SolveResult::Cancelled => println!("cancelled"),
    }
}
