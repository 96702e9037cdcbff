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

//! This example solves a linear chain of additions and subtractions whose
//! net effect is to exchange `x` and `y` (the register shuffle at the heart
//! of an iterative fibonacci). Since both must be zero when the walk ends,
//! the only satisfying start is `x = 0, y = 0`, which is exactly what the
//! solver binds them to.

use clap::Parser;
use conlog::*;

/// This structure uses `clap-derive` annotations and defines the arguments
/// that can be passed on to the executable.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The maximum number of states the search may expand
    #[clap(short, long, default_value = "65536")]
    limit: usize,
}

fn build() -> Result<Graph, GraphError> {
    let mut builder = GraphBuilder::new();
    let x = builder.free("x")?;
    let y = builder.free("y")?;
    let z = builder.fixed("z", 0)?;

    let initial = builder.vertex("initial", Operation::Initial)?;
    let steps = [
        ("add_z_y", Operation::Add { lhs: z, rhs: Operand::Var(y) }),
        ("sub_y_z", Operation::Sub { lhs: y, rhs: Operand::Var(z) }),
        ("add_y_x", Operation::Add { lhs: y, rhs: Operand::Var(x) }),
        ("sub_x_y", Operation::Sub { lhs: x, rhs: Operand::Var(y) }),
        ("add_x_z", Operation::Add { lhs: x, rhs: Operand::Var(z) }),
        ("sub_z_x", Operation::Sub { lhs: z, rhs: Operand::Var(x) }),
    ];
    let mut previous = initial;
    for (name, op) in steps {
        let vertex = builder.vertex(name, op)?;
        builder.edge(previous, vertex)?;
        previous = vertex;
    }
    let terminal = builder.vertex("terminal", Operation::Terminal)?;
    builder.edge(previous, terminal)?;
    builder.build()
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let graph = build().unwrap();
    let config = SolverConfigBuilder::default()
        .iteration_limit(args.limit)
        .build()
        .unwrap();

    match solve(&graph, &config) {
        SolveResult::Satisfiable(solution) => {
            for var in graph.free_variables() {
                println!("{} = {}", graph.variable_name(var), solution.assignment[var]);
            }
        }
        SolveResult::Unsatisfiable => println!("unsatisfiable"),
        SolveResult::BudgetExceeded => println!("unsatisfiable (budget exceeded)"),
        SolveResult::Cancelled => println!("cancelled"),
    }
}
