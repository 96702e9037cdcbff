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

//! This example solves the diode gadget: a corridor that walks can only
//! cross in one direction. `y` starts at one and must come back to zero;
//! the conditional increment on `z` fires exactly when the corridor is
//! crossed the wrong way, which leaves `z` stuck at one and rules those
//! walks out.

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
    let y = builder.fixed("y", 1)?;
    let z = builder.fixed("z", 0)?;

    let initial = builder.vertex("initial", Operation::Initial)?;
    let dec1 = builder.vertex("dec1", Operation::Sub { lhs: y, rhs: Operand::Int(1) })?;
    let diode = builder.vertex("diode", Operation::CondInc { lhs: z, rhs: Operand::Var(y) })?;
    let inc = builder.vertex("inc", Operation::Add { lhs: y, rhs: Operand::Int(1) })?;
    let dec2 = builder.vertex("dec2", Operation::Sub { lhs: y, rhs: Operand::Int(1) })?;
    let terminal = builder.vertex("terminal", Operation::Terminal)?;

    builder.edge(initial, dec1)?;
    builder.edge(dec1, diode)?;
    builder.edge(diode, inc)?;
    builder.edge(inc, dec2)?;
    builder.edge(dec2, terminal)?;
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
            if graph.free_variables().next().is_none() {
                println!("satisfiable with no free variables");
            }
            for var in graph.free_variables() {
                println!("{} = {}", graph.variable_name(var), solution.assignment[var]);
            }
            let names = solution
                .walk
                .iter()
                .map(|&v| graph.vertex_name(v))
                .collect::<Vec<_>>();
            println!("walk: {}", names.join(" -- "));
        }
        SolveResult::Unsatisfiable => println!("unsatisfiable"),
        SolveResult::BudgetExceeded => println!("unsatisfiable (budget exceeded)"),
        SolveResult::Cancelled => println!("cancelled"),
    }
}
