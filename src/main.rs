//! Run a given lambda calculus script and print the result of each
//! expression statement to standard output.
//!
//! Example usage:
//!
//!     cargo run -- test_programs/booleans.lc --show-steps
//!
//! Set `RUST_LOG=rust_lambda_script=debug` to see evaluation logs on stderr.

use clap::Parser;
use rust_lambda_script::end_to_end::{run_interpreter, InterpreterConfig};
use rust_lambda_script::program_execution::StdoutOutput;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Only installs a subscriber when RUST_LOG is set.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();

    let interpreter_config = InterpreterConfig::parse();

    let interpreter_result = run_interpreter(&interpreter_config, &mut StdoutOutput);

    if let Err(run_error) = interpreter_result {
        eprintln!("{}", run_error);
        std::process::exit(1);
    }
}
