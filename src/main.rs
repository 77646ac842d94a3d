mod cli;
mod config;
mod error;
mod observability;
mod os;
mod tools;
mod utils;

use std::process::ExitCode;

fn main() -> ExitCode {
    observability::init_tracing();
    cli::run()
}
