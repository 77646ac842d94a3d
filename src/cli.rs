use std::ffi::OsString;
use std::iter;
use std::process::ExitCode;

use clap::Parser;

use crate::config::load_runner_config;
use crate::error::RunError;
use crate::os::root;
use crate::tools::runner::BuildRunner;
use crate::utils::shell::SystemExecutor;

/// Root CLI for release-runner
///
/// Every token is a plain value: there are no flags, and `--help`, `--version`
/// or `--` build like any other argument.
#[derive(Parser)]
#[command(name = "release-runner")]
#[command(about = "Release-build helper for CI: builds the workspace from its project root")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// `clear` wraps the build in permission resets; anything else is ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

impl Cli {
    /// Parses with an escape marker in front of the user's tokens, so clap
    /// never consumes a leading `--` of their own.
    pub fn parse_raw(argv: impl IntoIterator<Item = OsString>) -> Self {
        Cli::parse_from(escaped_argv(argv))
    }

    /// Non-UTF-8 tokens are kept lossily; they can never equal `clear`.
    pub fn tokens(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

fn escaped_argv(argv: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut argv = argv.into_iter();
    let bin = argv
        .next()
        .unwrap_or_else(|| OsString::from("release-runner"));
    iter::once(bin)
        .chain(iter::once(OsString::from("--")))
        .chain(argv)
        .collect()
}

/// Dispatch after parse
pub fn run() -> ExitCode {
    let cli = Cli::parse_raw(std::env::args_os());

    match execute(&cli.tokens()) {
        Ok(status) => ExitCode::from(exit_byte(status)),
        Err(e) => {
            if e.reported_by_child() {
                tracing::debug!("{e}");
            } else {
                eprintln!("error (release): {e}");
            }
            ExitCode::from(exit_byte(e.exit_code()))
        }
    }
}

fn execute(args: &[String]) -> Result<i32, RunError> {
    let root = root::resolve_project_root()?;
    let config = load_runner_config(&root).map_err(RunError::Config)?;
    BuildRunner::new(root, config, SystemExecutor).run(args)
}

/// Process exit codes are a single byte; a failure must never wrap to 0.
fn exit_byte(status: i32) -> u8 {
    match (status, (status & 0xff) as u8) {
        (0, _) => 0,
        (_, 0) => 1,
        (_, byte) => byte,
    }
}
