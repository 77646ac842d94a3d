use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};

/// A fully resolved child process invocation: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl StepCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote_for_display(&self.program));
        for arg in &self.args {
            parts.push(quote_for_display(arg));
        }
        parts.join(" ")
    }
}

/// Runs step commands to completion and reports their exit code.
pub trait Executor {
    fn execute(&mut self, command: &StepCommand, cwd: &Path) -> Result<i32>;
}

/// Spawns real child processes that share this process's standard streams.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&mut self, command: &StepCommand, cwd: &Path) -> Result<i32> {
        tracing::debug!(cwd = %cwd.display(), "running: {}", command.render());

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("spawning `{}`", command.render()))?;

        let code = exit_code(status);
        tracing::debug!(code, "`{}` finished", command.program);
        Ok(code)
    }
}

pub fn command_exists(executable: &str) -> bool {
    Command::new(executable)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Numeric code of a finished child. Signal terminations follow the shell
/// convention of `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

fn quote_for_display(input: &str) -> String {
    if input.is_empty() {
        return "\"\"".to_string();
    }

    if input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '='))
    {
        return input.to_string();
    }

    format!("\"{}\"", input.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_quotes_only_when_needed() {
        let cmd = StepCommand::new(
            "sh",
            vec!["-c".to_string(), "echo \"hi\"".to_string(), String::new()],
        );
        assert_eq!(cmd.render(), r#"sh -c "echo \"hi\"" """#);
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_reports_child_code_and_cwd() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cmd = StepCommand::new(
            "sh",
            vec!["-c".to_string(), "pwd > cwd.txt; exit 7".to_string()],
        );

        let code = SystemExecutor.execute(&cmd, tmp.path()).expect("spawn sh");
        assert_eq!(code, 7);

        let written = std::fs::read_to_string(tmp.path().join("cwd.txt")).expect("cwd.txt");
        let expected = tmp.path().canonicalize().expect("canonical tmp");
        assert_eq!(Path::new(written.trim()).canonicalize().expect("canonical"), expected);
    }

    #[cfg(unix)]
    #[test]
    fn signal_termination_maps_to_shell_convention() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cmd = StepCommand::new("sh", vec!["-c".to_string(), "kill -TERM $$".to_string()]);

        let code = SystemExecutor.execute(&cmd, tmp.path()).expect("spawn sh");
        assert_eq!(code, 128 + 15);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cmd = StepCommand::new("release-runner-no-such-program", Vec::new());

        let err = SystemExecutor.execute(&cmd, tmp.path()).expect_err("must fail");
        assert!(err.to_string().contains("spawning"));
    }
}
