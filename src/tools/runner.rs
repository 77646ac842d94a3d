use std::path::PathBuf;

use crate::config::RunnerConfig;
use crate::error::RunError;
use crate::os::permissions::{self, PermissionReset};
use crate::tools::toolchain;
use crate::utils::shell::Executor;

/// First argument that wraps the build in permission resets.
pub const CLEAR_ARG: &str = "clear";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    BuildOnly,
    Clear,
}

impl RunMode {
    /// Only the first token counts, compared exactly.
    pub fn from_args(args: &[String]) -> Self {
        match args.first() {
            Some(first) if first == CLEAR_ARG => RunMode::Clear,
            _ => RunMode::BuildOnly,
        }
    }
}

pub struct BuildRunner<E> {
    root: PathBuf,
    config: RunnerConfig,
    /// Asked only when a reset is planned with elevation enabled.
    sudo_probe: fn() -> bool,
    executor: E,
}

impl<E: Executor> BuildRunner<E> {
    pub fn new(root: PathBuf, config: RunnerConfig, executor: E) -> Self {
        Self {
            root,
            config,
            sudo_probe: permissions::sudo_available,
            executor,
        }
    }

    #[cfg(test)]
    pub fn with_sudo_probe(mut self, sudo_probe: fn() -> bool) -> Self {
        self.sudo_probe = sudo_probe;
        self
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the whole sequence and returns the build's exit code.
    ///
    /// A failing pre-reset aborts before the build. The post-reset runs after
    /// any build outcome; its own failure is fatal only when the build
    /// succeeded, otherwise the build's code is kept.
    pub fn run(&mut self, args: &[String]) -> Result<i32, RunError> {
        let mode = RunMode::from_args(args);
        tracing::debug!(root = %self.root.display(), ?mode, "starting release build");

        let reset = match mode {
            RunMode::Clear => Some(self.plan_reset()),
            RunMode::BuildOnly => None,
        };

        if let Some(reset) = &reset {
            self.reset_permissions(reset)?;
        }

        let build = toolchain::build_command(&self.config.build);
        let status = self
            .executor
            .execute(&build, &self.root)
            .map_err(RunError::Spawn)?;
        if status != 0 {
            tracing::debug!(status, "build failed");
        }

        if let Some(reset) = &reset {
            match self.reset_permissions(reset) {
                Ok(()) => {}
                Err(err) if status != 0 => {
                    tracing::warn!("post-build {err}; keeping build status {status}");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(status)
    }

    fn plan_reset(&self) -> PermissionReset {
        let sudo = self.config.permissions.elevate && (self.sudo_probe)();
        PermissionReset::plan(&self.root, &self.config.permissions, sudo)
    }

    fn reset_permissions(&mut self, reset: &PermissionReset) -> Result<(), RunError> {
        if !reset.is_needed() {
            tracing::debug!(directory = %reset.directory.display(), "nothing to reset");
            return Ok(());
        }

        let code = self
            .executor
            .execute(&reset.command, &self.root)
            .map_err(RunError::Spawn)?;
        if code != 0 {
            return Err(RunError::PermissionReset {
                directory: reset.directory.clone(),
                code,
            });
        }
        Ok(())
    }
}
