use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcomes of a run. A failing build is not one of them: its status is
/// simply the run's result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot resolve project root from {path}: {source}")]
    RootResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no parent directory to use as project root")]
    RootHasNoParent { path: PathBuf },

    #[error("loading runner config: {0:#}")]
    Config(#[source] anyhow::Error),

    #[error("permission reset on {directory} exited with code {code}")]
    PermissionReset { directory: PathBuf, code: i32 },

    #[error("{0:#}")]
    Spawn(#[source] anyhow::Error),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::PermissionReset { code, .. } => *code,
            _ => 1,
        }
    }

    /// True when a child process already printed its own diagnostics.
    pub fn reported_by_child(&self) -> bool {
        matches!(self, RunError::PermissionReset { .. })
    }
}
