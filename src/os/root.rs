use std::env;
use std::path::{Path, PathBuf};

use crate::error::RunError;

/// Overrides executable-based resolution; still canonicalised.
pub const ROOT_OVERRIDE_ENV: &str = "RELEASE_RUNNER_ROOT";

/// Project root for this invocation: `RELEASE_RUNNER_ROOT` when set,
/// otherwise the parent of the directory holding the running executable.
pub fn resolve_project_root() -> Result<PathBuf, RunError> {
    if let Some(raw) = env::var_os(ROOT_OVERRIDE_ENV).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(raw);
        return path
            .canonicalize()
            .map_err(|source| RunError::RootResolution { path, source });
    }

    let exe = env::current_exe().map_err(|source| RunError::RootResolution {
        path: PathBuf::from("<current executable>"),
        source,
    })?;
    root_from_executable(&exe)
}

/// Resolves symlinks and relative components, then walks up two levels:
/// `<root>/<bin dir>/<executable>` gives `<root>`.
pub fn root_from_executable(exe: &Path) -> Result<PathBuf, RunError> {
    let exe = exe
        .canonicalize()
        .map_err(|source| RunError::RootResolution {
            path: exe.to_path_buf(),
            source,
        })?;

    exe.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or(RunError::RootHasNoParent { path: exe })
}
