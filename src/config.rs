use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_CANDIDATES: &[(&str, ConfigFormat)] = &[
    ("release-runner.yml", ConfigFormat::Yaml),
    ("release-runner.yaml", ConfigFormat::Yaml),
    ("release-runner.toml", ConfigFormat::Toml),
];

pub const DEFAULT_FEATURE: &str = "masq_lib/no_test_share";

#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

#[derive(Debug, Clone)]
pub struct LoadedRunnerConfig {
    pub path: PathBuf,
    pub data: RunnerConfig,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub permissions: PermissionSection,
}

/// How the build toolchain is invoked.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSection {
    pub program: String,
    pub features: Vec<String>,
    /// Replaces the whole default argument list when present.
    pub args: Option<Vec<String>>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            features: vec![DEFAULT_FEATURE.to_string()],
            args: None,
        }
    }
}

/// How the output directory permissions are reset under `clear`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PermissionSection {
    pub directory: PathBuf,
    pub mode: String,
    pub program: String,
    pub elevate: bool,
}

impl Default for PermissionSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("target"),
            mode: "777".to_string(),
            program: "chmod".to_string(),
            elevate: true,
        }
    }
}

/// Project config at `root`, or the built-in defaults when no file exists.
pub fn load_runner_config(root: &Path) -> Result<RunnerConfig> {
    match load_runner_config_from_dir(root)? {
        Some(loaded) => {
            tracing::debug!(path = %loaded.path.display(), "loaded runner config");
            Ok(loaded.data)
        }
        None => Ok(RunnerConfig::default()),
    }
}

pub fn load_runner_config_from_dir(base_dir: &Path) -> Result<Option<LoadedRunnerConfig>> {
    for (file, format) in CONFIG_CANDIDATES {
        let path = base_dir.join(file);
        if !path.exists() {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading runner config at {}", path.display()))?;
        let data = match format {
            ConfigFormat::Yaml => parse_yaml_str(&content)
                .with_context(|| format!("parsing YAML config at {}", path.display()))?,
            ConfigFormat::Toml => parse_toml_str(&content)
                .with_context(|| format!("parsing TOML config at {}", path.display()))?,
        };
        return Ok(Some(LoadedRunnerConfig { path, data }));
    }
    Ok(None)
}

pub(crate) fn parse_yaml_str(content: &str) -> Result<RunnerConfig> {
    // An empty YAML document deserializes as unit, not as an empty map.
    if content.trim().is_empty() {
        return Ok(RunnerConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

pub(crate) fn parse_toml_str(content: &str) -> Result<RunnerConfig> {
    Ok(toml::from_str(content)?)
}
