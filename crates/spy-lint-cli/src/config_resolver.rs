//! Configuration file resolution.
//!
//! Resolves the configuration file path in priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `spy-lint.toml` or `.spy-lint.toml` in the working directory
//! 3. No config found → defaults

use anyhow::{Context, Result};
use spy_lint_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the working directory.
    Project(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["spy-lint.toml", ".spy-lint.toml"];

/// Resolves the configuration file path.
///
/// An explicit path is returned as-is; a missing file surfaces when loading.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    ConfigSource::Default
}

/// Loads the configuration a [`ConfigSource`] points at.
pub fn load(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        tracing::debug!("No config file found, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Using config: {}", path.display());
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}
