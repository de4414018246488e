//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/codemark.toml` or `.codemark.toml`
//! 3. `{project}/pyproject.toml`, if it has a `[tool.codemark]` table
//! 4. `~/.codemark/config.toml` (global fallback)
//! 5. No config found → defaults
//!
//! The project directory is the reviewed path itself, or its parent when
//! a single file is reviewed.

use anyhow::{Context, Result};
use codemark_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// The `[tool.codemark]` table of the project's `pyproject.toml`.
    Pyproject(PathBuf),
    /// Loaded from the global config directory (`~/.codemark/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Pyproject(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if self.is_global() {
            tracing::info!("Using global config: {}", path.display());
        } else {
            tracing::debug!("Using config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["codemark.toml", ".codemark.toml"];

/// Python project metadata file that may carry a `[tool.codemark]` table.
const PYPROJECT_NAME: &str = "pyproject.toml";

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for a reviewed path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(&project_dir(target), explicit, global_config_dir())
}

fn project_dir(target: &Path) -> PathBuf {
    if target.is_file() {
        target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        target.to_path_buf()
    }
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    // 1. Explicit path from --config flag
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    // 2. Project-level config
    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    // 3. pyproject.toml with a [tool.codemark] table
    let pyproject = project_dir.join(PYPROJECT_NAME);
    if has_codemark_table(&pyproject) {
        tracing::debug!("Found [tool.codemark] in {}", pyproject.display());
        return ConfigSource::Pyproject(pyproject);
    }

    // 4. Global fallback
    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Whether a `pyproject.toml` exists and has a `[tool.codemark]` table.
///
/// An unparseable file is treated as having none.
fn has_codemark_table(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    match content.parse::<toml::Table>() {
        Ok(doc) => doc
            .get("tool")
            .and_then(|tool| tool.get("codemark"))
            .is_some(),
        Err(e) => {
            tracing::warn!("Ignoring unparseable {}: {}", path.display(), e);
            false
        }
    }
}

/// Returns the global config directory path.
///
/// Resolution: `$CODEMARK_CONFIG_DIR` > `~/.codemark/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("CODEMARK_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".codemark"))
}
