//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! various locations in the correct priority order.

use crate::config::merger::merge_configs;
use crate::config::schema::BiteConfig;
use crate::error::{BiteError, Result};
use crate::state::bite_home;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project configuration.
pub const PROJECT_DIR: &str = ".bite";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.bite/config.yml`)
/// 2. Project config (`.bite/config.yml`)
/// 3. Local overrides (`.bite/config.local.yml`)
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User's global config: ~/.bite/config.yml
    pub user_global: Option<PathBuf>,

    /// Project config: .bite/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .bite/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self::discover_with_home(project_root, &bite_home())
    }

    /// Discover config files using an explicit home directory for the global layer.
    pub fn discover_with_home(project_root: &Path, home: &Path) -> Self {
        let project_dir = project_root.join(PROJECT_DIR);
        Self {
            user_global: existing(home.join("config.yml")),
            project: existing(project_dir.join("config.yml")),
            project_local: existing(project_dir.join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Check if any project config exists.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some() || self.project_local.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. `.bite` directory (primary indicator)
/// 2. `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BiteError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BiteError::Io(e)
        }
    })
}

/// Load a single config file and parse it into [`BiteConfig`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<BiteConfig> {
    let content = read_config(path)?;
    parse_config(&content, path)
}

/// Parse YAML content into [`BiteConfig`]. An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<BiteConfig> {
    if content.trim().is_empty() {
        return Ok(BiteConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| BiteError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_config(path)?;
    serde_yaml::from_str(&content).map_err(|e| BiteError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge the files named by `paths` into a validated config.
pub fn load_from_paths(paths: &ConfigPaths) -> Result<BiteConfig> {
    let layers = paths
        .all_existing()
        .into_iter()
        .map(|path| load_config_value(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_configs(&layers);
    let source = paths
        .all_existing()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    let config: BiteConfig =
        serde_yaml::from_value(merged).map_err(|e| BiteError::ConfigParseError {
            path: source,
            message: format!("Failed to parse merged config: {}", e),
        })?;
    config.validate()?;
    Ok(config)
}

/// Load and merge all config files for a project.
///
/// Configuration is optional: with no files the defaults apply.
pub fn load_merged_config(project_root: &Path) -> Result<BiteConfig> {
    let paths = ConfigPaths::discover(project_root);
    tracing::debug!(files = paths.all_existing().len(), "loading configuration");
    load_from_paths(&paths)
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<BiteConfig> {
    match config_override {
        Some(path) => {
            let config = load_config_file(path)?;
            config.validate()?;
            Ok(config)
        }
        None => load_merged_config(project_root),
    }
}
