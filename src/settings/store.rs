//! Settings persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BiteError, Result};
use crate::state::{state_dir, write_atomic, ProjectId};

/// Saved settings for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsStore {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl SettingsStore {
    /// File name inside the project state directory.
    pub const FILE_NAME: &'static str = "settings.yml";

    /// Get a saved value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Save a value, replacing any previous one.
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Remove a value. Returns the previous value, if any.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// All saved entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether nothing has been saved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Settings file path inside `dir`.
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(Self::FILE_NAME)
    }

    /// Load settings from `dir`. A missing file yields empty settings.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = Self::file_path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content).map_err(|e| BiteError::ConfigParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Save settings to `dir` using an atomic write.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| BiteError::ConfigValidationError {
                message: format!("Failed to serialize settings: {}", e),
            })?;
        write_atomic(&Self::file_path(dir), &content)
    }

    /// Load settings for a project.
    pub fn load(project_id: &ProjectId) -> Result<Self> {
        Self::load_from(&state_dir(project_id))
    }

    /// Save settings for a project.
    pub fn save(&self, project_id: &ProjectId) -> Result<()> {
        self.save_to(&state_dir(project_id))
    }
}
