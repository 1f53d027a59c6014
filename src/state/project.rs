//! Project identification.
//!
//! A project is the directory a script is played from. Its identity is a
//! SHA-256 hash of the canonical path plus the git remote (when there is
//! one), so clones of the same repository at different paths keep
//! separate playback state.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Unique identifier for a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId {
    hash: String,
    path: PathBuf,
    git_remote: Option<String>,
}

impl ProjectId {
    /// Identify the project rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized (e.g., doesn't exist).
    pub fn from_path(path: &Path) -> Result<Self> {
        let path = path.canonicalize()?;
        let git_remote = detect_git_remote(&path);
        let hash = compute_hash(&path, git_remote.as_deref());

        Ok(Self {
            hash,
            path,
            git_remote,
        })
    }

    /// 16-character hex hash, used as the state directory name.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Canonical project path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Git `origin` URL, if the project is a git checkout.
    pub fn git_remote(&self) -> Option<&str> {
        self.git_remote.as_deref()
    }

    /// Directory name, for display.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

fn detect_git_remote(path: &Path) -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(path)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let url = String::from_utf8(output.stdout).ok()?;
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

fn compute_hash(path: &Path, git_remote: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    if let Some(remote) = git_remote {
        hasher.update(remote.as_bytes());
    }
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
