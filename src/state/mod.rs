//! Persistent per-project state.
//!
//! State lives outside the project tree, under `$BITE_HOME` (default
//! `~/.bite`), in a directory named after the [`ProjectId`] hash.

pub mod playback;
pub mod project;

pub use playback::{PlaybackState, PlaybackStatus, StopRequest};
pub use project::ProjectId;

use std::path::PathBuf;

/// Environment variable that relocates the BITE home directory.
pub const HOME_ENV: &str = "BITE_HOME";

/// Root directory for global config and project state.
pub fn bite_home() -> PathBuf {
    match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".bite"),
    }
}

/// State directory for a project.
pub fn state_dir(project_id: &ProjectId) -> PathBuf {
    bite_home().join("projects").join(project_id.hash())
}

/// Write `content` to `path` atomically (write temp file, then rename).
pub(crate) fn write_atomic(path: &std::path::Path, content: &str) -> crate::error::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let temp_path = path.with_extension("yml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
