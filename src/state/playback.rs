//! Playback progress and stop requests.
//!
//! [`PlaybackState`] records how far the last run got so `bite play --resume`
//! can continue from the right step, and `bite status` can report it.
//! [`StopRequest`] is a marker file another process creates to ask a
//! running playback to stop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BiteError, Result};
use crate::playback::Script;

use super::{state_dir, write_atomic, ProjectId};

/// Outcome of the last playback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Running,
    Completed,
    Failed,
    Unresponsive,
    Cancelled,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unresponsive => "unresponsive",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Persisted progress of the most recent playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Schema version for migration.
    pub version: u32,

    /// Script that was played.
    pub script: PathBuf,

    /// Fingerprint of the script's commands.
    pub fingerprint: String,

    /// Next step to dispatch.
    pub current_step: usize,

    /// Number of steps in the script.
    pub total_steps: usize,

    /// Status of the run.
    pub status: PlaybackStatus,

    /// Error that ended the run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the state was last written.
    pub updated_at: DateTime<Utc>,
}

impl PlaybackState {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// File name inside the project state directory.
    pub const FILE_NAME: &'static str = "playback.yml";

    /// Start tracking a run of `script` at `start_step`.
    pub fn start(script: &Script, start_step: usize) -> Self {
        let now = Utc::now();
        Self {
            version: Self::CURRENT_VERSION,
            script: script.path().to_path_buf(),
            fingerprint: script.fingerprint().to_string(),
            current_step: start_step,
            total_steps: script.steps().len(),
            status: PlaybackStatus::Running,
            last_error: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Record that every step before `next_step` has been acknowledged.
    pub fn record_progress(&mut self, next_step: usize) {
        self.current_step = next_step;
        self.updated_at = Utc::now();
    }

    /// Mark the run as ended.
    pub fn finish(&mut self, status: PlaybackStatus, error: Option<String>) {
        self.status = status;
        self.last_error = error;
        self.updated_at = Utc::now();
    }

    /// Step to resume from, if this state belongs to the same script and
    /// the run did not complete.
    pub fn resume_index(&self, fingerprint: &str) -> Option<usize> {
        if self.fingerprint != fingerprint
            || self.status == PlaybackStatus::Completed
            || self.current_step >= self.total_steps
        {
            return None;
        }
        Some(self.current_step)
    }

    /// State file path inside `dir`.
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(Self::FILE_NAME)
    }

    /// Load state from `dir`. Returns `None` if nothing has been played yet.
    pub fn load_from(dir: &Path) -> Result<Option<Self>> {
        let path = Self::file_path(dir);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let state = serde_yaml::from_str(&content).map_err(|e| BiteError::ConfigParseError {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(state))
    }

    /// Save state to `dir` using an atomic write.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| BiteError::ConfigValidationError {
                message: format!("Failed to serialize playback state: {}", e),
            })?;
        write_atomic(&Self::file_path(dir), &content)
    }

    /// Load state for a project.
    pub fn load(project_id: &ProjectId) -> Result<Option<Self>> {
        Self::load_from(&state_dir(project_id))
    }

    /// Save state for a project.
    pub fn save(&self, project_id: &ProjectId) -> Result<()> {
        self.save_to(&state_dir(project_id))
    }
}

/// Marker file asking a running playback to stop.
#[derive(Debug, Clone)]
pub struct StopRequest {
    path: PathBuf,
}

impl StopRequest {
    /// File name inside the project state directory.
    pub const FILE_NAME: &'static str = "stop";

    /// Stop request stored in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(Self::FILE_NAME),
        }
    }

    /// Stop request for a project.
    pub fn for_project(project_id: &ProjectId) -> Self {
        Self::in_dir(&state_dir(project_id))
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ask the running playback to stop.
    pub fn request(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, Utc::now().to_rfc3339())?;
        Ok(())
    }

    /// Whether a stop has been requested.
    pub fn is_pending(&self) -> bool {
        self.path.exists()
    }

    /// Consume a pending request. Returns whether one was pending.
    pub fn take(&self) -> bool {
        fs::remove_file(&self.path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn script(text: &str) -> Script {
        Script::from_source(Path::new("flow.bite"), text.to_string()).unwrap()
    }

    #[test]
    fn start_tracks_script() {
        let s = script("a\nb\nc\n");
        let state = PlaybackState::start(&s, 1);

        assert_eq!(state.total_steps, 3);
        assert_eq!(state.current_step, 1);
        assert_eq!(state.status, PlaybackStatus::Running);
        assert_eq!(state.fingerprint, s.fingerprint());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut state = PlaybackState::start(&script("a\nb\n"), 0);
        state.record_progress(1);
        state.finish(PlaybackStatus::Failed, Some("boom".to_string()));

        state.save_to(temp.path()).unwrap();
        let loaded = PlaybackState::load_from(temp.path()).unwrap().unwrap();

        assert_eq!(loaded, state);
        assert!(!PlaybackState::file_path(temp.path())
            .with_extension("yml.tmp")
            .exists());
    }

    #[test]
    fn load_missing_returns_none() {
        let temp = TempDir::new().unwrap();
        assert!(PlaybackState::load_from(temp.path()).unwrap().is_none());
    }

    #[test]
    fn load_corrupt_state_is_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(PlaybackState::file_path(temp.path()), "status: [").unwrap();

        let err = PlaybackState::load_from(temp.path()).unwrap_err();
        assert!(matches!(err, BiteError::ConfigParseError { .. }));
    }

    #[test]
    fn resume_index_requires_matching_fingerprint() {
        let s = script("a\nb\nc\n");
        let mut state = PlaybackState::start(&s, 0);
        state.record_progress(2);
        state.finish(PlaybackStatus::Failed, None);

        assert_eq!(state.resume_index(s.fingerprint()), Some(2));
        assert_eq!(state.resume_index("0000000000000000"), None);
    }

    #[test]
    fn completed_run_does_not_resume() {
        let s = script("a\n");
        let mut state = PlaybackState::start(&s, 0);
        state.record_progress(1);
        state.finish(PlaybackStatus::Completed, None);

        assert_eq!(state.resume_index(s.fingerprint()), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        let yaml = serde_yaml::to_string(&PlaybackStatus::Unresponsive).unwrap();
        assert!(yaml.contains("unresponsive"));
        assert_eq!(PlaybackStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn stop_request_lifecycle() {
        let temp = TempDir::new().unwrap();
        let stop = StopRequest::in_dir(&temp.path().join("state"));

        assert!(!stop.is_pending());
        assert!(!stop.take());

        stop.request().unwrap();
        assert!(stop.is_pending());

        assert!(stop.take());
        assert!(!stop.is_pending());
    }
}
