//! Stop command implementation.
//!
//! The `bite stop` command leaves a stop request for the running playback,
//! which cancels at its next readiness check.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::{PlaybackState, PlaybackStatus, StopRequest};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project_state_dir;

/// The stop command implementation.
pub struct StopCommand {
    project_root: PathBuf,
    state_dir: Option<PathBuf>,
}

impl StopCommand {
    /// Create a new stop command.
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            state_dir: None,
        }
    }

    /// Write the request into `dir` instead of the project state directory.
    pub fn with_state_dir(mut self, dir: &Path) -> Self {
        self.state_dir = Some(dir.to_path_buf());
        self
    }
}

impl Command for StopCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let state_dir = project_state_dir(&self.project_root, self.state_dir.as_deref())?;

        let running = PlaybackState::load_from(&state_dir)?
            .is_some_and(|state| state.status == PlaybackStatus::Running);
        if !running {
            ui.warning("No playback is running; the next playback will clear this request");
        }

        StopRequest::in_dir(&state_dir).request()?;
        ui.success("Stop requested");
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::Script;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn stop_writes_request() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = StopCommand::new(temp.path())
            .with_state_dir(temp.path())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(StopRequest::in_dir(temp.path()).is_pending());
        assert!(ui.has_success("Stop requested"));
    }

    #[test]
    fn stop_warns_when_nothing_runs() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        StopCommand::new(temp.path())
            .with_state_dir(temp.path())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_warning("No playback is running"));
    }

    #[test]
    fn stop_is_quiet_about_running_playback() {
        let temp = TempDir::new().unwrap();
        let script = Script::from_source(Path::new("flow.bite"), "a".to_string()).unwrap();
        PlaybackState::start(&script, 0).save_to(temp.path()).unwrap();
        let mut ui = MockUI::new();

        StopCommand::new(temp.path())
            .with_state_dir(temp.path())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.warnings().is_empty());
    }
}
