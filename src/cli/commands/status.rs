//! Status command implementation.
//!
//! The `bite status` command shows the last playback of this project.

use std::path::{Path, PathBuf};

use crate::cli::args::StatusArgs;
use crate::error::{BiteError, Result};
use crate::state::{PlaybackState, StopRequest};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{display, project_state_dir, EXIT_MISSING};

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    state_dir: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            state_dir: None,
            args,
        }
    }

    /// Read state from `dir` instead of the project state directory.
    pub fn with_state_dir(mut self, dir: &Path) -> Self {
        self.state_dir = Some(dir.to_path_buf());
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let state_dir = project_state_dir(&self.project_root, self.state_dir.as_deref())?;

        let Some(state) = PlaybackState::load_from(&state_dir)? else {
            ui.error("No playback recorded for this project. Run 'bite play <script>' first.");
            return Ok(CommandResult::failure(EXIT_MISSING));
        };

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&state).map_err(|e| BiteError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header("Playback status");
        display::show_playback_state(ui, &state);

        if StopRequest::in_dir(&state_dir).is_pending() {
            ui.warning("A stop request is pending");
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::Script;
    use crate::state::PlaybackStatus;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn saved_state(dir: &Path, status: PlaybackStatus) {
        let script =
            Script::from_source(Path::new("checkout.bite"), "a\nb".to_string()).unwrap();
        let mut state = PlaybackState::start(&script, 0);
        state.record_progress(1);
        state.finish(status, None);
        state.save_to(dir).unwrap();
    }

    #[test]
    fn status_command_creation() {
        let temp = TempDir::new().unwrap();
        let cmd = StatusCommand::new(temp.path(), StatusArgs::default());

        assert_eq!(cmd.project_root(), temp.path());
        assert!(!cmd.args().json);
    }

    #[test]
    fn status_without_state_exits_with_two() {
        let temp = TempDir::new().unwrap();
        let cmd = StatusCommand::new(temp.path(), StatusArgs::default()).with_state_dir(temp.path());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No playback recorded"));
    }

    #[test]
    fn status_shows_saved_state() {
        let temp = TempDir::new().unwrap();
        saved_state(temp.path(), PlaybackStatus::Cancelled);
        let cmd = StatusCommand::new(temp.path(), StatusArgs::default()).with_state_dir(temp.path());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("checkout.bite"));
        assert!(ui.has_warning("cancelled at step 2 of 2"));
    }

    #[test]
    fn status_json_is_parseable() {
        let temp = TempDir::new().unwrap();
        saved_state(temp.path(), PlaybackStatus::Failed);
        let cmd = StatusCommand::new(temp.path(), StatusArgs { json: true })
            .with_state_dir(temp.path());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["current_step"], 1);
    }

    #[test]
    fn status_mentions_pending_stop() {
        let temp = TempDir::new().unwrap();
        saved_state(temp.path(), PlaybackStatus::Running);
        StopRequest::in_dir(temp.path()).request().unwrap();
        let cmd = StatusCommand::new(temp.path(), StatusArgs::default()).with_state_dir(temp.path());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_warning("stop request is pending"));
    }
}
