//! Play command implementation.
//!
//! The `bite play` command plays a script against the target.

use std::path::{Path, PathBuf};

use crate::cli::args::PlayArgs;
use crate::config::load_config;
use crate::error::{BiteError, Result};
use crate::playback::Script;
use crate::runner::{PlayOptions, PlaybackSettings, PlaybackSummary, Player};
use crate::settings::SettingsStore;
use crate::state::PlaybackStatus;
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::{project_state_dir, EXIT_CANCELLED, EXIT_MISSING};

/// The play command implementation.
pub struct PlayCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    state_dir: Option<PathBuf>,
    args: PlayArgs,
}

impl PlayCommand {
    /// Create a new play command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: PlayArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            state_dir: None,
            args,
        }
    }

    /// Keep playback state and settings in `dir` instead of the project state directory.
    pub fn with_state_dir(mut self, dir: &Path) -> Self {
        self.state_dir = Some(dir.to_path_buf());
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn args(&self) -> &PlayArgs {
        &self.args
    }

    /// Script path, relative paths taken from the project root.
    fn script_path(&self) -> PathBuf {
        if self.args.script.is_absolute() {
            self.args.script.clone()
        } else {
            self.project_root.join(&self.args.script)
        }
    }

    fn options(&self) -> PlayOptions {
        PlayOptions {
            from: self.args.start_index(),
            resume: self.args.resume,
            dry_run: self.args.dry_run,
            max_attempts: self.args.max_attempts,
            interval_ms: self.args.interval_ms,
        }
    }

    fn report(&self, ui: &mut dyn UserInterface, summary: &PlaybackSummary) -> CommandResult {
        let resume_hint = format!(
            "Resume with 'bite play {} --resume'",
            self.args.script.display()
        );

        match summary.status {
            PlaybackStatus::Completed => {
                ui.success(&format!(
                    "Played {} of {} steps in {}",
                    summary.dispatched,
                    summary.total_steps,
                    format_duration(summary.duration)
                ));
                if summary.skipped > 0 {
                    ui.warning(&format!("{} step(s) skipped", summary.skipped));
                }
                CommandResult::success()
            }
            PlaybackStatus::Cancelled => {
                ui.warning(&format!(
                    "Stopped at step {} of {}",
                    summary.current_step + 1,
                    summary.total_steps
                ));
                if !self.args.dry_run {
                    ui.message(&resume_hint);
                }
                CommandResult::failure(EXIT_CANCELLED)
            }
            _ => {
                ui.error(&format!(
                    "Playback {} at step {} of {}",
                    summary.status,
                    summary.current_step + 1,
                    summary.total_steps
                ));
                if !self.args.dry_run {
                    ui.message(&resume_hint);
                }
                CommandResult::failure(1)
            }
        }
    }
}

impl Command for PlayCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_config(&self.project_root, self.config_override.as_deref()) {
            Ok(c) => c,
            Err(BiteError::ConfigNotFound { path }) => {
                ui.error(&format!("Configuration not found: {}", path.display()));
                return Ok(CommandResult::failure(EXIT_MISSING));
            }
            Err(e) => return Err(e),
        };

        let state_dir = project_state_dir(&self.project_root, self.state_dir.as_deref())?;
        let store = SettingsStore::load_from(&state_dir)?;
        let settings = PlaybackSettings::resolve(&config, &store)?;

        let script = Script::load(&self.script_path())?;

        let app_name = config.app_name.as_deref().unwrap_or("BITE");
        ui.show_header(&format!("{} - {}", app_name, self.args.script.display()));
        if self.args.dry_run {
            ui.message("Dry run: nothing will be executed");
        }

        let player = Player::new(&self.project_root, &state_dir, settings);
        let summary = player.play(ui, &script, &self.options())?;

        Ok(self.report(ui, &summary))
    }
}
