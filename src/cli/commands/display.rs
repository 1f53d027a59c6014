//! Shared display helpers.
//!
//! Output preferences are resolved before the UI exists: explicit flags win,
//! then the `display.*` settings, then the configuration default. Playback
//! state rendering is shared by `status` and `play`.

use std::path::Path;

use crate::config::load_config;
use crate::settings::{parse_bool, DisplayTab, SettingsStore};
use crate::state::{PlaybackState, PlaybackStatus, ProjectId};
use crate::ui::{OutputMode, UserInterface};

/// Resolved terminal output preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPreferences {
    pub mode: OutputMode,
    pub color: bool,
}

/// Work out the output mode and color preference for this invocation.
///
/// Unreadable configuration or settings fall back to the defaults; the
/// command itself reports those errors.
pub fn resolve_display(
    project_root: &Path,
    config_override: Option<&Path>,
    verbose: bool,
    quiet: bool,
) -> DisplayPreferences {
    let store = ProjectId::from_path(project_root)
        .and_then(|id| SettingsStore::load(&id))
        .unwrap_or_else(|e| {
            tracing::debug!("settings unavailable for display: {}", e);
            SettingsStore::default()
        });

    let configured = || {
        load_config(project_root, config_override)
            .map(|config| OutputMode::from(config.settings.default_output))
            .unwrap_or_default()
    };

    preferences(&store, verbose, quiet, configured)
}

fn preferences(
    store: &SettingsStore,
    verbose: bool,
    quiet: bool,
    configured: impl FnOnce() -> OutputMode,
) -> DisplayPreferences {
    let mode = if quiet {
        OutputMode::Quiet
    } else if verbose {
        OutputMode::Verbose
    } else {
        store
            .get(DisplayTab::OUTPUT)
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(configured)
    };

    let color = store
        .get(DisplayTab::COLOR)
        .and_then(parse_bool)
        .unwrap_or(true);

    DisplayPreferences { mode, color }
}

/// Bracketed symbol for a playback status (non-TTY output).
pub fn status_symbol(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Running => "[running]",
        PlaybackStatus::Completed => "[ok]",
        PlaybackStatus::Failed => "[FAIL]",
        PlaybackStatus::Unresponsive => "[stalled]",
        PlaybackStatus::Cancelled => "[stopped]",
    }
}

/// Print a playback state, styled by status.
pub fn show_playback_state(ui: &mut dyn UserInterface, state: &PlaybackState) {
    ui.message(&format!("Script:  {}", state.script.display()));
    ui.message(&format!(
        "Updated: {}",
        state.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let line = format!(
        "{} {} at step {} of {}",
        status_symbol(state.status),
        state.status,
        (state.current_step + 1).min(state.total_steps),
        state.total_steps
    );
    match state.status {
        PlaybackStatus::Completed => ui.success(&line),
        PlaybackStatus::Failed | PlaybackStatus::Unresponsive => ui.error(&line),
        PlaybackStatus::Cancelled => ui.warning(&line),
        PlaybackStatus::Running => ui.message(&line),
    }

    if let Some(error) = &state.last_error {
        ui.message(&format!("Last error: {}", error));
    }
}
