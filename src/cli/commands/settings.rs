//! Settings command implementation.
//!
//! The `bite settings` command lists, reads, and changes the per-project
//! settings that override configuration values during playback.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::args::{SettingsAction, SettingsArgs};
use crate::error::{BiteError, Result};
use crate::settings::{SettingsPage, SettingsStore, SettingsTab};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project_state_dir;

/// The settings command implementation.
pub struct SettingsCommand {
    project_root: PathBuf,
    state_dir: Option<PathBuf>,
    args: SettingsArgs,
}

impl SettingsCommand {
    /// Create a new settings command.
    pub fn new(project_root: &Path, args: SettingsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            state_dir: None,
            args,
        }
    }

    /// Keep settings in `dir` instead of the project state directory.
    pub fn with_state_dir(mut self, dir: &Path) -> Self {
        self.state_dir = Some(dir.to_path_buf());
        self
    }

    fn list(
        &self,
        ui: &mut dyn UserInterface,
        store: &SettingsStore,
        tab: Option<&str>,
    ) -> Result<CommandResult> {
        let tabs = match tab {
            Some(name) => match SettingsTab::by_name(name) {
                Some(tab) => vec![tab],
                None => {
                    ui.error(&format!(
                        "Unknown settings tab '{}' (expected one of: {})",
                        name,
                        SettingsTab::NAMES.join(", ")
                    ));
                    return Ok(CommandResult::failure(1));
                }
            },
            None => SettingsTab::all(),
        };

        for tab in tabs {
            let tab = tab.loaded(store)?;
            ui.show_header(tab.namespace());
            for def in tab.definitions() {
                let value = tab
                    .properties()
                    .get(def.key)
                    .map(String::as_str)
                    .unwrap_or("(unset)");
                ui.message(&format!("  {} = {}", def.key, value));
                ui.message(&format!("      {}", def.description));
            }
        }

        Ok(CommandResult::success())
    }

    fn set(&self, store: &mut SettingsStore, key: &str, value: &str) -> Result<()> {
        let mut tab = SettingsTab::for_key(key)?.loaded(store)?;
        let mut update = BTreeMap::new();
        update.insert(key.to_string(), value.to_string());
        tab.add_properties(update)?;
        tab.save_setting(store);
        Ok(())
    }
}

impl Command for SettingsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let state_dir = project_state_dir(&self.project_root, self.state_dir.as_deref())?;
        let mut store = SettingsStore::load_from(&state_dir)?;

        match &self.args.action {
            SettingsAction::List { tab } => self.list(ui, &store, tab.as_deref()),
            SettingsAction::Get { key } => {
                SettingsTab::for_key(key)?;
                match store.get(key) {
                    Some(value) => {
                        ui.message(value);
                        Ok(CommandResult::success())
                    }
                    None => {
                        ui.warning(&format!("{} is not set", key));
                        Ok(CommandResult::failure(1))
                    }
                }
            }
            SettingsAction::Set { key, value } => {
                match self.set(&mut store, key, value) {
                    Ok(()) => {}
                    Err(e @ BiteError::ConfigValidationError { .. }) => {
                        ui.error(&e.to_string());
                        return Ok(CommandResult::failure(1));
                    }
                    Err(e) => return Err(e),
                }
                store.save_to(&state_dir)?;
                ui.success(&format!("{} = {}", key, value));
                Ok(CommandResult::success())
            }
            SettingsAction::Unset { key } => {
                SettingsTab::for_key(key)?;
                if store.remove(key).is_some() {
                    store.save_to(&state_dir)?;
                    ui.success(&format!("Removed {}", key));
                } else {
                    ui.warning(&format!("{} was not set", key));
                }
                Ok(CommandResult::success())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn run(dir: &Path, action: SettingsAction, ui: &mut MockUI) -> Result<CommandResult> {
        SettingsCommand::new(dir, SettingsArgs { action })
            .with_state_dir(dir)
            .execute(ui)
    }

    fn set(key: &str, value: &str) -> SettingsAction {
        SettingsAction::Set {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn set_then_get() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = run(temp.path(), set("playback.max_attempts", "12"), &mut ui).unwrap();
        assert!(result.success);

        let mut ui = MockUI::new();
        let get = SettingsAction::Get {
            key: "playback.max_attempts".to_string(),
        };
        run(temp.path(), get, &mut ui).unwrap();
        assert_eq!(ui.messages(), &["12".to_string()]);
    }

    #[test]
    fn set_keeps_other_keys() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        run(temp.path(), set("playback.max_attempts", "12"), &mut ui).unwrap();
        run(temp.path(), set("display.output", "quiet"), &mut ui).unwrap();
        run(temp.path(), set("playback.capture_output", "false"), &mut ui).unwrap();

        let store = SettingsStore::load_from(temp.path()).unwrap();
        assert_eq!(store.get("playback.max_attempts"), Some("12"));
        assert_eq!(store.get("display.output"), Some("quiet"));
        assert_eq!(store.get("playback.capture_output"), Some("false"));
    }

    #[test]
    fn set_rejects_invalid_value() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = run(temp.path(), set("playback.max_attempts", "zero"), &mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("playback.max_attempts"));
        assert!(SettingsStore::load_from(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn unknown_key_is_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let err = run(temp.path(), set("sound.volume", "11"), &mut ui).unwrap_err();
        assert!(matches!(err, BiteError::UnknownSetting { .. }));
    }

    #[test]
    fn get_unknown_key_in_known_tab_is_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let get = SettingsAction::Get {
            key: "playback.bogus".to_string(),
        };

        let err = run(temp.path(), get, &mut ui).unwrap_err();
        assert!(matches!(err, BiteError::UnknownSetting { .. }));
    }

    #[test]
    fn get_unset_key_fails() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let get = SettingsAction::Get {
            key: "display.color".to_string(),
        };

        let result = run(temp.path(), get, &mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("display.color is not set"));
    }

    #[test]
    fn unset_removes_key() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        run(temp.path(), set("display.color", "false"), &mut ui).unwrap();

        let unset = SettingsAction::Unset {
            key: "display.color".to_string(),
        };
        run(temp.path(), unset, &mut ui).unwrap();

        assert!(ui.has_success("Removed display.color"));
        assert!(SettingsStore::load_from(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn list_one_tab() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        run(temp.path(), set("display.output", "verbose"), &mut ui).unwrap();

        let mut ui = MockUI::new();
        let list = SettingsAction::List {
            tab: Some("display".to_string()),
        };
        run(temp.path(), list, &mut ui).unwrap();

        assert_eq!(ui.headers(), &["display".to_string()]);
        assert!(ui.has_message("display.output = verbose"));
        assert!(ui.has_message("display.color = (unset)"));
    }

    #[test]
    fn list_all_tabs() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        run(temp.path(), SettingsAction::List { tab: None }, &mut ui).unwrap();

        assert_eq!(ui.headers(), &["playback".to_string(), "display".to_string()]);
    }

    #[test]
    fn list_unknown_tab_fails() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let list = SettingsAction::List {
            tab: Some("sound".to_string()),
        };

        let result = run(temp.path(), list, &mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("playback, display"));
    }
}
