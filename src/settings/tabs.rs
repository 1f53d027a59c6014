//! Settings tabs.
//!
//! Each tab owns a namespace of keys (`playback.*`, `display.*`) and shares
//! one small capability, [`SettingsPage`]. Tabs are independent structs;
//! [`SettingsTab`] picks one by name or by key.

use std::collections::BTreeMap;

use crate::error::{BiteError, Result};
use crate::ui::OutputMode;

use super::SettingsStore;

/// Description of one setting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDef {
    /// Fully-qualified key, e.g. `playback.max_attempts`.
    pub key: &'static str,

    /// One-line description for `bite settings list`.
    pub description: &'static str,
}

/// Capability shared by every settings tab.
pub trait SettingsPage {
    /// Namespace prefix of this tab's keys.
    fn namespace(&self) -> &'static str;

    /// Keys this tab owns.
    fn definitions(&self) -> &'static [SettingDef];

    /// Current properties.
    fn properties(&self) -> &BTreeMap<String, String>;

    /// Check that `value` is acceptable for `key`.
    fn validate(&self, key: &str, value: &str) -> Result<()>;

    /// Replace every property.
    fn set_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()>;

    /// Merge properties into the current ones.
    fn add_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()>;

    /// Write this tab's properties into `store`.
    fn save_setting(&self, store: &mut SettingsStore) {
        for (key, value) in self.properties() {
            store.set(key, value);
        }
    }

    /// Read every key this tab owns from `store`.
    fn load_setting(&mut self, store: &SettingsStore) -> Result<()> {
        let loaded = self
            .definitions()
            .iter()
            .filter_map(|def| store.get(def.key).map(|v| (def.key.to_string(), v.to_string())))
            .collect();
        self.set_properties(loaded)
    }

    /// Whether `key` belongs to this tab.
    fn owns(&self, key: &str) -> bool {
        self.definitions().iter().any(|def| def.key == key)
    }
}

/// Check every property against the tab before applying it.
fn checked(
    page: &dyn SettingsPage,
    properties: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>> {
    for (key, value) in &properties {
        if !page.owns(key) {
            return Err(BiteError::UnknownSetting { key: key.clone() });
        }
        page.validate(key, value)?;
    }
    Ok(properties)
}

fn invalid(key: &str, value: &str, expected: &str) -> BiteError {
    BiteError::ConfigValidationError {
        message: format!("{} must be {} (got '{}')", key, expected, value),
    }
}

fn validate_positive(key: &str, value: &str) -> Result<()> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(invalid(key, value, "a positive integer")),
    }
}

fn validate_bool(key: &str, value: &str) -> Result<()> {
    parse_bool(value)
        .map(|_| ())
        .ok_or_else(|| invalid(key, value, "true or false"))
}

/// Parse a boolean setting value.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Playback timing and dispatch settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackTab {
    properties: BTreeMap<String, String>,
}

impl PlaybackTab {
    pub const POLL_INTERVAL_MS: &'static str = "playback.poll_interval_ms";
    pub const MAX_ATTEMPTS: &'static str = "playback.max_attempts";
    pub const CAPTURE_OUTPUT: &'static str = "playback.capture_output";
    pub const READY_FILE: &'static str = "playback.ready_file";

    const DEFINITIONS: &'static [SettingDef] = &[
        SettingDef {
            key: Self::POLL_INTERVAL_MS,
            description: "Delay between readiness checks, in milliseconds",
        },
        SettingDef {
            key: Self::MAX_ATTEMPTS,
            description: "Readiness checks before the target counts as unresponsive",
        },
        SettingDef {
            key: Self::CAPTURE_OUTPUT,
            description: "Capture command output instead of streaming it",
        },
        SettingDef {
            key: Self::READY_FILE,
            description: "File whose presence marks the target ready",
        },
    ];
}

impl SettingsPage for PlaybackTab {
    fn namespace(&self) -> &'static str {
        "playback"
    }

    fn definitions(&self) -> &'static [SettingDef] {
        Self::DEFINITIONS
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    fn validate(&self, key: &str, value: &str) -> Result<()> {
        match key {
            Self::POLL_INTERVAL_MS | Self::MAX_ATTEMPTS => validate_positive(key, value),
            Self::CAPTURE_OUTPUT => validate_bool(key, value),
            Self::READY_FILE if value.trim().is_empty() => Err(invalid(key, value, "a path")),
            _ => Ok(()),
        }
    }

    fn set_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()> {
        self.properties = checked(&*self, properties)?;
        Ok(())
    }

    fn add_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()> {
        let properties = checked(&*self, properties)?;
        self.properties.extend(properties);
        Ok(())
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayTab {
    properties: BTreeMap<String, String>,
}

impl DisplayTab {
    pub const OUTPUT: &'static str = "display.output";
    pub const COLOR: &'static str = "display.color";

    const DEFINITIONS: &'static [SettingDef] = &[
        SettingDef {
            key: Self::OUTPUT,
            description: "Output mode: verbose, normal, quiet or silent",
        },
        SettingDef {
            key: Self::COLOR,
            description: "Use colored output",
        },
    ];
}

impl SettingsPage for DisplayTab {
    fn namespace(&self) -> &'static str {
        "display"
    }

    fn definitions(&self) -> &'static [SettingDef] {
        Self::DEFINITIONS
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    fn validate(&self, key: &str, value: &str) -> Result<()> {
        match key {
            Self::OUTPUT => value
                .parse::<OutputMode>()
                .map(|_| ())
                .map_err(|_| invalid(key, value, "verbose, normal, quiet or silent")),
            Self::COLOR => validate_bool(key, value),
            _ => Ok(()),
        }
    }

    fn set_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()> {
        self.properties = checked(&*self, properties)?;
        Ok(())
    }

    fn add_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()> {
        let properties = checked(&*self, properties)?;
        self.properties.extend(properties);
        Ok(())
    }
}

/// One settings tab, selected by name or key namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsTab {
    Playback(PlaybackTab),
    Display(DisplayTab),
}

impl SettingsTab {
    /// Tab names accepted by [`by_name`](Self::by_name).
    pub const NAMES: &'static [&'static str] = &["playback", "display"];

    /// Every tab, empty.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Playback(PlaybackTab::default()),
            Self::Display(DisplayTab::default()),
        ]
    }

    /// Select a tab by name.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|tab| tab.namespace() == name)
    }

    /// Select the tab that owns `key`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSetting` if no tab owns the key.
    pub fn for_key(key: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|tab| tab.owns(key))
            .ok_or_else(|| BiteError::UnknownSetting {
                key: key.to_string(),
            })
    }

    /// Load the tab's current properties from `store`.
    pub fn loaded(mut self, store: &SettingsStore) -> Result<Self> {
        self.load_setting(store)?;
        Ok(self)
    }

    fn page(&self) -> &dyn SettingsPage {
        match self {
            Self::Playback(tab) => tab,
            Self::Display(tab) => tab,
        }
    }

    fn page_mut(&mut self) -> &mut dyn SettingsPage {
        match self {
            Self::Playback(tab) => tab,
            Self::Display(tab) => tab,
        }
    }
}

impl SettingsPage for SettingsTab {
    fn namespace(&self) -> &'static str {
        self.page().namespace()
    }

    fn definitions(&self) -> &'static [SettingDef] {
        self.page().definitions()
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        self.page().properties()
    }

    fn validate(&self, key: &str, value: &str) -> Result<()> {
        self.page().validate(key, value)
    }

    fn set_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()> {
        self.page_mut().set_properties(properties)
    }

    fn add_properties(&mut self, properties: BTreeMap<String, String>) -> Result<()> {
        self.page_mut().add_properties(properties)
    }
}
