//! Key/value settings and the settings tabs that own them.
//!
//! - [`SettingsStore`] - Per-project persisted key/value map
//! - [`SettingsPage`] - Capability shared by every settings tab
//! - [`SettingsTab`] - Selects one tab by name or key namespace

pub mod store;
pub mod tabs;

pub use store::SettingsStore;
pub use tabs::{parse_bool, DisplayTab, PlaybackTab, SettingDef, SettingsPage, SettingsTab};
