//! Configuration schema.
//!
//! Maps the `.bite/config.yml` file format onto typed structs.
//!
//! ```yaml
//! app_name: Storefront
//! settings:
//!   default_output: normal
//! playback:
//!   poll_interval_ms: 250
//!   max_attempts: 40
//!   capture_output: true
//!   env:
//!     BASE_URL: http://localhost:3000
//!   ready:
//!     type: file_exists
//!     path: tmp/page.ready
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BiteError, Result};
use crate::playback::{PollPolicy, ReadinessCheck};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiteConfig {
    /// Application name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Global settings
    pub settings: Settings,

    /// Playback behaviour
    pub playback: PlaybackConfig,
}

impl BiteConfig {
    /// Reject values that would make playback meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.playback.poll_interval_ms == 0 {
            return Err(BiteError::ConfigValidationError {
                message: "playback.poll_interval_ms must be greater than 0".to_string(),
            });
        }
        if self.playback.max_attempts == 0 {
            return Err(BiteError::ConfigValidationError {
                message: "playback.max_attempts must be greater than 0".to_string(),
            });
        }
        if self.playback.ready.has_empty_any() {
            return Err(BiteError::ConfigValidationError {
                message: "playback.ready: an `any` check needs at least one entry".to_string(),
            });
        }
        Ok(())
    }
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output mode
    pub default_output: OutputMode,
}

/// Output mode as written in config files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay between readiness checks, in milliseconds
    pub poll_interval_ms: u64,

    /// Readiness checks before the target counts as unresponsive
    pub max_attempts: u32,

    /// Readiness condition checked before every command
    pub ready: ReadinessCheck,

    /// Environment variables for every dispatched command
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Capture command output instead of streaming it
    pub capture_output: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            poll_interval_ms: policy.interval.as_millis() as u64,
            max_attempts: policy.max_attempts,
            ready: ReadinessCheck::Always,
            env: HashMap::new(),
            capture_output: true,
        }
    }
}
