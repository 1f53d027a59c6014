//! Output verbosity.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::schema::OutputMode as ConfigOutputMode;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including dispatched command output.
    Verbose,
    /// Show progress and status.
    #[default]
    Normal,
    /// Show spinners and the final status only.
    Quiet,
    /// Show nothing except errors.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Verbose => "verbose",
            Self::Normal => "normal",
            Self::Quiet => "quiet",
            Self::Silent => "silent",
        };
        write!(f, "{}", s)
    }
}

impl From<ConfigOutputMode> for OutputMode {
    fn from(mode: ConfigOutputMode) -> Self {
        match mode {
            ConfigOutputMode::Verbose => Self::Verbose,
            ConfigOutputMode::Normal => Self::Normal,
            ConfigOutputMode::Quiet => Self::Quiet,
            ConfigOutputMode::Silent => Self::Silent,
        }
    }
}

impl OutputMode {
    /// Whether dispatched command output is echoed.
    pub fn shows_command_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether spinners are drawn.
    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Whether per-step progress lines are printed.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Whether status messages are printed.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}

/// Format a duration for humans: `850ms`, `2.4s`, `1m 05s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
