//! Readiness checks for the playback target.
//!
//! Before each command is dispatched the sequencer asks a
//! [`ReadinessProbe`] whether the target can accept it. Configured checks
//! are expressed as [`ReadinessCheck`] values and evaluated by [`CheckProbe`].

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::shell::execute_check;
use crate::sync::Barrier;

/// Answers whether the target can accept the next command.
pub trait ReadinessProbe {
    /// Check readiness once. Called repeatedly by the poll timer.
    fn is_ready(&mut self) -> bool;
}

impl<F> ReadinessProbe for F
where
    F: FnMut() -> bool,
{
    fn is_ready(&mut self) -> bool {
        self()
    }
}

/// A configured readiness condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReadinessCheck {
    /// The target is always ready.
    #[default]
    Always,

    /// Ready when a file or directory exists.
    FileExists {
        /// Path to check (relative to project root)
        path: String,
    },

    /// Ready when a file or directory is absent (e.g. a lock file).
    FileMissing {
        /// Path to check (relative to project root)
        path: String,
    },

    /// Ready when a command exits with code 0.
    CommandSucceeds {
        /// Command to run
        command: String,
    },

    /// Every check must pass.
    All {
        /// Checks that must all pass
        checks: Vec<ReadinessCheck>,
    },

    /// At least one check must pass.
    Any {
        /// Checks where one passing is sufficient
        checks: Vec<ReadinessCheck>,
    },
}

impl ReadinessCheck {
    /// Short description for progress output.
    pub fn describe(&self) -> String {
        match self {
            Self::Always => "always ready".to_string(),
            Self::FileExists { path } => format!("file exists: {}", path),
            Self::FileMissing { path } => format!("file missing: {}", path),
            Self::CommandSucceeds { command } => format!("command succeeds: {}", command),
            Self::All { checks } => format!("all of {} checks", checks.len()),
            Self::Any { checks } => format!("any of {} checks", checks.len()),
        }
    }

    /// Whether this check or a nested one is an `any` group with no
    /// children. Such a group can never pass.
    pub fn has_empty_any(&self) -> bool {
        match self {
            Self::Any { checks } if checks.is_empty() => true,
            Self::All { checks } | Self::Any { checks } => {
                checks.iter().any(Self::has_empty_any)
            }
            _ => false,
        }
    }
}

/// Evaluate a readiness check once.
pub fn check_ready(check: &ReadinessCheck, project_root: &Path) -> bool {
    match check {
        ReadinessCheck::Always => true,
        ReadinessCheck::FileExists { path } => resolve(path, project_root).exists(),
        ReadinessCheck::FileMissing { path } => !resolve(path, project_root).exists(),
        ReadinessCheck::CommandSucceeds { command } => execute_check(command, Some(project_root)),
        ReadinessCheck::All { checks } => check_all(checks, project_root),
        ReadinessCheck::Any { checks } => checks.iter().any(|c| check_ready(c, project_root)),
    }
}

/// Every child must fire the barrier before the group counts as ready.
fn check_all(checks: &[ReadinessCheck], project_root: &Path) -> bool {
    let ready = Cell::new(false);
    let count = isize::try_from(checks.len()).unwrap_or(isize::MAX);
    let mut barrier = Barrier::with_count(|| ready.set(true), count);

    if checks.is_empty() {
        barrier.fire();
    }

    for check in checks {
        if !check_ready(check, project_root) {
            tracing::debug!(check = %check.describe(), "readiness check not met");
            break;
        }
        barrier.fire();
    }

    ready.get()
}

fn resolve(path: &str, project_root: &Path) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        project_root.join(path)
    }
}

/// A [`ReadinessProbe`] backed by a configured [`ReadinessCheck`].
#[derive(Debug, Clone)]
pub struct CheckProbe {
    check: ReadinessCheck,
    project_root: PathBuf,
}

impl CheckProbe {
    /// Create a probe that evaluates `check` relative to `project_root`.
    pub fn new(check: ReadinessCheck, project_root: &Path) -> Self {
        Self {
            check,
            project_root: project_root.to_path_buf(),
        }
    }

    /// The check this probe evaluates.
    pub fn check(&self) -> &ReadinessCheck {
        &self.check
    }
}

impl ReadinessProbe for CheckProbe {
    fn is_ready(&mut self) -> bool {
        check_ready(&self.check, &self.project_root)
    }
}
