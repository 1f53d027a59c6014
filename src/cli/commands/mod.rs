//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::{state_dir, ProjectId};

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod play;
pub mod settings;
pub mod status;
pub mod stop;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use display::{resolve_display, DisplayPreferences};

/// Exit code for a missing configuration file or playback state.
pub const EXIT_MISSING: i32 = 2;

/// Exit code for a playback stopped by `bite stop`.
pub const EXIT_CANCELLED: i32 = 130;

/// State directory for the project at `project_root`, unless `fixed` names one.
pub(crate) fn project_state_dir(project_root: &Path, fixed: Option<&Path>) -> Result<PathBuf> {
    match fixed {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(state_dir(&ProjectId::from_path(project_root)?)),
    }
}
