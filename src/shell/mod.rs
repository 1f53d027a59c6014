//! Shell command execution.
//!
//! Playback commands and `command_succeeds` readiness checks both run
//! through the user's shell.

pub mod command;
pub mod platform;

pub use command::{execute, execute_check, CommandOptions, CommandResult};
pub use platform::{detect_shell, is_ci, shell_flag};
