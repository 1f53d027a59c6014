//! Command-line interface for BITE.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, PlayArgs, SettingsAction, SettingsArgs, StatusArgs,
};
pub use commands::{
    resolve_display, Command, CommandDispatcher, CommandResult, DisplayPreferences,
};
