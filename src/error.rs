//! Error types for BITE operations.
//!
//! This module defines [`BiteError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration problems (bad counts, bad indices) are rejected at the boundary
//! - Dispatch failures are surfaced to the caller and never retried internally
//! - Stalls are bounded by the poll policy and surface as [`BiteError::TargetUnresponsive`]
//! - Use `anyhow::Error` (via `BiteError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for BITE operations.
#[derive(Debug, Error)]
pub enum BiteError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration or state file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Playback script does not exist.
    #[error("Script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// Playback script has no commands.
    #[error("Script has no commands: {path}")]
    EmptyScript { path: PathBuf },

    /// Requested step index is outside the loaded script.
    #[error("Step {index} is out of range (script has {total} steps)")]
    StepOutOfRange { index: usize, total: usize },

    /// The target rejected or failed to execute a command.
    #[error("Step {step} failed ({command}): {message}")]
    DispatchFailed {
        step: usize,
        command: String,
        message: String,
    },

    /// The target never became ready within the poll budget.
    #[error("Target unresponsive before step {step} after {attempts} readiness checks")]
    TargetUnresponsive { step: usize, attempts: u32 },

    /// Settings key does not belong to any settings tab.
    #[error("Unknown setting: {key}")]
    UnknownSetting { key: String },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for BITE operations.
pub type Result<T> = std::result::Result<T, BiteError>;
