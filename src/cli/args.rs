//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// BITE - Readiness-gated playback of recorded test scripts.
#[derive(Debug, Parser)]
#[command(name = "bite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (replaces the layered .bite/config.yml lookup)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play a script against the target
    Play(PlayArgs),

    /// Show the last playback of this project
    Status(StatusArgs),

    /// Ask a running playback to stop
    Stop,

    /// Show or change stored settings
    Settings(SettingsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `play` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlayArgs {
    /// Script to play, one command per line
    pub script: PathBuf,

    /// Start at step N (1-based)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub from: Option<u64>,

    /// Continue an interrupted playback of the same script
    #[arg(long, conflicts_with = "from")]
    pub resume: bool,

    /// Show the steps without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Readiness checks before the target counts as unresponsive
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Delay between readiness checks, in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// Never prompt; a failed step stops playback
    #[arg(long)]
    pub non_interactive: bool,
}

impl PlayArgs {
    /// Zero-based start step from `--from`.
    pub fn start_index(&self) -> Option<usize> {
        self.from.map(|n| n.saturating_sub(1) as usize)
    }
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `settings` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Settings subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SettingsAction {
    /// List settings, optionally for one tab
    List {
        /// Tab to list (playback or display)
        #[arg(long)]
        tab: Option<String>,
    },

    /// Print one stored setting
    Get {
        /// Namespaced key, e.g. playback.max_attempts
        key: String,
    },

    /// Store a setting
    Set {
        /// Namespaced key, e.g. playback.max_attempts
        key: String,

        /// New value
        value: String,
    },

    /// Remove a stored setting
    Unset {
        /// Namespaced key, e.g. playback.max_attempts
        key: String,
    },
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
