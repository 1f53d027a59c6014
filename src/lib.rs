//! BITE - Readiness-gated playback of recorded test scripts.
//!
//! A script is a list of commands, one per line. BITE plays it step by step,
//! waiting for the target to report that it is ready before every step and
//! never dispatching a step before the previous one was acknowledged.
//!
//! # Modules
//!
//! - [`sync`] - Countdown barrier for completion callbacks
//! - [`playback`] - Scripts, readiness polling, dispatch, and the step sequencer
//! - [`runner`] - Playback orchestration and interactive recovery
//! - [`settings`] - Per-project settings tabs
//! - [`state`] - Project identity, playback state, and stop requests
//! - [`config`] - Layered YAML configuration
//! - [`shell`] - Shell command execution
//! - [`ui`] - Prompts, spinners, and terminal output
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use bite::playback::{DispatchReport, PollPolicy, PollTimer, StepSequencer};
//!
//! let mut sequencer = StepSequencer::new();
//! sequencer.load_script("open /cart\nclick #checkout\n");
//!
//! let timer = PollTimer::new(PollPolicy::new(Duration::from_millis(1), 3));
//! let mut dispatched = Vec::new();
//! sequencer
//!     .advance_when_ready(
//!         &mut || true,
//!         &mut |_: usize, command: &str| -> bite::Result<DispatchReport> {
//!             dispatched.push(command.to_string());
//!             Ok(DispatchReport::acknowledged(command, Duration::ZERO, None))
//!         },
//!         &timer,
//!     )
//!     .unwrap();
//!
//! assert_eq!(dispatched, ["open /cart", "click #checkout"]);
//! assert!(sequencer.is_finished());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod playback;
pub mod runner;
pub mod settings;
pub mod shell;
pub mod state;
pub mod sync;
pub mod ui;

pub use error::{BiteError, Result};
