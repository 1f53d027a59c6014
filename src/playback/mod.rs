//! Script playback engine.
//!
//! - [`StepSequencer`] - Ordered command cursor with readiness-gated dispatch
//! - [`PollTimer`] - Bounded, cancellable readiness polling
//! - [`ReadinessCheck`] / [`CheckProbe`] - Configured readiness conditions
//! - [`CommandDispatcher`] - Executes one command against the target
//! - [`Script`] - Script files and line parsing

pub mod dispatch;
pub mod poll;
pub mod readiness;
pub mod script;
pub mod sequencer;

pub use dispatch::{CommandDispatcher, DispatchReport, DryRunDispatcher, ShellDispatcher};
pub use poll::{CancelToken, PollOutcome, PollPolicy, PollTimer};
pub use readiness::{check_ready, CheckProbe, ReadinessCheck, ReadinessProbe};
pub use script::{parse_script, Script};
pub use sequencer::{SequenceObserver, SequenceOutcome, StepSequencer};
