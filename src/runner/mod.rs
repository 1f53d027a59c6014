//! Playback orchestration around the step sequencer.

pub mod player;
pub mod recovery;

pub use player::{PlayOptions, PlaybackSettings, PlaybackSummary, Player, StopWatcher};
pub use recovery::{prompt_recovery, RecoveryAction, RECOVERY_PROMPT_KEY};
