//! Playback orchestration.
//!
//! [`Player`] wires a [`Script`] to the sequencer: it picks the start step,
//! builds the readiness probe and dispatcher from [`PlaybackSettings`],
//! persists progress after every acknowledged step, watches for stop
//! requests, and offers recovery when a step cannot be completed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::BiteConfig;
use crate::error::{BiteError, Result};
use crate::playback::{
    CancelToken, CheckProbe, CommandDispatcher, DispatchReport, DryRunDispatcher, PollPolicy,
    PollTimer, ReadinessCheck, ReadinessProbe, Script, SequenceObserver, SequenceOutcome,
    ShellDispatcher, StepSequencer,
};
use crate::settings::{parse_bool, PlaybackTab, SettingsStore};
use crate::state::{PlaybackState, PlaybackStatus, StopRequest};
use crate::ui::{SpinnerHandle, UserInterface};

use super::recovery::{prompt_recovery, RecoveryAction};

/// How often the stop watcher looks for a stop request.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Effective playback settings: configuration overlaid by stored settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    /// Readiness polling interval and budget.
    pub policy: PollPolicy,

    /// Readiness condition checked before every step.
    pub ready: ReadinessCheck,

    /// Environment for dispatched commands.
    pub env: HashMap<String, String>,

    /// Capture command output instead of inheriting the terminal.
    pub capture_output: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self::from_config(&BiteConfig::default())
    }
}

impl PlaybackSettings {
    /// Settings taken from `config` alone.
    pub fn from_config(config: &BiteConfig) -> Self {
        let playback = &config.playback;
        Self {
            policy: PollPolicy::new(
                Duration::from_millis(playback.poll_interval_ms),
                playback.max_attempts,
            ),
            ready: playback.ready.clone(),
            env: playback.env.clone(),
            capture_output: playback.capture_output,
        }
    }

    /// Resolve settings from `config`, letting values saved in `store` win.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if a stored value cannot be parsed.
    pub fn resolve(config: &BiteConfig, store: &SettingsStore) -> Result<Self> {
        let mut settings = Self::from_config(config);

        let interval_ms: Option<u64> = stored(store, PlaybackTab::POLL_INTERVAL_MS)?;
        let max_attempts: Option<u32> = stored(store, PlaybackTab::MAX_ATTEMPTS)?;
        settings.policy = PollPolicy::new(
            interval_ms.map_or(settings.policy.interval, Duration::from_millis),
            max_attempts.unwrap_or(settings.policy.max_attempts),
        );

        if let Some(value) = store.get(PlaybackTab::CAPTURE_OUTPUT) {
            settings.capture_output = parse_bool(value)
                .ok_or_else(|| invalid_stored(PlaybackTab::CAPTURE_OUTPUT, value))?;
        }

        if let Some(path) = store.get(PlaybackTab::READY_FILE) {
            settings.ready = ReadinessCheck::FileExists {
                path: path.to_string(),
            };
        }

        Ok(settings)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, options: &PlayOptions) -> Self {
        if let Some(ms) = options.interval_ms {
            self.policy.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = options.max_attempts {
            self.policy = PollPolicy::new(self.policy.interval, attempts);
        }
        self
    }
}

fn stored<T: FromStr>(store: &SettingsStore, key: &str) -> Result<Option<T>> {
    store
        .get(key)
        .map(|value| value.parse().map_err(|_| invalid_stored(key, value)))
        .transpose()
}

fn invalid_stored(key: &str, value: &str) -> BiteError {
    BiteError::ConfigValidationError {
        message: format!("stored setting {} has an invalid value '{}'", key, value),
    }
}

/// Options for one playback run.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Zero-based step to start from.
    pub from: Option<usize>,

    /// Continue from the saved playback state.
    pub resume: bool,

    /// Acknowledge every step without executing it.
    pub dry_run: bool,

    /// Override the readiness attempt budget.
    pub max_attempts: Option<u32>,

    /// Override the readiness interval, in milliseconds.
    pub interval_ms: Option<u64>,
}

/// Result of a playback run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSummary {
    /// How the run ended.
    pub status: PlaybackStatus,

    /// Step the run started at.
    pub start_step: usize,

    /// Steps acknowledged by the target.
    pub dispatched: usize,

    /// Steps skipped during recovery.
    pub skipped: usize,

    /// Cursor when the run ended.
    pub current_step: usize,

    /// Steps in the script.
    pub total_steps: usize,

    /// Wall-clock time of the run.
    pub duration: Duration,

    /// Error that ended the run, if any.
    pub error: Option<String>,
}

impl PlaybackSummary {
    pub fn is_success(&self) -> bool {
        self.status == PlaybackStatus::Completed
    }
}

/// Plays scripts for one project.
#[derive(Debug, Clone)]
pub struct Player {
    project_root: PathBuf,
    state_dir: PathBuf,
    settings: PlaybackSettings,
}

impl Player {
    /// Create a player that runs commands in `project_root` and keeps its
    /// state in `state_dir`.
    pub fn new(project_root: &Path, state_dir: &Path, settings: PlaybackSettings) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            state_dir: state_dir.to_path_buf(),
            settings,
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Play `script` through the shell, or through a dry-run dispatcher.
    pub fn play(
        &self,
        ui: &mut dyn UserInterface,
        script: &Script,
        options: &PlayOptions,
    ) -> Result<PlaybackSummary> {
        if options.dry_run {
            return self.play_with(ui, script, options, &mut DryRunDispatcher);
        }

        let mut dispatcher = ShellDispatcher::new(&self.project_root)
            .with_env(self.settings.env.clone())
            .with_capture(self.settings.capture_output);
        self.play_with(ui, script, options, &mut dispatcher)
    }

    /// Play `script` through `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns `StepOutOfRange` for an invalid start step. Dispatch failures
    /// and stalls are reported in the summary, not as errors.
    pub fn play_with(
        &self,
        ui: &mut dyn UserInterface,
        script: &Script,
        options: &PlayOptions,
        dispatcher: &mut dyn CommandDispatcher,
    ) -> Result<PlaybackSummary> {
        let settings = self.settings.clone().with_overrides(options);
        let started = Instant::now();

        let mut sequencer = StepSequencer::from_steps(script.steps().to_vec());
        let start = self.start_step(ui, script, options)?;
        sequencer.set_current_step(start)?;

        let cancel = CancelToken::new();
        let timer = PollTimer::new(settings.policy).with_cancel(cancel.clone());
        // A dry run leaves the stop marker to the real playback it may run beside.
        let _watcher = if options.dry_run {
            None
        } else {
            let stop = StopRequest::in_dir(&self.state_dir);
            if stop.take() {
                tracing::debug!("cleared stale stop request");
            }
            Some(StopWatcher::spawn(stop, cancel, STOP_POLL_INTERVAL))
        };

        let ready = if options.dry_run {
            ReadinessCheck::Always
        } else {
            settings.ready
        };

        tracing::info!(
            script = %script.path().display(),
            steps = script.steps().len(),
            start,
            "playback started"
        );

        let shared: SharedUi<'_> = RefCell::new(ui);
        let mut probe = WatchedProbe::new(CheckProbe::new(ready, &self.project_root), &shared);
        let mut observer = PlaybackObserver {
            ui: &shared,
            state: PlaybackState::start(script, start),
            state_dir: (!options.dry_run).then_some(self.state_dir.as_path()),
            acknowledged: 0,
        };
        observer.persist();

        let mut skipped = 0;
        let mut error = None;
        let status = loop {
            let outcome =
                sequencer.advance_observed(&mut probe, dispatcher, &timer, &mut observer);

            let err = match outcome {
                Ok(SequenceOutcome::Completed { .. }) => break PlaybackStatus::Completed,
                Ok(SequenceOutcome::Cancelled { at, .. }) => {
                    probe.give_up("Stopped");
                    shared
                        .borrow_mut()
                        .warning(&format!("Playback stopped before step {}", at + 1));
                    break PlaybackStatus::Cancelled;
                }
                Err(e) => e,
            };

            let recoverable = match &err {
                BiteError::DispatchFailed { step, .. } => Some((*step, PlaybackStatus::Failed)),
                BiteError::TargetUnresponsive { step, .. } => {
                    Some((*step, PlaybackStatus::Unresponsive))
                }
                _ => None,
            };
            let Some((step, status)) = recoverable else {
                observer.finish(PlaybackStatus::Failed, Some(err.to_string()));
                return Err(err);
            };
            if status == PlaybackStatus::Unresponsive {
                probe.give_up("Target unresponsive");
            }

            if !shared.borrow().is_interactive() {
                error = Some(err.to_string());
                break status;
            }

            let action = match prompt_recovery(&mut **shared.borrow_mut(), step, &err.to_string())
            {
                Ok(action) => action,
                Err(prompt_err) => {
                    observer.finish(status, Some(err.to_string()));
                    return Err(prompt_err);
                }
            };

            match action {
                RecoveryAction::Retry => continue,
                RecoveryAction::Skip => {
                    sequencer.set_current_step(step + 1)?;
                    observer.advance_to(step + 1);
                    skipped += 1;
                }
                RecoveryAction::Abort => {
                    error = Some(err.to_string());
                    break status;
                }
            }
        };

        observer.finish(status, error.clone());
        let dispatched = observer.acknowledged;
        let current_step = sequencer.current_step().unwrap_or(start);

        tracing::info!(%status, dispatched, skipped, "playback finished");

        Ok(PlaybackSummary {
            status,
            start_step: start,
            dispatched,
            skipped,
            current_step,
            total_steps: script.steps().len(),
            duration: started.elapsed(),
            error,
        })
    }

    fn start_step(
        &self,
        ui: &mut dyn UserInterface,
        script: &Script,
        options: &PlayOptions,
    ) -> Result<usize> {
        if let Some(from) = options.from {
            return Ok(from);
        }
        if !options.resume {
            return Ok(0);
        }

        let resume_at = PlaybackState::load_from(&self.state_dir)?
            .and_then(|state| state.resume_index(script.fingerprint()));

        match resume_at {
            Some(step) => {
                ui.message(&format!(
                    "Resuming at step {} of {}",
                    step + 1,
                    script.steps().len()
                ));
                Ok(step)
            }
            None => {
                ui.warning("No unfinished playback of this script; starting from the beginning");
                Ok(0)
            }
        }
    }
}

type SharedUi<'u> = RefCell<&'u mut dyn UserInterface>;

/// Readiness probe that shows a spinner while the target is not ready.
struct WatchedProbe<'a, 'u> {
    inner: CheckProbe,
    ui: &'a SharedUi<'u>,
    spinner: Option<Box<dyn SpinnerHandle>>,
}

impl<'a, 'u> WatchedProbe<'a, 'u> {
    fn new(inner: CheckProbe, ui: &'a SharedUi<'u>) -> Self {
        Self {
            inner,
            ui,
            spinner: None,
        }
    }

    fn give_up(&mut self, msg: &str) {
        if let Some(mut spinner) = self.spinner.take() {
            spinner.finish_error(msg);
        }
    }
}

impl ReadinessProbe for WatchedProbe<'_, '_> {
    fn is_ready(&mut self) -> bool {
        let ready = self.inner.is_ready();

        if ready {
            if let Some(mut spinner) = self.spinner.take() {
                spinner.finish_success("Target ready");
            }
        } else if self.spinner.is_none() {
            let message = format!("Waiting for target ({})", self.inner.check().describe());
            self.spinner = Some(self.ui.borrow_mut().start_spinner(&message));
        }

        ready
    }
}

/// Reports progress to the UI and persists playback state.
struct PlaybackObserver<'a, 'u> {
    ui: &'a SharedUi<'u>,
    state: PlaybackState,
    state_dir: Option<&'a Path>,
    acknowledged: usize,
}

impl PlaybackObserver<'_, '_> {
    fn persist(&self) {
        if let Some(dir) = self.state_dir {
            if let Err(e) = self.state.save_to(dir) {
                tracing::warn!("Failed to save playback state: {}", e);
            }
        }
    }

    fn advance_to(&mut self, next_step: usize) {
        self.state.record_progress(next_step);
        self.persist();
    }

    fn finish(&mut self, status: PlaybackStatus, error: Option<String>) {
        self.state.finish(status, error);
        self.persist();
    }
}

impl SequenceObserver for PlaybackObserver<'_, '_> {
    fn step_started(&mut self, step: usize, total: usize, command: &str) {
        self.ui.borrow_mut().show_step(step, total, command);
    }

    fn step_acknowledged(&mut self, step: usize, report: &DispatchReport) {
        self.acknowledged += 1;
        if let Some(output) = report.output.as_deref().filter(|o| !o.trim().is_empty()) {
            self.ui.borrow_mut().show_command_output(output);
        }
        self.advance_to(step + 1);
    }

    fn step_failed(&mut self, _step: usize, error: &BiteError) {
        self.ui.borrow_mut().error(&error.to_string());
    }
}

/// Background thread that cancels playback when a stop request appears.
pub struct StopWatcher {
    done: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl StopWatcher {
    /// Check `request` every `interval` and cancel `cancel` when it is pending.
    pub fn spawn(request: StopRequest, cancel: CancelToken, interval: Duration) -> Self {
        let done = CancelToken::new();
        let finished = done.clone();

        let handle = thread::spawn(move || loop {
            if request.take() {
                tracing::info!("stop requested");
                cancel.cancel();
                break;
            }
            if finished.sleep(interval) {
                break;
            }
        });

        Self {
            done,
            handle: Some(handle),
        }
    }
}

impl Drop for StopWatcher {
    fn drop(&mut self) {
        self.done.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
