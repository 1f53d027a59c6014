//! Readiness-gated step sequencer.
//!
//! [`StepSequencer`] walks an ordered list of commands one at a time. Each
//! command waits for the target to report ready, is dispatched, and only
//! after the dispatch is acknowledged does the cursor move on.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use bite::playback::{DispatchReport, PollPolicy, PollTimer, SequenceOutcome, StepSequencer};
//!
//! let mut sequencer = StepSequencer::new();
//! sequencer.load_script("open /\nclick #go\n\n");
//!
//! let timer = PollTimer::new(PollPolicy::new(Duration::from_millis(1), 3));
//! let mut dispatched = Vec::new();
//! let outcome = sequencer
//!     .advance_when_ready(
//!         &mut || true,
//!         &mut |_step: usize, command: &str| -> bite::Result<DispatchReport> {
//!             dispatched.push(command.to_string());
//!             Ok(DispatchReport::acknowledged(command, Duration::ZERO, None))
//!         },
//!         &timer,
//!     )
//!     .unwrap();
//!
//! assert_eq!(outcome, SequenceOutcome::Completed { dispatched: 2 });
//! assert_eq!(dispatched, vec!["open /", "click #go"]);
//! ```

use crate::error::{BiteError, Result};

use super::dispatch::{CommandDispatcher, DispatchReport};
use super::poll::{PollOutcome, PollTimer};
use super::readiness::ReadinessProbe;
use super::script::parse_script;

/// How a call to [`StepSequencer::advance_when_ready`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// The cursor reached the end of the script.
    Completed { dispatched: usize },

    /// The readiness wait was cancelled before step `at` was dispatched.
    Cancelled { at: usize, dispatched: usize },
}

/// Receives progress notifications while the sequencer runs.
///
/// All methods default to doing nothing.
pub trait SequenceObserver {
    /// The target is ready and `command` is about to be dispatched.
    fn step_started(&mut self, _step: usize, _total: usize, _command: &str) {}

    /// The target acknowledged the command at `step`.
    fn step_acknowledged(&mut self, _step: usize, _report: &DispatchReport) {}

    /// The command at `step` could not be completed.
    fn step_failed(&mut self, _step: usize, _error: &BiteError) {}
}

impl SequenceObserver for () {}

/// Ordered command cursor.
#[derive(Debug, Clone, Default)]
pub struct StepSequencer {
    steps: Vec<String>,
    cursor: Option<usize>,
}

impl StepSequencer {
    /// Create a sequencer with no script loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequencer from already-parsed commands.
    pub fn from_steps(steps: Vec<String>) -> Self {
        Self {
            steps,
            cursor: Some(0),
        }
    }

    /// Replace the script and rewind to the first step.
    pub fn load_script(&mut self, raw: &str) {
        self.steps = parse_script(raw);
        self.cursor = Some(0);
        tracing::debug!(steps = self.steps.len(), "script loaded");
    }

    /// Loaded commands in dispatch order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Number of dispatchable steps.
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Cursor position, or `None` before a script is loaded.
    pub fn current_step(&self) -> Option<usize> {
        self.cursor
    }

    /// Move the cursor to `index`.
    ///
    /// `index == total_steps()` is valid and marks the script as finished.
    ///
    /// # Errors
    ///
    /// Returns `StepOutOfRange` if no script is loaded or `index` is past the
    /// end; the cursor is left unchanged.
    pub fn set_current_step(&mut self, index: usize) -> Result<()> {
        if self.cursor.is_none() || index > self.steps.len() {
            return Err(BiteError::StepOutOfRange {
                index,
                total: self.steps.len(),
            });
        }
        self.cursor = Some(index);
        Ok(())
    }

    /// Command at the cursor, if any.
    pub fn current_command(&self) -> Option<&str> {
        self.cursor
            .and_then(|i| self.steps.get(i))
            .map(String::as_str)
    }

    /// Whether every step has been dispatched.
    pub fn is_finished(&self) -> bool {
        self.cursor == Some(self.steps.len())
    }

    /// Dispatch the remaining steps in order, waiting for readiness before each.
    pub fn advance_when_ready(
        &mut self,
        probe: &mut dyn ReadinessProbe,
        dispatcher: &mut dyn CommandDispatcher,
        timer: &PollTimer,
    ) -> Result<SequenceOutcome> {
        self.advance_observed(probe, dispatcher, timer, &mut ())
    }

    /// Like [`advance_when_ready`](Self::advance_when_ready), reporting progress
    /// to `observer`.
    ///
    /// On error the cursor stays on the step that failed, so the caller can
    /// retry it or skip past it with [`set_current_step`](Self::set_current_step).
    pub fn advance_observed(
        &mut self,
        probe: &mut dyn ReadinessProbe,
        dispatcher: &mut dyn CommandDispatcher,
        timer: &PollTimer,
        observer: &mut dyn SequenceObserver,
    ) -> Result<SequenceOutcome> {
        let total = self.steps.len();
        let mut cursor = self.cursor.ok_or(BiteError::StepOutOfRange { index: 0, total })?;
        let mut dispatched = 0;

        while cursor < total {
            match timer.wait_until(probe) {
                PollOutcome::Ready { attempts } => {
                    tracing::debug!(step = cursor, attempts, "target ready");
                }
                PollOutcome::Cancelled => {
                    tracing::info!(step = cursor, "playback cancelled");
                    return Ok(SequenceOutcome::Cancelled {
                        at: cursor,
                        dispatched,
                    });
                }
                PollOutcome::Exhausted { attempts } => {
                    tracing::warn!(step = cursor, attempts, "target unresponsive");
                    let err = BiteError::TargetUnresponsive {
                        step: cursor,
                        attempts,
                    };
                    observer.step_failed(cursor, &err);
                    return Err(err);
                }
            }

            let command = self.steps[cursor].as_str();
            observer.step_started(cursor, total, command);

            let report = match dispatcher.dispatch(cursor, command) {
                Ok(report) if report.success => report,
                Ok(report) => {
                    let err = BiteError::DispatchFailed {
                        step: cursor,
                        command: command.to_string(),
                        message: report
                            .error
                            .unwrap_or_else(|| "command was not acknowledged".to_string()),
                    };
                    tracing::warn!(step = cursor, "{}", err);
                    observer.step_failed(cursor, &err);
                    return Err(err);
                }
                Err(e) => {
                    let err = BiteError::DispatchFailed {
                        step: cursor,
                        command: command.to_string(),
                        message: e.to_string(),
                    };
                    tracing::warn!(step = cursor, "{}", err);
                    observer.step_failed(cursor, &err);
                    return Err(err);
                }
            };

            observer.step_acknowledged(cursor, &report);
            cursor += 1;
            dispatched += 1;
            self.cursor = Some(cursor);
        }

        Ok(SequenceOutcome::Completed { dispatched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PollPolicy;
    use std::cell::RefCell;
    use std::time::Duration;

    fn timer(max_attempts: u32) -> PollTimer {
        PollTimer::new(PollPolicy::new(Duration::from_millis(1), max_attempts))
    }

    fn ack(command: &str) -> Result<DispatchReport> {
        Ok(DispatchReport::acknowledged(command, Duration::ZERO, None))
    }

    #[test]
    fn new_sequencer_has_no_script() {
        let sequencer = StepSequencer::new();
        assert_eq!(sequencer.current_step(), None);
        assert_eq!(sequencer.current_command(), None);
        assert!(!sequencer.is_finished());
    }

    #[test]
    fn load_script_excludes_trailing_blank_lines() {
        let mut sequencer = StepSequencer::new();
        sequencer.load_script("a\nb\n\n");

        assert_eq!(sequencer.steps(), &["a", "b"]);
        assert_eq!(sequencer.total_steps(), 2);
        assert_eq!(sequencer.current_step(), Some(0));
        assert_eq!(sequencer.current_command(), Some("a"));
    }

    #[test]
    fn set_current_step_accepts_end() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "b".into()]);

        sequencer.set_current_step(1).unwrap();
        assert_eq!(sequencer.current_command(), Some("b"));

        sequencer.set_current_step(2).unwrap();
        assert_eq!(sequencer.current_command(), None);
        assert!(sequencer.is_finished());
    }

    #[test]
    fn set_current_step_rejects_out_of_range() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into()]);
        let err = sequencer.set_current_step(2).unwrap_err();

        assert!(matches!(err, BiteError::StepOutOfRange { index: 2, total: 1 }));
        assert_eq!(sequencer.current_step(), Some(0));
    }

    #[test]
    fn set_current_step_rejects_unloaded() {
        let mut sequencer = StepSequencer::new();
        assert!(sequencer.set_current_step(0).is_err());
    }

    #[test]
    fn advance_dispatches_in_order() {
        let mut sequencer = StepSequencer::new();
        sequencer.load_script("one\ntwo\nthree\n");

        let mut seen = Vec::new();
        let outcome = sequencer
            .advance_when_ready(
                &mut || true,
                &mut |step: usize, command: &str| -> Result<DispatchReport> {
                    seen.push((step, command.to_string()));
                    ack(command)
                },
                &timer(1),
            )
            .unwrap();

        assert_eq!(outcome, SequenceOutcome::Completed { dispatched: 3 });
        assert_eq!(
            seen,
            vec![
                (0, "one".to_string()),
                (1, "two".to_string()),
                (2, "three".to_string())
            ]
        );
        assert!(sequencer.is_finished());
    }

    #[test]
    fn never_dispatches_before_previous_acknowledged() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "b".into(), "c".into()]);

        // Shared event log: readiness is only granted once the previous
        // dispatch has been recorded as acknowledged.
        let log = RefCell::new(Vec::<String>::new());
        let in_flight = RefCell::new(false);

        let mut probe = || !*in_flight.borrow();
        let mut dispatcher = |step: usize, command: &str| -> Result<DispatchReport> {
            assert!(!*in_flight.borrow(), "step {} dispatched while busy", step);
            *in_flight.borrow_mut() = true;
            log.borrow_mut().push(format!("start {}", command));
            log.borrow_mut().push(format!("ack {}", command));
            *in_flight.borrow_mut() = false;
            ack(command)
        };

        sequencer
            .advance_when_ready(&mut probe, &mut dispatcher, &timer(2))
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["start a", "ack a", "start b", "ack b", "start c", "ack c"]
        );
    }

    #[test]
    fn resumes_from_set_index() {
        let mut sequencer = StepSequencer::new();
        sequencer.load_script("a\nb\nc\nd");
        sequencer.set_current_step(2).unwrap();

        let mut seen = Vec::new();
        let outcome = sequencer
            .advance_when_ready(
                &mut || true,
                &mut |_: usize, command: &str| -> Result<DispatchReport> {
                    seen.push(command.to_string());
                    ack(command)
                },
                &timer(1),
            )
            .unwrap();

        assert_eq!(outcome, SequenceOutcome::Completed { dispatched: 2 });
        assert_eq!(seen, vec!["c", "d"]);
    }

    #[test]
    fn waits_for_readiness_before_each_step() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "b".into()]);
        let probes = RefCell::new(0);

        // Ready on every second probe.
        let mut probe = || {
            *probes.borrow_mut() += 1;
            *probes.borrow() % 2 == 0
        };

        sequencer
            .advance_when_ready(&mut probe, &mut |_: usize, c: &str| ack(c), &timer(5))
            .unwrap();

        assert_eq!(*probes.borrow(), 4);
    }

    #[test]
    fn stalled_target_is_unresponsive() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "b".into()]);
        let mut dispatched = 0;

        let err = sequencer
            .advance_when_ready(
                &mut || false,
                &mut |_: usize, c: &str| -> Result<DispatchReport> {
                    dispatched += 1;
                    ack(c)
                },
                &timer(3),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            BiteError::TargetUnresponsive {
                step: 0,
                attempts: 3
            }
        ));
        assert_eq!(dispatched, 0);
        assert_eq!(sequencer.current_step(), Some(0));
    }

    #[test]
    fn failed_dispatch_stops_without_retry() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "bad".into(), "c".into()]);
        let mut calls = Vec::new();

        let err = sequencer
            .advance_when_ready(
                &mut || true,
                &mut |_: usize, command: &str| -> Result<DispatchReport> {
                    calls.push(command.to_string());
                    if command == "bad" {
                        Ok(DispatchReport::failed(command, Duration::ZERO, "no such element"))
                    } else {
                        ack(command)
                    }
                },
                &timer(1),
            )
            .unwrap_err();

        match err {
            BiteError::DispatchFailed {
                step,
                command,
                message,
            } => {
                assert_eq!(step, 1);
                assert_eq!(command, "bad");
                assert_eq!(message, "no such element");
            }
            other => panic!("Expected DispatchFailed, got {:?}", other),
        }
        assert_eq!(calls, vec!["a", "bad"]);
        assert_eq!(sequencer.current_step(), Some(1));
        assert_eq!(sequencer.current_command(), Some("bad"));
    }

    #[test]
    fn dispatcher_error_becomes_dispatch_failed() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into()]);

        let err = sequencer
            .advance_when_ready(
                &mut || true,
                &mut |_: usize, c: &str| -> Result<DispatchReport> {
                    Err(BiteError::CommandFailed {
                        command: c.to_string(),
                        code: None,
                    })
                },
                &timer(1),
            )
            .unwrap_err();

        assert!(matches!(err, BiteError::DispatchFailed { step: 0, .. }));
    }

    #[test]
    fn cancelled_timer_reports_position() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "b".into()]);
        let timer = timer(1);
        timer.cancel_token().cancel();

        let outcome = sequencer
            .advance_when_ready(&mut || true, &mut |_: usize, c: &str| ack(c), &timer)
            .unwrap();

        assert_eq!(
            outcome,
            SequenceOutcome::Cancelled {
                at: 0,
                dispatched: 0
            }
        );
    }

    #[test]
    fn unloaded_sequencer_cannot_advance() {
        let mut sequencer = StepSequencer::new();
        let result =
            sequencer.advance_when_ready(&mut || true, &mut |_: usize, c: &str| ack(c), &timer(1));
        assert!(matches!(result, Err(BiteError::StepOutOfRange { .. })));
    }

    #[test]
    fn finished_sequencer_completes_immediately() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into()]);
        sequencer.set_current_step(1).unwrap();

        let outcome = sequencer
            .advance_when_ready(&mut || false, &mut |_: usize, c: &str| ack(c), &timer(1))
            .unwrap();
        assert_eq!(outcome, SequenceOutcome::Completed { dispatched: 0 });
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl SequenceObserver for Recorder {
        fn step_started(&mut self, step: usize, total: usize, command: &str) {
            self.events.push(format!("start {}/{} {}", step, total, command));
        }

        fn step_acknowledged(&mut self, step: usize, _report: &DispatchReport) {
            self.events.push(format!("ack {}", step));
        }

        fn step_failed(&mut self, step: usize, _error: &BiteError) {
            self.events.push(format!("fail {}", step));
        }
    }

    #[test]
    fn observer_sees_progress_and_failure() {
        let mut sequencer = StepSequencer::from_steps(vec!["a".into(), "b".into()]);
        let mut recorder = Recorder::default();

        let _ = sequencer.advance_observed(
            &mut || true,
            &mut |step: usize, c: &str| -> Result<DispatchReport> {
                if step == 1 {
                    Ok(DispatchReport::failed(c, Duration::ZERO, "nope"))
                } else {
                    ack(c)
                }
            },
            &timer(1),
            &mut recorder,
        );

        assert_eq!(
            recorder.events,
            vec!["start 0/2 a", "ack 0", "start 1/2 b", "fail 1"]
        );
    }
}
