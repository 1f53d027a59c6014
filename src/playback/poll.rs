//! Bounded, cancellable readiness polling.
//!
//! [`PollTimer`] replaces fixed-delay retry loops: it probes the target at a
//! fixed interval, gives up after a maximum number of attempts, and wakes
//! immediately when its [`CancelToken`] is cancelled.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use super::readiness::ReadinessProbe;

/// Interval and attempt budget for readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive probes.
    pub interval: Duration,

    /// Maximum number of probes before giving up (at least 1).
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Default delay between probes.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

    /// Default probe budget.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 40;

    /// Create a policy. A zero attempt budget is raised to one probe.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Worst-case time spent waiting before the budget is exhausted.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_MAX_ATTEMPTS)
    }
}

/// Shared cancellation flag that wakes sleeping timers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake every timer waiting on this token.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().unwrap_or_else(|e| e.into_inner());
        *cancelled = true;
        cvar.notify_all();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for `duration` or until cancelled. Returns whether the token is cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = cvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }
}

/// Result of waiting on a readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The probe reported ready.
    Ready { attempts: u32 },

    /// The attempt budget ran out.
    Exhausted { attempts: u32 },

    /// The wait was cancelled.
    Cancelled,
}

/// Polls a readiness probe under a [`PollPolicy`].
#[derive(Debug, Clone, Default)]
pub struct PollTimer {
    policy: PollPolicy,
    cancel: CancelToken,
}

impl PollTimer {
    /// Create a timer with its own cancel token.
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            cancel: CancelToken::new(),
        }
    }

    /// Share an existing cancel token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The policy in effect.
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// The token that cancels this timer.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Probe until ready, exhausted or cancelled.
    ///
    /// The probe runs first without delay; the timer sleeps only between
    /// attempts.
    pub fn wait_until(&self, probe: &mut dyn ReadinessProbe) -> PollOutcome {
        let max = self.policy.max_attempts.max(1);

        for attempt in 1..=max {
            if self.cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }
            if probe.is_ready() {
                return PollOutcome::Ready { attempts: attempt };
            }
            if attempt == max {
                break;
            }
            tracing::trace!(attempt, "target not ready, waiting");
            if self.cancel.sleep(self.policy.interval) {
                return PollOutcome::Cancelled;
            }
        }

        PollOutcome::Exhausted { attempts: max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    fn fast(max_attempts: u32) -> PollTimer {
        PollTimer::new(PollPolicy::new(Duration::from_millis(1), max_attempts))
    }

    #[test]
    fn ready_probe_returns_on_first_attempt() {
        let outcome = fast(5).wait_until(&mut || true);
        assert_eq!(outcome, PollOutcome::Ready { attempts: 1 });
    }

    #[test]
    fn probe_becomes_ready_later() {
        let mut calls = 0;
        let outcome = fast(10).wait_until(&mut || {
            calls += 1;
            calls >= 3
        });
        assert_eq!(outcome, PollOutcome::Ready { attempts: 3 });
    }

    #[test]
    fn never_ready_exhausts_budget() {
        let mut calls = 0;
        let outcome = fast(4).wait_until(&mut || {
            calls += 1;
            false
        });
        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 4 });
        assert_eq!(calls, 4);
    }

    #[test]
    fn zero_attempts_still_probes_once() {
        let policy = PollPolicy::new(Duration::from_millis(1), 0);
        assert_eq!(policy.max_attempts, 1);

        let outcome = PollTimer::new(policy).wait_until(&mut || false);
        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 1 });
    }

    #[test]
    fn cancelled_token_stops_before_probing() {
        let timer = fast(5);
        timer.cancel_token().cancel();

        let mut calls = 0;
        let outcome = timer.wait_until(&mut || {
            calls += 1;
            true
        });
        assert_eq!(outcome, PollOutcome::Cancelled);
        assert_eq!(calls, 0);
    }

    #[test]
    fn cancel_wakes_sleeping_timer() {
        let token = CancelToken::new();
        let timer = PollTimer::new(PollPolicy::new(Duration::from_secs(30), 10))
            .with_cancel(token.clone());

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        });

        let start = Instant::now();
        let outcome = timer.wait_until(&mut || false);
        canceller.join().unwrap();

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn policy_budget() {
        let policy = PollPolicy::new(Duration::from_millis(100), 5);
        assert_eq!(policy.budget(), Duration::from_millis(400));
    }

    #[test]
    fn default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 40);
    }
}
