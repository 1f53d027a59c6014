//! Command dispatch to the playback target.
//!
//! A [`CommandDispatcher`] executes one command and reports whether the
//! target acknowledged it. The sequencer never retries a failed dispatch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::shell::{execute, CommandOptions};

/// Outcome of dispatching one command.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// The command that was dispatched.
    pub command: String,

    /// Whether the target acknowledged the command.
    pub success: bool,

    /// Time spent executing.
    pub duration: Duration,

    /// Captured output (if available).
    pub output: Option<String>,

    /// Error message (if failed).
    pub error: Option<String>,
}

impl DispatchReport {
    /// Create an acknowledged report.
    pub fn acknowledged(command: &str, duration: Duration, output: Option<String>) -> Self {
        Self {
            command: command.to_string(),
            success: true,
            duration,
            output,
            error: None,
        }
    }

    /// Create a failure report.
    pub fn failed(command: &str, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            success: false,
            duration,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// Executes commands against the playback target.
pub trait CommandDispatcher {
    /// Dispatch the command at `step`.
    ///
    /// An `Err` or an unsuccessful report both stop playback at `step`.
    fn dispatch(&mut self, step: usize, command: &str) -> Result<DispatchReport>;
}

impl<F> CommandDispatcher for F
where
    F: FnMut(usize, &str) -> Result<DispatchReport>,
{
    fn dispatch(&mut self, step: usize, command: &str) -> Result<DispatchReport> {
        self(step, command)
    }
}

/// Runs each command through the user's shell.
#[derive(Debug, Clone)]
pub struct ShellDispatcher {
    cwd: PathBuf,
    env: HashMap<String, String>,
    capture_output: bool,
}

impl ShellDispatcher {
    /// Create a dispatcher that runs commands in `cwd`.
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            env: HashMap::new(),
            capture_output: true,
        }
    }

    /// Add environment variables for every command.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Capture output instead of inheriting the terminal.
    pub fn with_capture(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }
}

impl CommandDispatcher for ShellDispatcher {
    fn dispatch(&mut self, step: usize, command: &str) -> Result<DispatchReport> {
        tracing::debug!(step, command, "dispatching to shell");

        let options = CommandOptions {
            cwd: Some(self.cwd.clone()),
            env: self.env.clone(),
            capture_stdout: self.capture_output,
            capture_stderr: self.capture_output,
            ..Default::default()
        };

        let result = execute(command, &options)?;

        if result.success {
            let output = self.capture_output.then_some(result.stdout);
            Ok(DispatchReport::acknowledged(command, result.duration, output))
        } else {
            let stderr = result.stderr.trim();
            let message = if stderr.is_empty() {
                format!("exit code {:?}", result.exit_code)
            } else {
                format!("exit code {:?}: {}", result.exit_code, stderr)
            };
            Ok(DispatchReport::failed(command, result.duration, message))
        }
    }
}

/// Acknowledges every command without executing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunDispatcher;

impl CommandDispatcher for DryRunDispatcher {
    fn dispatch(&mut self, _step: usize, command: &str) -> Result<DispatchReport> {
        Ok(DispatchReport::acknowledged(
            command,
            Duration::ZERO,
            Some(format!("Would run: {}", command)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn shell_dispatcher_acknowledges_success() {
        let temp = TempDir::new().unwrap();
        let mut dispatcher = ShellDispatcher::new(temp.path());

        let report = dispatcher.dispatch(0, "echo clicked").unwrap();
        assert!(report.success);
        assert!(report.output.unwrap().contains("clicked"));
    }

    #[test]
    fn shell_dispatcher_reports_failure() {
        let temp = TempDir::new().unwrap();
        let mut dispatcher = ShellDispatcher::new(temp.path());

        let report = dispatcher.dispatch(0, "echo boom >&2; exit 3").unwrap();
        assert!(!report.success);
        let error = report.error.unwrap();
        assert!(error.contains("3"), "error was: {}", error);
        assert!(error.contains("boom"), "error was: {}", error);
    }

    #[test]
    #[cfg(unix)]
    fn shell_dispatcher_passes_env() {
        let temp = TempDir::new().unwrap();
        let mut env = HashMap::new();
        env.insert("BITE_TARGET".to_string(), "staging".to_string());
        let mut dispatcher = ShellDispatcher::new(temp.path()).with_env(env);

        let report = dispatcher.dispatch(0, "echo $BITE_TARGET").unwrap();
        assert!(report.output.unwrap().contains("staging"));
    }

    #[test]
    fn shell_dispatcher_runs_in_cwd() {
        let temp = TempDir::new().unwrap();
        let mut dispatcher = ShellDispatcher::new(temp.path());

        dispatcher.dispatch(0, "echo hi > out.txt").unwrap();
        assert!(temp.path().join("out.txt").exists());
        assert!(fs::read_to_string(temp.path().join("out.txt"))
            .unwrap()
            .contains("hi"));
    }

    #[test]
    fn dry_run_executes_nothing() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("ran");
        let mut dispatcher = DryRunDispatcher;

        let command = format!("touch {}", marker.display());
        let report = dispatcher.dispatch(0, &command).unwrap();

        assert!(report.success);
        assert!(report.output.unwrap().contains("Would run"));
        assert!(!marker.exists());
    }

    #[test]
    fn closure_implements_dispatcher() {
        let mut seen = Vec::new();
        let mut dispatcher = |step: usize, command: &str| -> Result<DispatchReport> {
            seen.push((step, command.to_string()));
            Ok(DispatchReport::acknowledged(command, Duration::ZERO, None))
        };

        dispatcher.dispatch(4, "open /").unwrap();
        drop(dispatcher);
        assert_eq!(seen, vec![(4, "open /".to_string())]);
    }
}
