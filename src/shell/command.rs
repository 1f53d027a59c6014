//! Shell command execution.

use crate::error::{BiteError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::platform::{detect_shell, shell_flag};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

/// Execute a shell command.
///
/// # Errors
///
/// Returns `CommandFailed` if the shell could not be started. A command
/// that runs and exits non-zero is reported through [`CommandResult::success`].
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let shell = detect_shell();
    let mut cmd = Command::new(&shell);
    cmd.arg(shell_flag(&shell));
    cmd.arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(if options.capture_stdout {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(if options.capture_stderr {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });

    let output = cmd.output().map_err(|e| {
        tracing::debug!(shell = %shell, error = %e, "failed to spawn shell");
        BiteError::CommandFailed {
            command: command.to_string(),
            code: None,
        }
    })?;

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout,
        stderr,
        duration: start.elapsed(),
        success: output.status.success(),
    })
}

/// Execute a command and return success/failure.
pub fn execute_check(command: &str, cwd: Option<&Path>) -> bool {
    let options = CommandOptions {
        cwd: cwd.map(|p| p.to_path_buf()),
        capture_stdout: true,
        capture_stderr: true,
        ..Default::default()
    };

    execute(command, &options)
        .map(|r| r.success)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn captured() -> CommandOptions {
        CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 42", &captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(42));
    }

    #[test]
    fn execute_captures_stderr() {
        let result = execute("echo oops >&2", &captured()).unwrap();
        assert!(result.stderr.contains("oops"));
    }

    #[test]
    fn execute_in_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();

        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..captured()
        };
        let result = execute("ls", &options).unwrap();
        assert!(result.stdout.contains("marker.txt"));
    }

    #[test]
    #[cfg(unix)]
    fn execute_with_env() {
        let mut options = captured();
        options
            .env
            .insert("BITE_TEST_VAR".to_string(), "value".to_string());

        let result = execute("echo $BITE_TEST_VAR", &options).unwrap();
        assert!(result.stdout.contains("value"));
    }

    #[test]
    fn execute_check_reports_exit_status() {
        assert!(execute_check("exit 0", None));
        assert!(!execute_check("exit 1", None));
    }
}
