//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{BiteError, Result};

use super::prompts::is_yes;
use super::{OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts ahead of time.
pub const PROMPT_ENV_PREFIX: &str = "BITE_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `BITE_PROMPT_<KEY>` variables, falling back to
/// the prompt default. A prompt with neither is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI, reading overrides from the environment.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    fn answer_for<'a>(&'a self, prompt: &'a Prompt) -> Option<&'a String> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        self.env_overrides
            .get(&env_key)
            .or(prompt.default.as_ref())
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let answer = self
            .answer_for(prompt)
            .ok_or_else(|| BiteError::ConfigValidationError {
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (no default value)",
                    prompt.key
                ),
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(is_yes(answer)),
            PromptType::Input | PromptType::Select { .. } => PromptResult::String(answer.clone()),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_progress() {
            println!("  {}", message);
        }
        Box::new(LineSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_step(&mut self, step: usize, total: usize, command: &str) {
        if self.mode.shows_progress() {
            println!("[{}/{}] {}", step + 1, total, command);
        }
    }

    fn show_command_output(&mut self, output: &str) {
        if self.mode.shows_command_output() {
            for line in output.lines() {
                println!("  {}", line);
            }
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints its final line only.
struct LineSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            println!("  ✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  ✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  ⚠ {}", msg);
        }
    }
}
