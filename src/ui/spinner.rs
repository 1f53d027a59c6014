//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::BiteTheme;
use super::SpinnerHandle;

/// Spinner shown while waiting for the target to become ready.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: BiteTheme,
}

impl ProgressSpinner {
    /// Create a visible spinner with a message.
    pub fn new(message: &str, theme: BiteTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar, theme }
    }

    /// Create a spinner that draws nothing (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: BiteTheme::plain(),
        }
    }

    fn finish_with(&self, line: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish_with(self.theme.format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish_with(self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish_with(self.theme.format_warning(msg));
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
