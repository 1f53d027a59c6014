//! Visual theme and styling.

use console::Style;

/// Colors and glyphs for terminal output.
#[derive(Debug, Clone)]
pub struct BiteTheme {
    /// Acknowledged steps and finished runs (green).
    pub success: Style,
    /// Stalls and skipped steps (orange).
    pub warning: Style,
    /// Failures (red bold).
    pub error: Style,
    /// Secondary text (dim).
    pub dim: Style,
    /// Headers (bold cyan).
    pub header: Style,
    /// `[3/7]` counters (dim).
    pub step_number: Style,
    /// Commands echoed in output (dim italic).
    pub command: Style,
    /// Keys in key-value listings (bold).
    pub key: Style,
}

impl Default for BiteTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl BiteTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            step_number: Style::new().dim(),
            command: Style::new().dim().italic(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            step_number: Style::new(),
            command: Style::new(),
            key: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a step line: `[2/5] command`.
    pub fn format_step(&self, step: usize, total: usize, command: &str) -> String {
        format!(
            "{} {}",
            self.step_number.apply_to(format!("[{}/{}]", step + 1, total)),
            self.command.apply_to(command)
        )
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("▶ {}", title)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
