//! Interactive recovery when a step cannot be completed.
//!
//! When a dispatch fails or the target stops responding during `bite play`,
//! the user picks whether to retry the step, skip past it, or abort.

use crate::error::Result;
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};

/// Prompt key, also answerable through `BITE_PROMPT_RECOVERY`.
pub const RECOVERY_PROMPT_KEY: &str = "recovery";

/// Recovery action chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Wait for readiness and dispatch the same step again.
    Retry,
    /// Move the cursor past the failed step and continue.
    Skip,
    /// Stop playback.
    Abort,
}

impl RecoveryAction {
    fn value(self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

/// Ask the user how to continue after step `step` (zero-based) could not complete.
///
/// Unknown answers count as [`RecoveryAction::Abort`].
pub fn prompt_recovery(
    ui: &mut dyn UserInterface,
    step: usize,
    reason: &str,
) -> Result<RecoveryAction> {
    let options = vec![
        PromptOption::new("Retry this step", RecoveryAction::Retry.value()),
        PromptOption::new("Skip to the next step", RecoveryAction::Skip.value()),
        PromptOption::new("Abort playback", RecoveryAction::Abort.value()),
    ];

    let prompt = Prompt {
        key: RECOVERY_PROMPT_KEY.to_string(),
        question: format!(
            "Step {} did not complete ({}). How do you want to proceed?",
            step + 1,
            reason
        ),
        prompt_type: PromptType::Select { options },
        default: Some(RecoveryAction::Retry.value().to_string()),
    };

    let action = match ui.prompt(&prompt)?.as_string().as_str() {
        "retry" => RecoveryAction::Retry,
        "skip" => RecoveryAction::Skip,
        _ => RecoveryAction::Abort,
    };
    tracing::debug!(step, ?action, "recovery chosen");
    Ok(action)
}
