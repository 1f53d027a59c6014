//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::{BiteError, Result};

use super::{Prompt, PromptOption, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> BiteError {
    BiteError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user on `term`.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => {
            let default = prompt.default.as_deref().map(is_yes).unwrap_or(true);
            let answer = Confirm::with_theme(&prompt_theme())
                .with_prompt(&prompt.question)
                .default(default)
                .interact_on(term)
                .map_err(map_dialoguer_err)?;
            Ok(PromptResult::Bool(answer))
        }
        PromptType::Input => {
            let theme = prompt_theme();
            let mut input = Input::<String>::with_theme(&theme).with_prompt(&prompt.question);
            if let Some(default) = &prompt.default {
                input = input.default(default.clone());
            }
            let answer = input.interact_on(term).map_err(map_dialoguer_err)?;
            Ok(PromptResult::String(answer))
        }
        PromptType::Select { options } => {
            let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
            let selection = Select::with_theme(&prompt_theme())
                .with_prompt(&prompt.question)
                .items(&labels)
                .default(default_index(prompt, options))
                .interact_on(term)
                .map_err(map_dialoguer_err)?;
            Ok(PromptResult::String(options[selection].value.clone()))
        }
    }
}

/// Position of the option matching the prompt default, or the first option.
pub(crate) fn default_index(prompt: &Prompt, options: &[PromptOption]) -> usize {
    prompt
        .default
        .as_ref()
        .and_then(|d| options.iter().position(|o| o.value == *d))
        .unwrap_or(0)
}

/// Whether an answer string means yes.
pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "true" | "y" | "yes" | "1"
    )
}
