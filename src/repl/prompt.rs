//! Custom prompt implementation for modsh

use std::borrow::Cow;

use nu_ansi_term::Color;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Prompt showing the shell name and the selected targets
pub struct ShellPrompt {
    /// Prompt text
    name: String,
    /// Targets selected for this session
    targets: Vec<String>,
    /// Paint the prompt
    color: bool,
}

impl ShellPrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `name` - Prompt text
    /// * `targets` - Selected targets, shown in brackets when non-empty
    /// * `color` - Whether to use ANSI colors
    ///
    /// # Returns
    /// * `Self` - New prompt
    pub fn new(name: impl Into<String>, targets: Vec<String>, color: bool) -> Self {
        Self {
            name: name.into(),
            targets,
            color,
        }
    }

    fn label(&self) -> String {
        if self.targets.is_empty() {
            self.name.clone()
        } else {
            format!("{}[{}]", self.name, self.targets.join(","))
        }
    }
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let label = self.label();
        if self.color {
            format!("{}> ", Color::Green.bold().paint(label)).into()
        } else {
            format!("{}> ", label).into()
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    /// The indicator is part of the left prompt.
    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
