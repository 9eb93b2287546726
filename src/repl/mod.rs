//! REPL (Read-Eval-Print Loop) engine for modsh
//!
//! This module provides the interactive front-end:
//! - Line editing and history with reedline
//! - Tab completion through a columnar menu fed by [`ShellCompleter`]
//! - A prompt listing the selected targets

pub mod completer;
pub mod prompt;

use std::sync::Arc;

use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};

use crate::config::{HistoryConfig, ShellConfig};
use crate::error::{ModshError, Result};
use crate::shell::{Outcome, Shell};

pub use completer::ShellCompleter;
pub use prompt::ShellPrompt;

const COMPLETION_MENU: &str = "completion_menu";

/// REPL engine for interactive command input
pub struct ReplEngine {
    /// Line editor
    editor: Reedline,

    /// Prompt shown before every line
    prompt: ShellPrompt,

    /// Command table used for evaluation and completion
    shell: Arc<Shell>,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `shell` - Command table
    /// * `shell_config` - Prompt settings
    /// * `history_config` - History configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(
        shell: Arc<Shell>,
        shell_config: &ShellConfig,
        history_config: &HistoryConfig,
    ) -> Result<Self> {
        let history = if history_config.persist {
            FileBackedHistory::with_file(history_config.max_size, history_config.file_path.clone())
        } else {
            FileBackedHistory::new(history_config.max_size)
        }
        .map_err(|e| ModshError::Generic(format!("Failed to open history: {}", e)))?;

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);
        let editor = Reedline::create()
            .with_history(Box::new(history))
            .with_completer(Box::new(ShellCompleter::new(Arc::clone(&shell))))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        let prompt = ShellPrompt::new(
            shell_config.prompt.clone(),
            shell_config.targets.clone(),
            shell_config.color_output,
        );

        Ok(Self {
            editor,
            prompt,
            shell,
        })
    }

    /// Read and evaluate lines until the user leaves.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.read_line(&self.prompt)? {
                Signal::Success(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match self.shell.eval(&line) {
                        Ok(Outcome::Output(text)) => {
                            if !text.is_empty() {
                                println!("{}", text);
                            }
                        }
                        Ok(Outcome::Exit) => break,
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Signal::CtrlC => {
                    tracing::debug!("Line discarded");
                }
                // Ctrl-D
                _ => break,
            }
        }

        Ok(())
    }
}
