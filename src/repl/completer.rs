//! Completer for reedline - turns shell completion candidates into suggestions

use std::sync::Arc;

use reedline::{Completer, Span, Suggestion};

use crate::completion::VALUE_SEPARATOR;
use crate::shell::Shell;

/// reedline adapter over [`Shell::complete`]
pub struct ShellCompleter {
    shell: Arc<Shell>,
}

impl ShellCompleter {
    pub fn new(shell: Arc<Shell>) -> Self {
        Self { shell }
    }
}

impl Completer for ShellCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - List of completion suggestions
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let (start, candidates) = self.shell.complete(line, pos);

        candidates
            .into_iter()
            .map(|candidate| suggestion(candidate, Span::new(start, pos)))
            .collect()
    }
}

/// A trailing value separator becomes reedline's own whitespace handling.
fn suggestion(candidate: String, span: Span) -> Suggestion {
    let (value, append_whitespace) = match candidate.strip_suffix(VALUE_SEPARATOR) {
        Some(value) => (value.to_string(), true),
        None => (candidate, false),
    };

    Suggestion {
        value,
        description: None,
        style: None,
        extra: None,
        span,
        append_whitespace,
        match_indices: None,
    }
}
