//! Completion context
//!
//! A [`CompletionContext`] is built for a single Tab press and dropped when the
//! completion call returns. It bundles the collaborators the completers need
//! with the mutable parse state of the command level being completed.

use std::sync::Arc;

use crate::config::CompletionConfig;
use crate::parser::ParsedArgs;
use crate::registry::{ModuleRegistry, SessionFilter};

/// Per-request completion state
#[derive(Clone)]
pub struct CompletionContext {
    /// Registered modules
    pub registry: Arc<dyn ModuleRegistry>,

    /// Selection of the active sessions
    pub filter: SessionFilter,

    /// Completion settings
    pub config: Arc<CompletionConfig>,

    /// Tokens typed for the current command level, including the token under
    /// the cursor when it is non-empty
    pub tokens: Vec<String>,

    /// Parsed-so-far record
    pub parsed: ParsedArgs,

    /// Indices into `tokens` of the tokens filling positional slots, set by
    /// the dispatcher before a slot completer runs
    pub positionals: Vec<usize>,
}

impl CompletionContext {
    pub fn new(
        registry: Arc<dyn ModuleRegistry>,
        filter: SessionFilter,
        config: Arc<CompletionConfig>,
    ) -> Self {
        Self {
            registry,
            filter,
            config,
            tokens: Vec::new(),
            parsed: ParsedArgs::default(),
            positionals: Vec::new(),
        }
    }

    /// Set the typed tokens of the command level.
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Descend into a nested command: `tokens` become the current level and
    /// the parse state starts over.
    pub fn descend(&mut self, tokens: Vec<String>) {
        self.tokens = tokens;
        self.parsed = ParsedArgs::default();
        self.positionals.clear();
    }
}
