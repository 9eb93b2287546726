//! Completer capability
//!
//! Every source of completion candidates implements [`Completer`]. Positional
//! slots and optional arguments of a [`CompleterSpec`](super::CompleterSpec)
//! hold a [`CompleterRef`] so leaf completers and nested specs are
//! interchangeable.

use std::path::MAIN_SEPARATOR;
use std::sync::Arc;

use super::context::CompletionContext;

/// Separator appended to a terminal value candidate.
pub const VALUE_SEPARATOR: char = ' ';

/// Separator appended to a traversable path candidate.
pub const PATH_SEPARATOR: char = MAIN_SEPARATOR;

/// Produces completion candidates for the token under the cursor.
pub trait Completer: Send + Sync {
    /// Complete `text`, the in-progress token.
    ///
    /// # Arguments
    /// * `text` - Text of the token being completed (may be empty)
    /// * `line` - Full input line
    /// * `start` - Byte offset in `line` where `text` begins
    /// * `end` - Byte offset in `line` where `text` ends (the cursor)
    /// * `ctx` - Per-request completion context
    ///
    /// # Returns
    /// * `Vec<String>` - Candidates, each carrying its trailing separator
    fn complete(
        &self,
        text: &str,
        line: &str,
        start: usize,
        end: usize,
        ctx: &mut CompletionContext,
    ) -> Vec<String>;
}

/// Shared handle to a completer.
pub type CompleterRef = Arc<dyn Completer>;

/// Candidate for a value that ends the token.
pub fn terminal(value: impl Into<String>) -> String {
    let mut value = value.into();
    value.push(VALUE_SEPARATOR);
    value
}

/// Candidate for a path segment that can be completed further.
pub fn traversable(value: impl Into<String>) -> String {
    let mut value = value.into();
    value.push(PATH_SEPARATOR);
    value
}
