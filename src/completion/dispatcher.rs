//! Completion dispatch
//!
//! A [`CompleterSpec`] is itself a [`Completer`]: it decides whether the cursor
//! is filling an option value, typing an option name, or sitting in a
//! positional slot, and hands the request to the matching completer.

use super::completer::{Completer, terminal};
use super::context::CompletionContext;
use super::resolver::{positional_indices, resolve_position};
use super::spec::{Arity, CompleterSpec, OPTION_PREFIX};
use crate::parser::{ParseOutcome, ParsedArgs};

impl Completer for CompleterSpec {
    fn complete(
        &self,
        text: &str,
        line: &str,
        start: usize,
        end: usize,
        ctx: &mut CompletionContext,
    ) -> Vec<String> {
        // Cursor right after a value option: complete its value.
        if let Some(option) = last_token(line, start).and_then(|t| self.option(t)) {
            if option.arity() == Arity::Value {
                return match option.completer() {
                    Some(completer) => completer.complete(text, line, start, end, ctx),
                    None => {
                        tracing::debug!("No completer bound to option {:?}", option.aliases());
                        Vec::new()
                    }
                };
            }
        }

        let position = resolve_position(&ctx.tokens, text.is_empty(), self);

        if text.starts_with(OPTION_PREFIX) && !position.remainder {
            return self
                .aliases()
                .filter(|alias| alias.starts_with(text))
                .map(terminal)
                .collect();
        }

        let Some(completer) = self.slot_completer(position.index) else {
            tracing::debug!("No completer bound to positional slot {}", position.index);
            return Vec::new();
        };

        ctx.positionals = positional_indices(&ctx.tokens, text.is_empty(), self);
        self.refine(ctx);
        completer.complete(text, line, start, end, ctx)
    }
}

impl CompleterSpec {
    /// Best-effort reparse of the typed tokens; failures keep the prior state.
    fn refine(&self, ctx: &mut CompletionContext) {
        let Some(parser) = self.parser() else {
            return;
        };
        if ctx.tokens.is_empty() {
            return;
        }

        match parser.parse_known(&ctx.tokens) {
            ParseOutcome::Success { parsed, leftover } => {
                ctx.parsed = ParsedArgs::new(parsed, leftover);
            }
            ParseOutcome::RecoverableFailure(reason) => {
                tracing::trace!("Keeping previous parse state: {}", reason.trim());
            }
        }
    }
}

/// Word immediately before the token that starts at `start`.
///
/// The first word of the line has no predecessor.
fn last_token(line: &str, start: usize) -> Option<&str> {
    let before = line.get(..start)?.trim_end();
    let (_, last) = before.rsplit_once(char::is_whitespace)?;
    let last = last.trim();
    (!last.is_empty()).then_some(last)
}
