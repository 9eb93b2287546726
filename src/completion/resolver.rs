//! Positional slot resolution
//!
//! Works out which positional slot of a [`CompleterSpec`] the cursor is in,
//! given the tokens typed so far. Optional arguments do not occupy slots:
//! a flag hides its own token, a value option hides its token and the value
//! following it. Once a remainder slot is reached it keeps every further
//! token.

use super::spec::{Arity, CompleterSpec};

/// Slot targeted by the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition {
    /// Index into the spec's positional slots
    pub index: usize,
    /// The slot absorbs every remaining token
    pub remainder: bool,
}

impl SlotPosition {
    /// The first slot, not in remainder mode.
    pub const START: SlotPosition = SlotPosition {
        index: 0,
        remainder: false,
    };

    fn remainder(index: usize) -> Self {
        Self {
            index,
            remainder: true,
        }
    }
}

/// Resolve the slot the cursor targets.
///
/// # Arguments
/// * `tokens` - Tokens typed for this command, including the in-progress one
///   when `text_empty` is false
/// * `text_empty` - The cursor sits after a separator, not inside a token
/// * `spec` - Declaration of the command
///
/// # Returns
/// * `SlotPosition` - Slot index, always within the declared slots
pub fn resolve_position<S: AsRef<str>>(
    tokens: &[S],
    text_empty: bool,
    spec: &CompleterSpec,
) -> SlotPosition {
    let slots = spec.slots();
    if tokens.is_empty() || slots.is_empty() {
        return SlotPosition::START;
    }

    let last_slot = slots.len() - 1;
    let last_token = tokens.len() - 1;

    let mut omit = 0usize;
    for (i, hidden) in omitted(tokens, text_empty, spec).into_iter().enumerate() {
        if i >= omit {
            let pos = i - omit;
            if pos > last_slot {
                return SlotPosition::remainder(last_slot);
            }
            if slots[pos].is_remainder() {
                return SlotPosition::remainder(pos);
            }
        }

        if hidden {
            omit += 1;
        }
    }

    let mut i = last_token;
    if text_empty {
        i += 1;
    }

    if i < omit {
        return SlotPosition::START;
    }

    let pos = i - omit;
    if pos > last_slot {
        return SlotPosition::remainder(last_slot);
    }

    SlotPosition {
        index: pos,
        remainder: slots[pos].is_remainder(),
    }
}

/// Indices of the tokens that fill positional slots, in order.
///
/// Uses the same omission rules as [`resolve_position`].
pub fn positional_indices<S: AsRef<str>>(
    tokens: &[S],
    text_empty: bool,
    spec: &CompleterSpec,
) -> Vec<usize> {
    omitted(tokens, text_empty, spec)
        .into_iter()
        .enumerate()
        .filter(|(_, hidden)| !hidden)
        .map(|(i, _)| i)
        .collect()
}

/// For every token, whether it belongs to an optional argument.
fn omitted<S: AsRef<str>>(tokens: &[S], text_empty: bool, spec: &CompleterSpec) -> Vec<bool> {
    let flags: Vec<&str> = spec.aliases_with_arity(Arity::Flag).collect();
    let valued: Vec<&str> = spec.aliases_with_arity(Arity::Value).collect();
    let last_token = tokens.len().saturating_sub(1);

    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let token = token.as_ref();
            let typing = !text_empty && i == last_token;
            matches_alias(token, &flags, typing)
                || matches_alias(token, &valued, typing)
                // value of the preceding option
                || (i >= 1 && valued.contains(&tokens[i - 1].as_ref()))
        })
        .collect()
}

/// Exact alias match, or a prefix of one while the token is still being typed.
fn matches_alias(token: &str, aliases: &[&str], typing: bool) -> bool {
    aliases
        .iter()
        .any(|alias| *alias == token || (typing && alias.starts_with(token)))
}
