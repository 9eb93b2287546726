//! Completer spec definitions
//!
//! A [`CompleterSpec`] is the per-command declaration the dispatcher works
//! from: an ordered list of positional [`ArgumentSlot`]s and a set of
//! [`OptionalArgument`]s, each bound to the completer that fills it. Specs are
//! built once when a command or module is registered and shared read-only
//! afterwards.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::completer::{Completer, CompleterRef};
use crate::error::SpecError;
use crate::parser::ArgParser;

/// Prefix marking an optional argument alias.
pub const OPTION_PREFIX: &str = "-";

/// How many tokens a positional slot absorbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Exactly one token.
    Single,
    /// Every token from this position on.
    Remainder,
}

/// How many value tokens an optional argument consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Toggle, consumes only its own token.
    Flag,
    /// Consumes the following token as its value.
    Value,
}

/// One positional declaration.
#[derive(Clone)]
pub struct ArgumentSlot {
    name: String,
    kind: SlotKind,
    completer: Option<CompleterRef>,
}

impl ArgumentSlot {
    pub fn new(name: impl Into<String>, kind: SlotKind, completer: Option<CompleterRef>) -> Self {
        Self {
            name: name.into(),
            kind,
            completer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn is_remainder(&self) -> bool {
        self.kind == SlotKind::Remainder
    }

    pub fn completer(&self) -> Option<&CompleterRef> {
        self.completer.as_ref()
    }
}

/// One optional argument, reachable through any of its aliases.
#[derive(Clone)]
pub struct OptionalArgument {
    aliases: Vec<String>,
    arity: Arity,
    completer: Option<CompleterRef>,
}

impl OptionalArgument {
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn completer(&self) -> Option<&CompleterRef> {
        self.completer.as_ref()
    }
}

/// Immutable completion declaration of a command.
#[derive(Clone, Default)]
pub struct CompleterSpec {
    slots: Vec<ArgumentSlot>,
    options: Vec<OptionalArgument>,
    parser: Option<Arc<dyn ArgParser>>,
}

impl CompleterSpec {
    /// Start building a spec
    pub fn builder() -> CompleterSpecBuilder {
        CompleterSpecBuilder::default()
    }

    /// Positional slots in declaration order
    pub fn slots(&self) -> &[ArgumentSlot] {
        &self.slots
    }

    /// Optional arguments in declaration order
    pub fn options(&self) -> &[OptionalArgument] {
        &self.options
    }

    /// Parser used for best-effort refinement of the parsed state
    pub fn parser(&self) -> Option<&Arc<dyn ArgParser>> {
        self.parser.as_ref()
    }

    /// Every alias in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .flat_map(|opt| opt.aliases.iter().map(String::as_str))
    }

    /// Aliases of optional arguments with the given arity.
    pub fn aliases_with_arity(&self, arity: Arity) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(move |opt| opt.arity == arity)
            .flat_map(|opt| opt.aliases.iter().map(String::as_str))
    }

    /// Find the optional argument declaring `alias` exactly.
    pub fn option(&self, alias: &str) -> Option<&OptionalArgument> {
        self.options
            .iter()
            .find(|opt| opt.aliases.iter().any(|a| a == alias))
    }

    /// Completer bound to positional slot `index`, if any.
    pub fn slot_completer(&self, index: usize) -> Option<&CompleterRef> {
        self.slots.get(index).and_then(ArgumentSlot::completer)
    }
}

impl fmt::Debug for CompleterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<_> = self.slots.iter().map(|s| (&s.name, s.kind)).collect();
        let options: Vec<_> = self.options.iter().map(|o| (&o.aliases, o.arity)).collect();
        f.debug_struct("CompleterSpec")
            .field("slots", &slots)
            .field("options", &options)
            .field("parser", &self.parser.is_some())
            .finish()
    }
}

/// Builder for [`CompleterSpec`]; alias uniqueness is checked in [`build`](Self::build).
#[derive(Default)]
pub struct CompleterSpecBuilder {
    slots: Vec<ArgumentSlot>,
    options: Vec<OptionalArgument>,
    parser: Option<Arc<dyn ArgParser>>,
}

impl CompleterSpecBuilder {
    /// Add a single-token positional slot.
    pub fn positional(self, name: &str, completer: impl Completer + 'static) -> Self {
        self.slot(ArgumentSlot::new(
            name,
            SlotKind::Single,
            Some(Arc::new(completer)),
        ))
    }

    /// Add a positional slot that absorbs every remaining token.
    pub fn remainder(self, name: &str, completer: impl Completer + 'static) -> Self {
        self.slot(ArgumentSlot::new(
            name,
            SlotKind::Remainder,
            Some(Arc::new(completer)),
        ))
    }

    /// Add a prebuilt slot (possibly without a completer).
    pub fn slot(mut self, slot: ArgumentSlot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Add an optional argument taking one value.
    pub fn option<I, S>(self, aliases: I, completer: impl Completer + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional(aliases, Arity::Value, Some(Arc::new(completer)))
    }

    /// Add a zero-value toggle.
    pub fn flag<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional(aliases, Arity::Flag, None)
    }

    /// Add an optional argument with explicit arity and completer.
    pub fn optional<I, S>(mut self, aliases: I, arity: Arity, completer: Option<CompleterRef>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.push(OptionalArgument {
            aliases: aliases.into_iter().map(Into::into).collect(),
            arity,
            completer,
        });
        self
    }

    /// Attach the argument parser used for best-effort reparsing.
    pub fn parser(mut self, parser: impl ArgParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Validate and freeze the declaration.
    pub fn build(self) -> Result<CompleterSpec, SpecError> {
        let mut seen = HashSet::new();
        for opt in &self.options {
            if opt.aliases.is_empty() {
                return Err(SpecError::MissingAlias);
            }
            for alias in &opt.aliases {
                if !seen.insert(alias.as_str()) {
                    return Err(SpecError::DuplicateAlias(alias.clone()));
                }
            }
        }

        if let Some(pos) = self.slots.iter().position(ArgumentSlot::is_remainder) {
            if let Some(extra) = self.slots.get(pos + 1) {
                return Err(SpecError::SlotAfterRemainder(extra.name.clone()));
            }
        }

        Ok(CompleterSpec {
            slots: self.slots,
            options: self.options,
            parser: self.parser,
        })
    }
}
