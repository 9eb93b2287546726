//! Argument-aware tab completion
//!
//! Commands declare their positional slots and optional arguments in a
//! [`CompleterSpec`]. On Tab the shell builds a [`CompletionContext`] and
//! calls [`Completer::complete`] on the command's spec, which:
//!
//! 1. completes an option value when the previous word is a value option,
//! 2. otherwise resolves the positional slot under the cursor,
//! 3. completes option names when the text starts with `-`,
//! 4. otherwise delegates to the completer bound to the slot.
//!
//! Candidates carry their own trailing separator: a space after a finished
//! value, the path separator after a directory.

pub mod completer;
pub mod context;
pub mod dispatcher;
pub mod leaves;
pub mod module;
pub mod resolver;
pub mod spec;

pub use completer::{Completer, CompleterRef, PATH_SEPARATOR, VALUE_SEPARATOR, terminal, traversable};
pub use context::CompletionContext;
pub use leaves::{DirEntryInfo, FileSystem, ListCompleter, LocalFileSystem, PathCompleter, VoidCompleter};
pub use module::{MODULE_ARG, ModuleArgsCompleter, ModuleNameCompleter};
pub use resolver::{SlotPosition, resolve_position};
pub use spec::{ArgumentSlot, Arity, CompleterSpec, CompleterSpecBuilder, OPTION_PREFIX, OptionalArgument, SlotKind};
