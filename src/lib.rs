//! Modular command shell library
//!
//! This library provides the building blocks of the modsh shell, with the
//! argument-aware tab completion subsystem at its core.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: Completer specs, position resolution and dispatch
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `modules`: Built-in module catalogue
//! - `parser`: Argument parsing collaborator and tokenizer
//! - `registry`: Module registry and session filtering
//! - `repl`: Interactive REPL engine
//! - `shell`: Top-level shell commands
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use modsh::completion::{CompleterSpec, ListCompleter};
//! use modsh::config::CompletionConfig;
//! use modsh::registry::{InMemoryRegistry, ModuleDescriptor, SessionFilter};
//! use modsh::shell::Shell;
//!
//! fn main() -> modsh::Result<()> {
//!     let registry = InMemoryRegistry::new();
//!     let spec = CompleterSpec::builder()
//!         .positional("field", ListCompleter::new(["pid", "name"]))
//!         .flag(["-a", "--all"])
//!         .build()?;
//!     registry.register(ModuleDescriptor::new("ps", "List processes", spec))?;
//!
//!     let shell = Shell::new(Arc::new(registry), SessionFilter::all(), CompletionConfig::default())?;
//!     let (start, candidates) = shell.complete("run ps ", 7);
//!     println!("{start}: {candidates:?}");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod modules;
pub mod parser;
pub mod registry;
pub mod repl;
pub mod shell;

// Re-export commonly used types
pub use completion::{Completer, CompleterSpec, CompletionContext};
pub use config::Config;
pub use error::{ModshError, Result};
pub use registry::{InMemoryRegistry, ModuleRegistry};
pub use repl::ReplEngine;
pub use shell::Shell;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
