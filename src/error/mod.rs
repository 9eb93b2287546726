//! Error handling module for modsh.
//!
//! Completion itself never surfaces errors to the shell: every failure on the
//! completion path degrades to an empty candidate list. The types here cover
//! the fallible edges around it (configuration loading, module registration,
//! completer spec construction, line evaluation).

pub mod kinds;

pub use kinds::{ConfigError, ModshError, RegistryError, Result, SpecError};
