use std::{fmt, io};

/// Crate-wide `Result` type using [`ModshError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ModshError>;

/// Top-level error type for modsh operations.
#[derive(Debug)]
pub enum ModshError {
    /// Configuration errors.
    Config(ConfigError),

    /// Module registry errors.
    Registry(RegistryError),

    /// Completer spec construction errors.
    Spec(SpecError),

    /// Command line could not be evaluated.
    Command(String),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Module registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No module registered under this name.
    NotFound(String),

    /// A module with this name is already registered.
    Duplicate(String),

    /// Registry storage is unusable (poisoned lock).
    Unavailable,
}

/// Errors raised while building a completer spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The alias is already declared by another optional argument.
    DuplicateAlias(String),

    /// An optional argument was declared without any alias.
    MissingAlias,

    /// A positional slot was declared after the remainder slot.
    SlotAfterRemainder(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ModshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModshError::Config(e) => write!(f, "Configuration error: {e}"),
            ModshError::Registry(e) => write!(f, "Registry error: {e}"),
            ModshError::Spec(e) => write!(f, "Completer spec error: {e}"),
            ModshError::Command(msg) => write!(f, "{msg}"),
            ModshError::Io(e) => write!(f, "I/O error: {e}"),
            ModshError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotFound(name) => write!(f, "Module not found: {name}"),
            RegistryError::Duplicate(name) => write!(f, "Module already registered: {name}"),
            RegistryError::Unavailable => write!(f, "Module registry unavailable"),
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::DuplicateAlias(alias) => write!(f, "Duplicate option alias: {alias}"),
            SpecError::MissingAlias => write!(f, "Optional argument declared without alias"),
            SpecError::SlotAfterRemainder(name) => {
                write!(f, "Positional '{name}' declared after a remainder slot")
            }
        }
    }
}

impl std::error::Error for ModshError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for RegistryError {}
impl std::error::Error for SpecError {}

/* ========================= Conversions to ModshError ========================= */

impl From<io::Error> for ModshError {
    fn from(err: io::Error) -> Self {
        ModshError::Io(err)
    }
}

impl From<ConfigError> for ModshError {
    fn from(err: ConfigError) -> Self {
        ModshError::Config(err)
    }
}

impl From<RegistryError> for ModshError {
    fn from(err: RegistryError) -> Self {
        ModshError::Registry(err)
    }
}

impl From<SpecError> for ModshError {
    fn from(err: SpecError) -> Self {
        ModshError::Spec(err)
    }
}

impl From<String> for ModshError {
    fn from(msg: String) -> Self {
        ModshError::Generic(msg)
    }
}

impl From<&str> for ModshError {
    fn from(msg: &str) -> Self {
        ModshError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err: ModshError = RegistryError::NotFound("ps".to_string()).into();
        assert_eq!(err.to_string(), "Registry error: Module not found: ps");
    }

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::DuplicateAlias("-f".to_string());
        assert_eq!(err.to_string(), "Duplicate option alias: -f");
    }

    #[test]
    fn test_io_conversion() {
        let err: ModshError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ModshError::Io(_)));
    }
}
