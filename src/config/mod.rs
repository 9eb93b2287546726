//! Configuration management for modsh
//!
//! Configuration is read from a TOML file (`~/.modsh/config.toml` unless a
//! path is given on the command line). Every field has a default, so a
//! partial file or no file at all is valid.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Completion behaviour
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Interactive shell settings
    #[serde(default)]
    pub shell: ShellConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Offer dot-entries when completing paths
    #[serde(default = "default_show_hidden")]
    pub show_hidden: bool,

    /// Maximum number of suggestions shown (0 = unlimited)
    #[serde(default)]
    pub max_candidates: usize,
}

/// Interactive shell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Prompt text
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Targets selected at startup; empty selects every module
    #[serde(default)]
    pub targets: Vec<String>,

    /// Enable colored prompt
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Command history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_show_hidden() -> bool {
    true
}

fn default_prompt() -> String {
    "modsh".to_string()
}

fn default_color_output() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".modsh_history")
}

fn default_persist_history() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            show_hidden: default_show_hidden(),
            max_candidates: 0,
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            targets: Vec::new(),
            color_output: default_color_output(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from an explicit path, or the default path if present
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".modsh")
            .join("config.toml")
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Generic(e.to_string()).into())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.shell.prompt.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "shell.prompt".to_string(),
                value: self.shell.prompt.clone(),
            }
            .into());
        }

        if self.history.persist && self.history.file_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "history.file_path".to_string(),
                value: String::new(),
            }
            .into());
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.completion.show_hidden);
        assert_eq!(config.completion.max_candidates, 0);
        assert_eq!(config.shell.prompt, "modsh");
        assert!(config.shell.targets.is_empty());
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [completion]
            show_hidden = false

            [shell]
            targets = ["linux"]
            "#,
        )
        .unwrap();

        assert!(!config.completion.show_hidden);
        assert_eq!(config.shell.targets, vec!["linux".to_string()]);
        assert_eq!(config.shell.prompt, "modsh");
        assert_eq!(config.history.max_size, 1000);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[completion\nshow_hidden = 1").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Invalid config format"));
    }

    #[test]
    fn test_validate_empty_prompt() {
        let mut config = Config::default();
        config.shell.prompt = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut config = Config::default();
        config.completion.max_candidates = 25;
        config.logging.level = LogLevel::Debug;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = Config::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Config::load_from_file(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }
}
