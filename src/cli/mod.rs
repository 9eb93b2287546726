//! Command-line interface for modsh
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Subcommands that run without starting the shell

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::modules::TARGETS;

/// Modular command shell with argument-aware tab completion
#[derive(Parser, Debug)]
#[command(
    name = "modsh",
    version,
    about = "Modular command shell",
    long_about = "An interactive shell that runs modules against remote sessions, with
tab completion for commands, module names, options and paths."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Select sessions on this target (repeatable)
    #[arg(short = 't', long = "target", value_name = "TARGET", value_parser = TARGETS)]
    pub targets: Vec<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for modsh
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    pub fn new() -> Self {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Self {
        let config = Self::load_config(&args);
        Self { args, config }
    }

    /// Load configuration from file and merge with arguments
    ///
    /// An unreadable or invalid file is reported and replaced by defaults.
    fn load_config(args: &CliArgs) -> Config {
        let mut config = match Config::load_from_file(args.config_file.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}", e);
                eprintln!("Using default configuration instead.");
                Config::default()
            }
        };

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        config
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Override configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.shell.color_output = false;
        }

        if !args.targets.is_empty() {
            config.shell.targets = args.targets.clone();
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show_version(&self) {
        println!("modsh version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    fn validate_config_file(&self) {
        let path = self.config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return;
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }
    }

    fn show_config(&self) -> Result<()> {
        println!("Configuration file: {}", self.config_path().display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_string()?);
        Ok(())
    }

    /// Configuration file path (from args or default)
    fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Print banner with version and selected targets
    pub fn print_banner(&self) {
        if self.args.quiet {
            return;
        }
        println!("modsh {}", env!("CARGO_PKG_VERSION"));
        if !self.config.shell.targets.is_empty() {
            println!("Targets: {}", self.config.shell.targets.join(", "));
        }
        println!("Type 'help' for commands, Tab to complete, 'exit' to quit");
    }
}

impl Default for CliInterface {
    fn default() -> Self {
        Self::new()
    }
}
