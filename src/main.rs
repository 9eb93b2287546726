//! modsh - modular command shell
//!
//! Interactive shell that runs modules against remote sessions, with
//! argument-aware tab completion for commands, module names, options and
//! paths.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode, restricted to Linux sessions
//! modsh -t linux
//! ```

use std::sync::Arc;

use modsh::cli::CliInterface;
use modsh::error::Result;
use modsh::modules::register_builtin;
use modsh::registry::{InMemoryRegistry, SessionFilter};
use modsh::repl::ReplEngine;
use modsh::shell::Shell;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive shell
fn run() -> Result<()> {
    let cli = CliInterface::new();

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.print_banner();

    run_interactive_mode(&cli)
}

/// Run application in interactive REPL mode
fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let config = cli.config();

    let registry = InMemoryRegistry::new();
    register_builtin(&registry)?;
    tracing::debug!("Registered {} built-in modules", registry.len());

    let filter = SessionFilter::targets(config.shell.targets.iter().cloned());
    let shell = Shell::new(Arc::new(registry), filter, config.completion.clone())?;

    let mut repl = ReplEngine::new(Arc::new(shell), &config.shell, &config.history)?;
    repl.run()?;

    if !cli.args().quiet {
        println!("Goodbye!");
    }
    Ok(())
}

/// Initialize logging system from the effective log level
///
/// # Arguments
/// * `cli` - CLI interface with the merged configuration
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
