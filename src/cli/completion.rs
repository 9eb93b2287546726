//! Shell completion generation for modsh
//!
//! Generates completion scripts for the `modsh` binary itself (bash, zsh,
//! fish). Completion inside the interactive shell is handled by
//! [`crate::completion`].

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli::CliArgs;
use crate::error::{ConfigError, ModshError, Result};

/// Print the completion script for `shell_name` to stdout.
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    let stdout = io::stdout();
    write_completion(shell, &mut stdout.lock())
}

/// Write the completion script for `shell` to `out`.
pub fn write_completion<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, "modsh", &mut buffer);
    out.write_all(&buffer)?;
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ModshError::Config(ConfigError::Generic(format!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell_name
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell() {
        assert!(matches!(parse_shell("bash"), Ok(Shell::Bash)));
        assert!(matches!(parse_shell("zsh"), Ok(Shell::Zsh)));
        assert!(matches!(parse_shell("fish"), Ok(Shell::Fish)));
        assert!(parse_shell("powershell").is_err());
    }

    #[test]
    fn test_parse_shell_case_insensitive() {
        assert!(matches!(parse_shell("BASH"), Ok(Shell::Bash)));
        assert!(matches!(parse_shell("FiSh"), Ok(Shell::Fish)));
    }

    #[test]
    fn test_bash_script_mentions_binary_and_targets() {
        let mut out = Vec::new();
        write_completion(Shell::Bash, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("modsh"));
        assert!(script.contains("--target"));
    }
}
