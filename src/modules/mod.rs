//! Built-in module catalogue
//!
//! Every module pairs a clap command (used to parse its arguments) with the
//! completer spec used for Tab completion. Both declare the option aliases;
//! a test checks that they agree.

use clap::{Arg, ArgAction, Command};

use crate::completion::{CompleterSpec, ListCompleter, PathCompleter, VoidCompleter};
use crate::error::Result;
use crate::parser::ClapArgParser;
use crate::registry::{InMemoryRegistry, ModuleDescriptor};

/// Targets a session can run on.
pub const TARGETS: [&str; 3] = ["linux", "windows", "darwin"];

/// Build every built-in module.
pub fn builtin_modules() -> Result<Vec<ModuleDescriptor>> {
    Ok(vec![
        download()?,
        ls()?,
        ps()?,
        screenshot()?,
        shell()?,
        upload()?,
    ])
}

/// Register the built-in modules into `registry`.
pub fn register_builtin(registry: &InMemoryRegistry) -> Result<()> {
    for module in builtin_modules()? {
        registry.register(module)?;
    }
    Ok(())
}

fn flag(id: &'static str, short: char, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(long)
        .help(help)
        .action(ArgAction::SetTrue)
}

fn ps() -> Result<ModuleDescriptor> {
    let command = Command::new("ps")
        .about("List processes")
        .arg(flag("all", 'a', "all", "Show processes of every user"))
        .arg(flag("wide", 'w', "wide", "Do not truncate command lines"))
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_parser(["pid", "name", "user", "cpu"])
                .help("Sort column"),
        )
        .arg(Arg::new("filter").help("Only show processes matching this name"));

    let spec = CompleterSpec::builder()
        .positional("filter", VoidCompleter)
        .flag(["-a", "--all"])
        .flag(["-w", "--wide"])
        .option(["-s", "--sort"], ListCompleter::new(["pid", "name", "user", "cpu"]))
        .parser(ClapArgParser::new(command))
        .build()?;

    Ok(ModuleDescriptor::new("ps", "List processes", spec))
}

fn shell() -> Result<ModuleDescriptor> {
    let command = Command::new("shell")
        .about("Start an interactive program")
        .arg(
            Arg::new("timeout")
                .short('T')
                .long("timeout")
                .value_name("SECONDS")
                .help("Kill the program after this many seconds"),
        )
        .arg(Arg::new("program").required(true).help("Program to start"))
        .arg(
            Arg::new("args")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Program arguments"),
        );

    let spec = CompleterSpec::builder()
        .positional("program", PathCompleter::new())
        .remainder("args", PathCompleter::new())
        .option(["-T", "--timeout"], VoidCompleter)
        .parser(ClapArgParser::new(command))
        .build()?;

    Ok(ModuleDescriptor::new("shell", "Start an interactive program", spec)
        .with_compatibility(["linux", "darwin"]))
}

fn upload() -> Result<ModuleDescriptor> {
    let command = Command::new("upload")
        .about("Copy a local file to the target")
        .arg(flag("force", 'f', "force", "Overwrite an existing remote file"))
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .help("Permissions of the remote file"),
        )
        .arg(Arg::new("local").required(true).help("Local file"))
        .arg(Arg::new("remote").help("Remote destination"));

    let spec = CompleterSpec::builder()
        .positional("local", PathCompleter::new())
        .positional("remote", VoidCompleter)
        .flag(["-f", "--force"])
        .option(["-m", "--mode"], ListCompleter::new(["600", "644", "755"]))
        .parser(ClapArgParser::new(command))
        .build()?;

    Ok(ModuleDescriptor::new("upload", "Copy a local file to the target", spec))
}

fn download() -> Result<ModuleDescriptor> {
    let command = Command::new("download")
        .about("Copy a remote file to this machine")
        .arg(flag("force", 'f', "force", "Overwrite an existing local file"))
        .arg(Arg::new("remote").required(true).help("Remote file"))
        .arg(Arg::new("local").help("Local destination"));

    let spec = CompleterSpec::builder()
        .positional("remote", VoidCompleter)
        .positional("local", PathCompleter::new())
        .flag(["-f", "--force"])
        .parser(ClapArgParser::new(command))
        .build()?;

    Ok(ModuleDescriptor::new("download", "Copy a remote file to this machine", spec))
}

fn ls() -> Result<ModuleDescriptor> {
    let command = Command::new("ls")
        .about("List a remote directory")
        .arg(flag("long", 'l', "long", "Show sizes and permissions"))
        .arg(flag("recursive", 'r', "recursive", "Descend into subdirectories"))
        .arg(Arg::new("path").help("Directory to list"));

    let spec = CompleterSpec::builder()
        .positional("path", VoidCompleter)
        .flag(["-l", "--long"])
        .flag(["-r", "--recursive"])
        .parser(ClapArgParser::new(command))
        .build()?;

    Ok(ModuleDescriptor::new("ls", "List a remote directory", spec))
}

fn screenshot() -> Result<ModuleDescriptor> {
    let command = Command::new("screenshot")
        .about("Capture the target's screen")
        .arg(
            Arg::new("monitor")
                .short('M')
                .long("monitor")
                .value_parser(["all", "primary"])
                .help("Monitor to capture"),
        )
        .arg(Arg::new("output").help("Local file to write"));

    let spec = CompleterSpec::builder()
        .positional("output", PathCompleter::new())
        .option(["-M", "--monitor"], ListCompleter::new(["all", "primary"]))
        .parser(ClapArgParser::new(command))
        .build()?;

    Ok(ModuleDescriptor::new("screenshot", "Capture the target's screen", spec)
        .with_compatibility(["windows", "darwin"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ModuleRegistry, SessionFilter};

    #[test]
    fn test_register_builtin() {
        let registry = InMemoryRegistry::new();
        register_builtin(&registry).unwrap();
        assert_eq!(registry.len(), builtin_modules().unwrap().len());
        assert!(registry.get_module("upload").is_ok());
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = InMemoryRegistry::new();
        register_builtin(&registry).unwrap();
        assert!(register_builtin(&registry).is_err());
    }

    #[test]
    fn test_linux_sessions_hide_screenshot() {
        let registry = InMemoryRegistry::new();
        register_builtin(&registry).unwrap();

        let names: Vec<String> = registry
            .iter_modules(&SessionFilter::targets(["linux"]))
            .unwrap()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["download", "ls", "ps", "shell", "upload"]);
    }

    #[test]
    fn test_spec_aliases_match_parser() {
        for module in builtin_modules().unwrap() {
            let parser = module.spec().parser().expect("module without parser");
            let help = parser.help().unwrap();
            for alias in module.spec().aliases() {
                assert!(
                    help.contains(alias),
                    "{}: alias {} missing from parser",
                    module.name(),
                    alias
                );
            }
        }
    }
}
