//! Shell front-end commands
//!
//! The shell owns a small table of top-level commands (`run`, `modules`,
//! `help`, `exit`). Completion picks the command named by the first word and
//! lets its completer spec handle the rest of the line. Evaluation is a dry
//! run: arguments are parsed and reported, nothing is sent to a target.

use std::fmt::Write as _;
use std::sync::Arc;

use clap::{Arg, ArgAction};

use crate::completion::{
    Completer, CompleterSpec, CompletionContext, ListCompleter, MODULE_ARG, ModuleArgsCompleter,
    ModuleNameCompleter, terminal,
};
use crate::config::CompletionConfig;
use crate::error::{ModshError, Result};
use crate::modules::TARGETS;
use crate::parser::{ClapArgParser, ParseOutcome, ParsedArgs, tokenize};
use crate::registry::{ModuleDescriptor, ModuleRegistry, SessionFilter};

/// A top-level shell command
#[derive(Debug, Clone)]
pub struct ShellCommand {
    name: &'static str,
    about: &'static str,
    spec: Arc<CompleterSpec>,
}

impl ShellCommand {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn about(&self) -> &str {
        self.about
    }

    pub fn spec(&self) -> &CompleterSpec {
        &self.spec
    }
}

/// Result of evaluating one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to print
    Output(String),
    /// The user asked to leave the shell
    Exit,
}

/// Command table plus the collaborators completion needs
pub struct Shell {
    commands: Vec<ShellCommand>,
    registry: Arc<dyn ModuleRegistry>,
    filter: SessionFilter,
    config: Arc<CompletionConfig>,
}

impl Shell {
    /// Create a shell over `registry`.
    ///
    /// # Arguments
    /// * `registry` - Modules available to `run`
    /// * `filter` - Selection of the active sessions
    /// * `config` - Completion settings
    ///
    /// # Returns
    /// * `Result<Self>` - New shell, or an error if a command declaration is invalid
    pub fn new(
        registry: Arc<dyn ModuleRegistry>,
        filter: SessionFilter,
        config: CompletionConfig,
    ) -> Result<Self> {
        Ok(Self {
            commands: builtin_commands()?,
            registry,
            filter,
            config: Arc::new(config),
        })
    }

    pub fn commands(&self) -> &[ShellCommand] {
        &self.commands
    }

    pub fn filter(&self) -> &SessionFilter {
        &self.filter
    }

    fn command(&self, name: &str) -> Option<&ShellCommand> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Complete `line` with the cursor at byte offset `pos`.
    ///
    /// # Returns
    /// * `(usize, Vec<String>)` - Byte offset where the replaced word starts,
    ///   and the candidates for it
    pub fn complete(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let before = line.get(..pos).unwrap_or(line);
        let start = before
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let text = &before[start..];

        let mut candidates = match before[..start].split_whitespace().next() {
            None => self
                .commands
                .iter()
                .map(|c| c.name)
                .filter(|name| name.starts_with(text))
                .map(terminal)
                .collect(),
            Some(name) => match self.command(name) {
                Some(command) => {
                    let mut tokens = tokenize(before);
                    if !tokens.is_empty() {
                        tokens.remove(0);
                    }
                    let mut ctx = CompletionContext::new(
                        Arc::clone(&self.registry),
                        self.filter.clone(),
                        Arc::clone(&self.config),
                    )
                    .with_tokens(tokens);
                    command
                        .spec
                        .complete(text, before, start, before.len(), &mut ctx)
                }
                None => {
                    tracing::debug!("No completion for unknown command '{}'", name);
                    Vec::new()
                }
            },
        };

        if self.config.max_candidates > 0 {
            candidates.truncate(self.config.max_candidates);
        }

        (start, candidates)
    }

    /// Evaluate one line.
    pub fn eval(&self, line: &str) -> Result<Outcome> {
        let tokens = tokenize(line);
        let Some((name, args)) = tokens.split_first() else {
            return Ok(Outcome::Output(String::new()));
        };

        let command = self
            .command(name)
            .ok_or_else(|| ModshError::Command(format!("unknown command '{}'", name)))?;

        match command.name {
            "run" => self.eval_run(command, args),
            "modules" => self.eval_modules(command, args),
            "help" => self.eval_help(command, args),
            "exit" | "quit" => Ok(Outcome::Exit),
            other => Err(ModshError::Command(format!("'{}' is not implemented", other))),
        }
    }

    fn eval_run(&self, command: &ShellCommand, args: &[String]) -> Result<Outcome> {
        let parsed = lenient_parse(command.spec(), args)?;
        let name = parsed
            .value(MODULE_ARG)
            .ok_or_else(|| ModshError::Command("missing module name".to_string()))?;

        // Options of `run` end at the module name; the rest belongs to the module.
        let index = args.iter().position(|t| t == name).unwrap_or(0);
        let run_args = strict_parse(command.spec(), &args[..=index])?;
        let module_args = &args[index + 1..];

        let module = self.registry.get_module(name)?;
        let filter = self.effective_filter(&run_args);
        if !filter.accepts(&module) {
            return Err(ModshError::Command(format!(
                "module '{}' is not available on {}",
                module.name(),
                describe_targets(&filter)
            )));
        }

        let module_parsed = strict_parse(module.spec(), module_args)?;

        let mut out = format!("dry run: {} on {}", module.name(), describe_targets(&filter));
        if run_args.value("background") == Some("true") {
            out.push_str(" (background)");
        }
        for (id, values) in &module_parsed.values {
            let _ = write!(out, "\n  {} = {}", id, values.join(" "));
        }

        tracing::info!("Dry run of module '{}'", module.name());
        Ok(Outcome::Output(out))
    }

    fn eval_modules(&self, command: &ShellCommand, args: &[String]) -> Result<Outcome> {
        let parsed = strict_parse(command.spec(), args)?;
        let filter = self.effective_filter(&parsed);
        let modules = self.registry.iter_modules(&filter)?;

        Ok(Outcome::Output(format_table(
            modules.iter().map(|m| (m.name(), m.description())),
        )))
    }

    fn eval_help(&self, command: &ShellCommand, args: &[String]) -> Result<Outcome> {
        let parsed = strict_parse(command.spec(), args)?;
        let Some(topic) = parsed.value("command") else {
            return Ok(Outcome::Output(format_table(
                self.commands.iter().map(|c| (c.name, c.about)),
            )));
        };

        let help = match self.command(topic) {
            Some(command) => command.spec().parser().and_then(|p| p.help()),
            None => {
                let module = self.registry.get_module(topic)?;
                module_help(&module)
            }
        };

        Ok(Outcome::Output(
            help.unwrap_or_else(|| format!("{}: no arguments", topic)),
        ))
    }

    /// Targets named on the command line, or the session filter.
    fn effective_filter(&self, parsed: &ParsedArgs) -> SessionFilter {
        let targets = parsed.values("target");
        if targets.is_empty() {
            self.filter.clone()
        } else {
            SessionFilter::targets(targets.iter().cloned())
        }
    }
}

/// Parse `args` with the spec's parser, keeping unclaimed tokens as remaining.
fn lenient_parse(spec: &CompleterSpec, args: &[String]) -> Result<ParsedArgs> {
    let Some(parser) = spec.parser() else {
        return Ok(ParsedArgs::new(Default::default(), args.to_vec()));
    };

    match parser.parse_known(args) {
        ParseOutcome::Success { parsed, leftover } => Ok(ParsedArgs::new(parsed, leftover)),
        ParseOutcome::RecoverableFailure(reason) => Err(ModshError::Command(
            reason
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string(),
        )),
    }
}

/// Parse `args`, rejecting anything the parser did not claim.
fn strict_parse(spec: &CompleterSpec, args: &[String]) -> Result<ParsedArgs> {
    let parsed = lenient_parse(spec, args)?;
    match parsed.remaining.first() {
        Some(arg) => Err(ModshError::Command(format!("unexpected argument '{}'", arg))),
        None => Ok(parsed),
    }
}

fn module_help(module: &ModuleDescriptor) -> Option<String> {
    module.spec().parser().and_then(|p| p.help())
}

fn describe_targets(filter: &SessionFilter) -> String {
    if filter.target_names().is_empty() {
        "all sessions".to_string()
    } else {
        filter.target_names().join(", ")
    }
}

fn format_table<'a>(rows: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let rows: Vec<_> = rows.collect();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(name, about)| format!("  {:<width$}  {}", name, about, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn target_arg() -> Arg {
    Arg::new("target")
        .short('t')
        .long("target")
        .value_parser(TARGETS)
        .action(ArgAction::Append)
        .help("Only consider sessions on this target")
}

fn builtin_commands() -> Result<Vec<ShellCommand>> {
    let run = clap::Command::new("run")
        .about("Run a module on the selected sessions")
        .arg(
            Arg::new("background")
                .short('b')
                .long("background")
                .action(ArgAction::SetTrue)
                .help("Do not wait for the module to finish"),
        )
        .arg(target_arg())
        .arg(Arg::new(MODULE_ARG).required(true).help("Module to run"))
        .arg(
            Arg::new("args")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Module arguments"),
        );
    let run_spec = CompleterSpec::builder()
        .positional(MODULE_ARG, ModuleNameCompleter)
        .remainder("args", ModuleArgsCompleter)
        .flag(["-b", "--background"])
        .option(["-t", "--target"], ListCompleter::new(TARGETS))
        .parser(ClapArgParser::new(run))
        .build()?;

    let modules = clap::Command::new("modules")
        .about("List the modules usable by the selected sessions")
        .arg(target_arg());
    let modules_spec = CompleterSpec::builder()
        .option(["-t", "--target"], ListCompleter::new(TARGETS))
        .parser(ClapArgParser::new(modules))
        .build()?;

    let names = ["run", "modules", "help", "exit", "quit"];
    let help = clap::Command::new("help")
        .about("Show help for a command or module")
        .arg(Arg::new("command").help("Command or module name"));
    let help_spec = CompleterSpec::builder()
        .positional("command", ListCompleter::new(names))
        .parser(ClapArgParser::new(help))
        .build()?;

    let command = |name, about, spec| ShellCommand {
        name,
        about,
        spec: Arc::new(spec),
    };

    Ok(vec![
        command(names[0], "Run a module on the selected sessions", run_spec),
        command(names[1], "List the modules usable by the selected sessions", modules_spec),
        command(names[2], "Show help for a command or module", help_spec),
        command(names[3], "Leave the shell", CompleterSpec::default()),
        command(names[4], "Leave the shell", CompleterSpec::default()),
    ])
}
