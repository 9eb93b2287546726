//! Argument parsing collaborator
//!
//! Completion refines its picture of a partially typed command by running the
//! command's own argument parser over the tokens typed so far. The parser is
//! allowed to fail: every failure is reported as
//! [`ParseOutcome::RecoverableFailure`] and the caller keeps whatever state it
//! had before.
//!
//! [`ClapArgParser`] adapts a `clap::Command` to this contract, including
//! "parse known" semantics: tokens clap does not recognise are peeled off into
//! the leftover list instead of failing the whole parse.

use std::borrow::Cow;
use std::collections::BTreeMap;

use clap::error::{ContextKind, ContextValue, ErrorKind};

/// Parsed-so-far record of a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Values already resolved, keyed by argument id.
    pub values: BTreeMap<String, Vec<String>>,

    /// Raw tokens the parser did not claim.
    pub remaining: Vec<String>,
}

impl ParsedArgs {
    pub fn new(values: BTreeMap<String, Vec<String>>, remaining: Vec<String>) -> Self {
        Self { values, remaining }
    }

    /// First value recorded for `id`.
    pub fn value(&self, id: &str) -> Option<&str> {
        self.values
            .get(id)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Every value recorded for `id`.
    pub fn values(&self, id: &str) -> &[String] {
        self.values.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.remaining.is_empty()
    }
}

/// Outcome of a best-effort parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The known part of the input parsed.
    Success {
        parsed: BTreeMap<String, Vec<String>>,
        leftover: Vec<String>,
    },

    /// The input cannot be parsed yet (usually because it is still being typed).
    RecoverableFailure(String),
}

/// Parses the argument tokens of one command.
pub trait ArgParser: Send + Sync {
    /// Parse the tokens it understands, returning the rest as leftover.
    fn parse_known(&self, tokens: &[String]) -> ParseOutcome;

    /// Usage text, if the parser can render one.
    fn help(&self) -> Option<String> {
        None
    }
}

/// [`ArgParser`] backed by a clap command definition
#[derive(Debug, Clone)]
pub struct ClapArgParser {
    command: clap::Command,
}

impl ClapArgParser {
    /// Wrap `command`; tokens are parsed without a leading binary name.
    pub fn new(command: clap::Command) -> Self {
        Self {
            command: command.no_binary_name(true),
        }
    }

    /// The wrapped clap command
    pub fn command(&self) -> &clap::Command {
        &self.command
    }

    fn collect(&self, matches: &clap::ArgMatches) -> BTreeMap<String, Vec<String>> {
        let mut values = BTreeMap::new();
        for arg in self.command.get_arguments() {
            let id = arg.get_id().as_str();
            if let Ok(Some(raw)) = matches.try_get_raw(id) {
                let collected: Vec<String> = raw
                    .map(|v| v.to_string_lossy().into_owned())
                    .collect();
                values.insert(id.to_string(), collected);
            }
        }
        values
    }
}

impl ArgParser for ClapArgParser {
    fn parse_known(&self, tokens: &[String]) -> ParseOutcome {
        let mut input: Vec<String> = tokens.to_vec();
        let mut leftover = Vec::new();

        // Each retry removes one token, so this terminates.
        loop {
            match self.command.clone().try_get_matches_from(input.iter()) {
                Ok(matches) => {
                    return ParseOutcome::Success {
                        parsed: self.collect(&matches),
                        leftover,
                    };
                }
                Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                    let unknown = match err.get(ContextKind::InvalidArg) {
                        Some(ContextValue::String(arg)) => arg.clone(),
                        _ => return ParseOutcome::RecoverableFailure(err.to_string()),
                    };
                    match input.iter().position(|t| *t == unknown) {
                        Some(index) => leftover.push(input.remove(index)),
                        None => return ParseOutcome::RecoverableFailure(err.to_string()),
                    }
                }
                Err(err) => return ParseOutcome::RecoverableFailure(err.to_string()),
            }
        }
    }

    fn help(&self) -> Option<String> {
        Some(self.command.clone().render_help().to_string())
    }
}

/// Split a command line into tokens using POSIX shell rules.
///
/// An unterminated quote falls back to plain whitespace splitting, so a line
/// that is still being typed always yields tokens. A word starting with `#`
/// is an ordinary word, not a comment.
pub fn tokenize(input: &str) -> Vec<String> {
    shlex::split(&escape_comments(input))
        .unwrap_or_else(|| input.split_whitespace().map(String::from).collect())
}

/// Escape every unquoted `#` that starts a word.
fn escape_comments(input: &str) -> Cow<'_, str> {
    if !input.contains('#') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 1);
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut word_start = true;

    for c in input.chars() {
        if escaped {
            escaped = false;
            word_start = false;
            out.push(c);
            continue;
        }

        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == '\\' => escaped = true,
            Some(_) => {}
            None => match c {
                '\\' => escaped = true,
                '\'' | '"' => quote = Some(c),
                '#' if word_start => out.push('\\'),
                _ => {}
            },
        }

        word_start = quote.is_none() && !escaped && c.is_whitespace();
        out.push(c);
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn upload_parser() -> ClapArgParser {
        ClapArgParser::new(
            Command::new("upload")
                .arg(Arg::new("force").short('f').long("force").action(ArgAction::SetTrue))
                .arg(Arg::new("mode").short('m').long("mode"))
                .arg(Arg::new("local").required(true))
                .arg(Arg::new("remote")),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_known_success() {
        let parser = upload_parser();
        let outcome = parser.parse_known(&strings(&["-f", "-m", "644", "a.txt", "/tmp/a"]));

        let ParseOutcome::Success { parsed, leftover } = outcome else {
            panic!("expected success");
        };
        assert!(leftover.is_empty());
        assert_eq!(parsed.get("force"), Some(&vec!["true".to_string()]));
        assert_eq!(parsed.get("mode"), Some(&vec!["644".to_string()]));
        assert_eq!(parsed.get("local"), Some(&vec!["a.txt".to_string()]));
        assert_eq!(parsed.get("remote"), Some(&vec!["/tmp/a".to_string()]));
    }

    #[test]
    fn test_parse_known_collects_unknown_tokens() {
        let parser = upload_parser();
        let outcome = parser.parse_known(&strings(&["--bogus", "a.txt"]));

        let ParseOutcome::Success { parsed, leftover } = outcome else {
            panic!("expected success");
        };
        assert_eq!(leftover, strings(&["--bogus"]));
        assert_eq!(parsed.get("local"), Some(&vec!["a.txt".to_string()]));
    }

    #[test]
    fn test_parse_known_missing_required_fails() {
        let parser = upload_parser();
        let outcome = parser.parse_known(&strings(&["-f"]));
        assert!(matches!(outcome, ParseOutcome::RecoverableFailure(_)));
    }

    #[test]
    fn test_parse_known_missing_option_value_fails() {
        let parser = upload_parser();
        let outcome = parser.parse_known(&strings(&["a.txt", "-m"]));
        assert!(matches!(outcome, ParseOutcome::RecoverableFailure(_)));
    }

    #[test]
    fn test_help_mentions_arguments() {
        let help = upload_parser().help().unwrap();
        assert!(help.contains("--force"));
        assert!(help.contains("<local>"));
    }

    #[test]
    fn test_parsed_args_accessors() {
        let mut values = BTreeMap::new();
        values.insert("module".to_string(), strings(&["ps"]));
        let parsed = ParsedArgs::new(values, strings(&["-x"]));

        assert_eq!(parsed.value("module"), Some("ps"));
        assert_eq!(parsed.value("missing"), None);
        assert!(parsed.values("missing").is_empty());
        assert!(!parsed.is_empty());
        assert!(ParsedArgs::default().is_empty());
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(tokenize(r#"a "b c" d"#), strings(&["a", "b c", "d"]));
    }

    #[test]
    fn test_tokenize_keeps_hash_words() {
        assert_eq!(tokenize("run upload #f"), strings(&["run", "upload", "#f"]));
        assert_eq!(
            tokenize("upload #a.txt /tmp/b "),
            strings(&["upload", "#a.txt", "/tmp/b"])
        );
        assert_eq!(tokenize("a b#c"), strings(&["a", "b#c"]));
    }

    #[test]
    fn test_tokenize_hash_inside_quotes_untouched() {
        assert_eq!(tokenize(r##"echo "#x y" '#z'"##), strings(&["echo", "#x y", "#z"]));
        assert_eq!(tokenize(r"a \#b"), strings(&["a", "#b"]));
    }

    #[test]
    fn test_tokenize_unterminated_quote_falls_back() {
        assert_eq!(tokenize(r#"a "b c"#), strings(&["a", "\"b", "c"]));
    }
}
