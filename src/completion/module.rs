//! Module completers
//!
//! Completion for commands that take a module name followed by that module's
//! own arguments (`run <module> [args...]`). Argument completion recurses
//! into the module's completer spec.

use super::completer::Completer;
use super::context::CompletionContext;

/// Id under which the enclosing command's parser records the module name.
pub const MODULE_ARG: &str = "module";

/// Completes the names of modules usable by the active sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleNameCompleter;

impl Completer for ModuleNameCompleter {
    fn complete(
        &self,
        text: &str,
        _line: &str,
        _start: usize,
        _end: usize,
        ctx: &mut CompletionContext,
    ) -> Vec<String> {
        match ctx.registry.iter_modules(&ctx.filter) {
            Ok(modules) => modules
                .iter()
                .map(|m| m.name())
                .filter(|name| name.starts_with(text))
                .map(String::from)
                .collect(),
            Err(e) => {
                tracing::debug!("Module listing failed during completion: {}", e);
                Vec::new()
            }
        }
    }
}

/// Completes the arguments of the module named earlier on the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleArgsCompleter;

impl ModuleArgsCompleter {
    /// Module name and the tokens typed after it.
    ///
    /// The parsed `module` value wins; without one the name is the first
    /// token filling a positional slot.
    fn split_tokens(ctx: &CompletionContext) -> Option<(String, Vec<String>)> {
        let first = ctx
            .positionals
            .first()
            .and_then(|&idx| Some((idx, ctx.tokens.get(idx)?)));

        let (idx, name) = match (ctx.parsed.value(MODULE_ARG), first) {
            (Some(name), Some((idx, token))) if token == name => (idx, name.to_string()),
            (Some(name), _) => {
                let idx = ctx.tokens.iter().position(|t| t == name).unwrap_or(0);
                (idx, name.to_string())
            }
            (None, Some((idx, token))) => (idx, token.clone()),
            (None, None) => (0, ctx.tokens.first()?.clone()),
        };

        let rest = ctx.tokens.get(idx + 1..).unwrap_or_default().to_vec();
        Some((name, rest))
    }
}

impl Completer for ModuleArgsCompleter {
    fn complete(
        &self,
        text: &str,
        line: &str,
        start: usize,
        end: usize,
        ctx: &mut CompletionContext,
    ) -> Vec<String> {
        let Some((name, rest)) = Self::split_tokens(ctx) else {
            return Vec::new();
        };

        let module = match ctx.registry.get_module(&name) {
            Ok(module) => module,
            Err(e) => {
                tracing::debug!("No argument completion for '{}': {}", name, e);
                return Vec::new();
            }
        };

        ctx.descend(rest);
        module.spec().complete(text, line, start, end, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::leaves::ListCompleter;
    use crate::completion::CompleterSpec;
    use crate::config::CompletionConfig;
    use crate::error::RegistryError;
    use crate::parser::{ArgParser, ParseOutcome};
    use crate::registry::{InMemoryRegistry, ModuleDescriptor, ModuleRegistry, SessionFilter};
    use std::sync::Arc;

    fn registry() -> Arc<InMemoryRegistry> {
        let registry = InMemoryRegistry::new();
        for name in ["ps", "shell", "upload"] {
            registry
                .register(ModuleDescriptor::new(name, "", CompleterSpec::default()))
                .unwrap();
        }
        let ps_spec = CompleterSpec::builder()
            .positional("field", ListCompleter::new(["pid", "name"]))
            .flag(["-a", "--all"])
            .build()
            .unwrap();
        registry
            .register(
                ModuleDescriptor::new("pstree", "", ps_spec).with_compatibility(["windows"]),
            )
            .unwrap();
        Arc::new(registry)
    }

    fn context(registry: Arc<dyn ModuleRegistry>, filter: SessionFilter) -> CompletionContext {
        CompletionContext::new(registry, filter, Arc::new(CompletionConfig::default()))
    }

    #[test]
    fn test_module_names_with_prefix() {
        let mut ctx = context(registry(), SessionFilter::all());
        let names = ModuleNameCompleter.complete("sh", "run sh", 4, 6, &mut ctx);
        assert_eq!(names, vec!["shell"]);
    }

    #[test]
    fn test_module_names_empty_text_matches_all() {
        let mut ctx = context(registry(), SessionFilter::all());
        let names = ModuleNameCompleter.complete("", "run ", 4, 4, &mut ctx);
        assert_eq!(names, vec!["ps", "pstree", "shell", "upload"]);
    }

    #[test]
    fn test_module_names_respect_filter() {
        let mut ctx = context(registry(), SessionFilter::targets(["linux"]));
        let names = ModuleNameCompleter.complete("ps", "run ps", 4, 6, &mut ctx);
        assert_eq!(names, vec!["ps"]);
    }

    struct FailingRegistry;

    impl ModuleRegistry for FailingRegistry {
        fn iter_modules(
            &self,
            _filter: &SessionFilter,
        ) -> Result<Vec<Arc<ModuleDescriptor>>, RegistryError> {
            Err(RegistryError::Unavailable)
        }

        fn get_module(&self, _name: &str) -> Result<Arc<ModuleDescriptor>, RegistryError> {
            Err(RegistryError::Unavailable)
        }
    }

    #[test]
    fn test_module_names_registry_error() {
        let mut ctx = context(Arc::new(FailingRegistry), SessionFilter::all());
        assert!(ModuleNameCompleter.complete("", "run ", 4, 4, &mut ctx).is_empty());
    }

    #[test]
    fn test_module_args_unknown_module() {
        let mut ctx = context(registry(), SessionFilter::all()).with_tokens(["nosuch", "-"]);
        let result = ModuleArgsCompleter.complete("-", "run nosuch -", 11, 12, &mut ctx);
        assert!(result.is_empty());
    }

    #[test]
    fn test_module_args_without_tokens() {
        let mut ctx = context(registry(), SessionFilter::all());
        assert!(ModuleArgsCompleter.complete("", "run ", 4, 4, &mut ctx).is_empty());
    }

    #[test]
    fn test_module_args_recurse_into_module_spec() {
        let mut ctx = context(registry(), SessionFilter::all()).with_tokens(["pstree"]);
        let result = ModuleArgsCompleter.complete("", "run pstree ", 11, 11, &mut ctx);
        assert_eq!(result, vec!["pid ", "name "]);
        assert!(ctx.tokens.is_empty());
    }

    #[test]
    fn test_module_args_flag_names() {
        let mut ctx = context(registry(), SessionFilter::all()).with_tokens(["pstree", "--"]);
        let result = ModuleArgsCompleter.complete("--", "run pstree --", 11, 13, &mut ctx);
        assert_eq!(result, vec!["--all "]);
    }

    #[test]
    fn test_module_name_after_repeated_flags() {
        let mut ctx =
            context(registry(), SessionFilter::all()).with_tokens(["-b", "-b", "pstree", "-"]);
        ctx.positionals = vec![2];

        let result = ModuleArgsCompleter.complete("-", "run -b -b pstree -", 17, 18, &mut ctx);
        assert_eq!(result, vec!["-a ", "--all "]);
    }

    #[test]
    fn test_module_name_when_reparse_fails() {
        struct Rejecting;

        impl ArgParser for Rejecting {
            fn parse_known(&self, _tokens: &[String]) -> ParseOutcome {
                ParseOutcome::RecoverableFailure("duplicate flag".to_string())
            }
        }

        let run = CompleterSpec::builder()
            .positional(MODULE_ARG, ModuleNameCompleter)
            .remainder("args", ModuleArgsCompleter)
            .flag(["-b", "--background"])
            .option(["-t", "--target"], ListCompleter::new(["linux", "windows"]))
            .parser(Rejecting)
            .build()
            .unwrap();

        let line = "run -t windows -b pstree --a";
        let mut ctx = context(registry(), SessionFilter::all())
            .with_tokens(["-t", "windows", "-b", "pstree", "--a"]);
        let result = run.complete("--a", line, 25, line.len(), &mut ctx);
        assert_eq!(result, vec!["--all "]);
    }

    #[test]
    fn test_module_name_from_parsed_values() {
        let mut ctx =
            context(registry(), SessionFilter::all()).with_tokens(["-b", "pstree", "-a", "n"]);
        ctx.parsed
            .values
            .insert(MODULE_ARG.to_string(), vec!["pstree".to_string()]);

        let result = ModuleArgsCompleter.complete("n", "run -b pstree -a n", 17, 18, &mut ctx);
        assert_eq!(result, vec!["name "]);
        assert_eq!(ctx.tokens, vec!["-a".to_string(), "n".to_string()]);
    }
}
