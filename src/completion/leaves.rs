//! Leaf completers
//!
//! Small completers that produce candidates from a narrow input: a fixed
//! list, nothing at all, or the entries of a directory. None of them fail;
//! problems degrade to an empty candidate list.

use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;

use super::completer::{Completer, terminal, traversable};
use super::context::CompletionContext;

/// Completes from a fixed list of values.
#[derive(Debug, Clone)]
pub struct ListCompleter {
    values: Vec<String>,
}

impl ListCompleter {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Completer for ListCompleter {
    fn complete(
        &self,
        text: &str,
        _line: &str,
        _start: usize,
        _end: usize,
        _ctx: &mut CompletionContext,
    ) -> Vec<String> {
        self.values
            .iter()
            .filter(|v| v.starts_with(text))
            .map(|v| terminal(v.as_str()))
            .collect()
    }
}

/// Never offers anything (free-form values).
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidCompleter;

impl Completer for VoidCompleter {
    fn complete(
        &self,
        _text: &str,
        _line: &str,
        _start: usize,
        _end: usize,
        _ctx: &mut CompletionContext,
    ) -> Vec<String> {
        Vec::new()
    }
}

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntryInfo {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
        }
    }
}

/// Directory listing used by [`PathCompleter`].
pub trait FileSystem: Send + Sync {
    /// List the entries of `path`.
    fn list_directory(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

/// The local filesystem, listed in name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list_directory(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            // Skip names that are not valid UTF-8; they cannot be typed back.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            entries.push(DirEntryInfo::new(name, entry.path().is_dir()));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// Completes filesystem paths.
///
/// The directory part typed by the user is kept in every candidate, so
/// `src/ma` completes to `src/main.rs `. Directories end with the path
/// separator to allow completing further.
#[derive(Clone)]
pub struct PathCompleter {
    fs: Arc<dyn FileSystem>,
    root: Option<PathBuf>,
}

impl PathCompleter {
    /// Complete against the local filesystem, relative to the working directory.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(LocalFileSystem),
            root: None,
        }
    }

    /// Resolve relative paths against `root` instead of the working directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Use another filesystem implementation.
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    fn directory_for(&self, dir_part: &str) -> PathBuf {
        let dir = if dir_part.is_empty() { "." } else { dir_part };
        match &self.root {
            Some(root) => root.join(dir),
            None => PathBuf::from(dir),
        }
    }
}

impl Default for PathCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for PathCompleter {
    fn complete(
        &self,
        text: &str,
        _line: &str,
        _start: usize,
        _end: usize,
        ctx: &mut CompletionContext,
    ) -> Vec<String> {
        let (dir_part, base) = split_path(text);
        let directory = self.directory_for(dir_part);

        let entries = match self.fs.list_directory(&directory) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::trace!("Cannot list {}: {}", directory.display(), e);
                return Vec::new();
            }
        };

        let show_hidden = ctx.config.show_hidden || base.starts_with('.');
        entries
            .into_iter()
            .filter(|e| e.name.starts_with(base))
            .filter(|e| show_hidden || !e.name.starts_with('.'))
            .map(|e| {
                let shown = format!("{dir_part}{}", e.name);
                if e.is_dir {
                    traversable(shown)
                } else {
                    terminal(shown)
                }
            })
            .collect()
    }
}

/// Split `text` into the directory part (with its trailing separator) and
/// the basename being typed.
fn split_path(text: &str) -> (&str, &str) {
    match text.rfind(|c: char| c == '/' || c == MAIN_SEPARATOR) {
        Some(idx) => text.split_at(idx + 1),
        None => ("", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompletionConfig;
    use crate::registry::{InMemoryRegistry, SessionFilter};
    use std::fs;

    fn context(show_hidden: bool) -> CompletionContext {
        CompletionContext::new(
            Arc::new(InMemoryRegistry::new()),
            SessionFilter::all(),
            Arc::new(CompletionConfig {
                show_hidden,
                ..CompletionConfig::default()
            }),
        )
    }

    fn complete(completer: &dyn Completer, text: &str) -> Vec<String> {
        let line = format!("cmd {text}");
        completer.complete(text, &line, 4, line.len(), &mut context(true))
    }

    #[test]
    fn test_list_completer_prefix() {
        let completer = ListCompleter::new(["alpha", "beta", "avocado"]);
        assert_eq!(complete(&completer, "a"), vec!["alpha ", "avocado "]);
    }

    #[test]
    fn test_list_completer_empty_text() {
        let completer = ListCompleter::new(["alpha", "beta", "avocado"]);
        assert_eq!(complete(&completer, ""), vec!["alpha ", "beta ", "avocado "]);
    }

    #[test]
    fn test_list_completer_no_match() {
        let completer = ListCompleter::new(["alpha"]);
        assert!(complete(&completer, "z").is_empty());
    }

    #[test]
    fn test_void_completer() {
        assert!(complete(&VoidCompleter, "").is_empty());
        assert!(complete(&VoidCompleter, "abc").is_empty());
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("abc")).unwrap();
        fs::write(dir.path().join("abc").join("inner.rs"), "").unwrap();
        fs::write(dir.path().join("zeta.log"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        dir
    }

    #[test]
    fn test_path_completer_prefix() {
        let dir = fixture();
        let completer = PathCompleter::new().with_root(dir.path());
        assert_eq!(
            complete(&completer, "a"),
            vec!["a.txt ".to_string(), format!("abc{MAIN_SEPARATOR}")]
        );
    }

    #[test]
    fn test_path_completer_empty_text_lists_directory() {
        let dir = fixture();
        let completer = PathCompleter::new().with_root(dir.path());
        assert_eq!(
            complete(&completer, ""),
            vec![
                ".hidden ".to_string(),
                "a.txt ".to_string(),
                format!("abc{MAIN_SEPARATOR}"),
                "zeta.log ".to_string(),
            ]
        );
    }

    #[test]
    fn test_path_completer_keeps_directory_part() {
        let dir = fixture();
        let completer = PathCompleter::new().with_root(dir.path());
        assert_eq!(complete(&completer, "abc/"), vec!["abc/inner.rs "]);
        assert_eq!(complete(&completer, "abc/in"), vec!["abc/inner.rs "]);
    }

    #[test]
    fn test_path_completer_missing_directory() {
        let dir = fixture();
        let completer = PathCompleter::new().with_root(dir.path());
        assert!(complete(&completer, "nope/x").is_empty());
    }

    #[test]
    fn test_path_completer_hides_dot_entries() {
        let dir = fixture();
        let completer = PathCompleter::new().with_root(dir.path());
        let line = "cmd ";
        let hidden_off = completer.complete("", line, 4, 4, &mut context(false));
        assert!(!hidden_off.iter().any(|c| c.starts_with(".hidden")));

        let explicit = completer.complete(".h", "cmd .h", 4, 6, &mut context(false));
        assert_eq!(explicit, vec![".hidden "]);
    }

    struct BrokenFileSystem;

    impl FileSystem for BrokenFileSystem {
        fn list_directory(&self, _path: &Path) -> io::Result<Vec<DirEntryInfo>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_path_completer_listing_error() {
        let completer = PathCompleter::new().with_filesystem(Arc::new(BrokenFileSystem));
        assert!(complete(&completer, "").is_empty());
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("abc"), ("", "abc"));
        assert_eq!(split_path("src/ma"), ("src/", "ma"));
        assert_eq!(split_path("/"), ("/", ""));
    }
}
