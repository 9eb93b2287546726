//! Module registry
//!
//! Modules are the pluggable commands of the shell. Each one is described by a
//! [`ModuleDescriptor`] carrying its name and its own completer spec. The
//! registry is read concurrently by every shell session, so lookups only take
//! a shared lock.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::completion::CompleterSpec;
use crate::error::RegistryError;

/// Registered module.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    name: String,
    description: String,
    /// Targets this module supports; empty means every target.
    compatible: Vec<String>,
    spec: Arc<CompleterSpec>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, spec: CompleterSpec) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            compatible: Vec::new(),
            spec: Arc::new(spec),
        }
    }

    /// Restrict the module to the given targets.
    pub fn with_compatibility<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn compatible(&self) -> &[String] {
        &self.compatible
    }

    pub fn spec(&self) -> &Arc<CompleterSpec> {
        &self.spec
    }
}

/// Selects the modules usable by the active sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    targets: Vec<String>,
}

impl SessionFilter {
    /// Filter that lets every module through.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter for sessions running on the given targets.
    pub fn targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn target_names(&self) -> &[String] {
        &self.targets
    }

    /// Check whether `module` can run on any selected target
    pub fn accepts(&self, module: &ModuleDescriptor) -> bool {
        self.targets.is_empty()
            || module.compatible.is_empty()
            || module
                .compatible
                .iter()
                .any(|c| self.targets.iter().any(|t| t.eq_ignore_ascii_case(c)))
    }
}

/// Read access to the registered modules.
pub trait ModuleRegistry: Send + Sync {
    /// Modules accepted by `filter`, ordered by name.
    fn iter_modules(&self, filter: &SessionFilter) -> Result<Vec<Arc<ModuleDescriptor>>, RegistryError>;

    /// Look up a module by exact name.
    fn get_module(&self, name: &str) -> Result<Arc<ModuleDescriptor>, RegistryError>;
}

/// Registry kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    modules: RwLock<BTreeMap<String, Arc<ModuleDescriptor>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; names must be unique.
    pub fn register(&self, module: ModuleDescriptor) -> Result<(), RegistryError> {
        let mut modules = self
            .modules
            .write()
            .map_err(|_| RegistryError::Unavailable)?;

        if modules.contains_key(&module.name) {
            return Err(RegistryError::Duplicate(module.name));
        }

        tracing::debug!("Registered module '{}'", module.name);
        modules.insert(module.name.clone(), Arc::new(module));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleRegistry for InMemoryRegistry {
    fn iter_modules(&self, filter: &SessionFilter) -> Result<Vec<Arc<ModuleDescriptor>>, RegistryError> {
        let modules = self
            .modules
            .read()
            .map_err(|_| RegistryError::Unavailable)?;

        Ok(modules
            .values()
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect())
    }

    fn get_module(&self, name: &str) -> Result<Arc<ModuleDescriptor>, RegistryError> {
        let modules = self
            .modules
            .read()
            .map_err(|_| RegistryError::Unavailable)?;

        modules
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(name, format!("{name} module"), CompleterSpec::default())
    }

    #[test]
    fn test_register_and_get() {
        let registry = InMemoryRegistry::new();
        registry.register(module("ps")).unwrap();

        let found = registry.get_module("ps").unwrap();
        assert_eq!(found.name(), "ps");
        assert_eq!(found.description(), "ps module");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unknown_module() {
        let registry = InMemoryRegistry::new();
        assert_eq!(
            registry.get_module("nope").err(),
            Some(RegistryError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_poisoned_lock_is_unavailable() {
        let registry = Arc::new(InMemoryRegistry::new());
        registry.register(module("ps")).unwrap();

        let writer = Arc::clone(&registry);
        let handle = std::thread::spawn(move || {
            let _guard = writer.modules.write().unwrap();
            panic!("writer died holding the lock");
        });
        assert!(handle.join().is_err());

        assert_eq!(registry.get_module("ps").err(), Some(RegistryError::Unavailable));
        assert_eq!(
            registry.iter_modules(&SessionFilter::all()).err(),
            Some(RegistryError::Unavailable)
        );
        assert_eq!(registry.register(module("ls")), Err(RegistryError::Unavailable));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = InMemoryRegistry::new();
        registry.register(module("ps")).unwrap();
        assert_eq!(
            registry.register(module("ps")),
            Err(RegistryError::Duplicate("ps".to_string()))
        );
    }

    #[test]
    fn test_iter_modules_sorted() {
        let registry = InMemoryRegistry::new();
        for name in ["upload", "ps", "shell"] {
            registry.register(module(name)).unwrap();
        }

        let names: Vec<String> = registry
            .iter_modules(&SessionFilter::all())
            .unwrap()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["ps", "shell", "upload"]);
    }

    #[test]
    fn test_session_filter() {
        let registry = InMemoryRegistry::new();
        registry
            .register(module("ps").with_compatibility(["linux", "windows"]))
            .unwrap();
        registry
            .register(module("reg").with_compatibility(["windows"]))
            .unwrap();
        registry.register(module("shell")).unwrap();

        let linux: Vec<String> = registry
            .iter_modules(&SessionFilter::targets(["Linux"]))
            .unwrap()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(linux, vec!["ps", "shell"]);
    }
}
