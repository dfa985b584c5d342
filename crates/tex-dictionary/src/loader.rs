//! Loads and caches [`Module`] data dictionaries from disk (spec.md §4.3,
//! §4.9).

use crate::descriptor::ModuleJson;
use crate::{DictionaryError, Module};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Loads `<data_dir>/<name>.json` module description files, merging in
/// each module's declared dependencies, and caches the merged result by
/// name so repeated lookups (e.g. every Manuscript opening the same
/// `\usepackage`) are free after the first.
///
/// Cheaply `Clone`-able: the cache lives behind an `Arc<RwLock<_>>`, so a
/// clone shares state with its origin rather than copying it — the same
/// pattern `tex-manuscript`'s `FileCache` uses.
#[derive(Clone)]
pub struct ModuleDictionary {
    data_dir: PathBuf,
    cache: Arc<RwLock<std::collections::HashMap<String, Arc<Module>>>>,
}

impl ModuleDictionary {
    /// Creates a dictionary reading module files from `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir, cache: Arc::new(RwLock::new(std::collections::HashMap::new())) }
    }

    /// Loads `name`, merging in its transitive dependencies, returning the
    /// cached copy if one is already present.
    ///
    /// Dependency cycles are broken by skipping any module already on the
    /// current load path rather than failing the whole load, since a
    /// malformed dependency graph shouldn't prevent use of the modules
    /// that did load cleanly.
    pub fn load_module(&self, name: &str) -> Result<Arc<Module>, DictionaryError> {
        if let Some(hit) = self.cache.read().unwrap().get(name) {
            return Ok(Arc::clone(hit));
        }

        let mut visiting = HashSet::new();
        let module = self.load_merged(name, &mut visiting)?;
        let module = Arc::new(module);
        self.cache.write().unwrap().insert(name.to_string(), Arc::clone(&module));
        debug!(module = name, commands = module.commands.len(), "loaded module");
        Ok(module)
    }

    fn load_merged(&self, name: &str, visiting: &mut HashSet<String>) -> Result<Module, DictionaryError> {
        if !visiting.insert(name.to_string()) {
            warn!(module = name, "dependency cycle in module description, skipping");
            return Ok(Module { name: name.to_string(), ..Module::default() });
        }

        let raw = self.read_module_file(name)?;
        let mut merged = Module {
            name: raw.name.clone(),
            commands: raw.commands,
            environments: raw.environments,
            dependencies: raw.dependencies,
        };

        for dep in merged.dependencies.clone() {
            match self.load_merged(&dep, visiting) {
                Ok(dep_module) => {
                    for (k, v) in dep_module.commands {
                        merged.commands.entry(k).or_insert(v);
                    }
                    for (k, v) in dep_module.environments {
                        merged.environments.entry(k).or_insert(v);
                    }
                }
                Err(err) => warn!(module = name, dependency = dep.as_str(), error = %err, "dependency failed to load"),
            }
        }

        Ok(merged)
    }

    fn read_module_file(&self, name: &str) -> Result<Module, DictionaryError> {
        let path = self.data_dir.join(format!("{name}.json"));
        let text = fs::read_to_string(&path).map_err(|_| DictionaryError::NotFound(name.to_string()))?;
        let raw: ModuleJson = serde_json::from_str(&text).map_err(|err| DictionaryError::Malformed {
            module: name.to_string(),
            reason: err.to_string(),
        })?;
        Ok(raw.into())
    }
}
