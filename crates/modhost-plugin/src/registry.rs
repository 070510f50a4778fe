//! Module registry: one shared [`Module`] per distinct path.
//!
//! Load and unload of the same path are serialized on the path's map entry,
//! so a concurrent host can never double-unload or unload a module another
//! caller is still using.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use modhost_core::error::AppError;
use modhost_core::result::AppResult;

use crate::loader::Loader;
use crate::module::Module;

/// Registry of loaded modules keyed by canonical path.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Canonical path → module. The registry holds one handle per entry.
    /// `None` only while an unload holds the entry.
    modules: DashMap<PathBuf, Option<Module>>,
}

impl ModuleRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// Returns the module at `path`, loading it if this is the first request.
    ///
    /// # Safety
    /// Same contract as [`Loader::load`].
    pub unsafe fn load(&self, path: impl AsRef<Path>) -> AppResult<Module> {
        let key = registry_key(path.as_ref());

        match self.modules.entry(key) {
            Entry::Occupied(mut entry) => {
                if let Some(module) = entry.get() {
                    debug!(path = %entry.key().display(), "Module already loaded");
                    return Ok(module.clone());
                }
                let module = unsafe { Loader::load(entry.key()) }?;
                entry.insert(Some(module.clone()));
                Ok(module)
            }
            Entry::Vacant(entry) => {
                let module = unsafe { Loader::load(entry.key()) }?;
                entry.insert(Some(module.clone()));
                Ok(module)
            }
        }
    }

    /// Unloads `module` and forgets it.
    ///
    /// Fails with [`ErrorKind::InUse`](modhost_core::ErrorKind::InUse) and
    /// keeps the entry registered while handles other than `module` and the
    /// registry's own are alive. The library is closed before the entry is
    /// released, so a concurrent `load` of the same path reopens it only
    /// after the unmap.
    pub fn unload(&self, module: Module) -> AppResult<()> {
        let key = module.path().to_path_buf();

        match self.modules.entry(key) {
            Entry::Occupied(mut entry) => {
                let outstanding = module.handle_count().saturating_sub(2);
                if outstanding > 0 {
                    return Err(AppError::in_use(format!(
                        "Module {} still has {} outstanding handle(s)",
                        entry.key().display(),
                        outstanding
                    )));
                }
                drop(entry.get_mut().take());
                let closed = module.unload();
                let (path, _) = entry.remove_entry();
                closed?;
                info!(path = %path.display(), "Module removed from registry");
                Ok(())
            }
            Entry::Vacant(_) => module.unload(),
        }
    }

    /// Gets a loaded module by path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Module> {
        let key = registry_key(path.as_ref());
        self.modules.get(&key).and_then(|entry| entry.value().clone())
    }

    /// Paths of all loaded modules, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.modules.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Returns the number of loaded modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no module is loaded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Canonicalizes existing paths; bare library names are kept as given so
/// the dynamic loader can search for them.
fn registry_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
