//! Dynamic module loader using `libloading`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use modhost_core::error::{AppError, ErrorKind};
use modhost_core::result::AppResult;

use crate::module::Module;

/// Opens modules and discovers them on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct Loader;

impl Loader {
    /// Maps the shared library at `path` into the process.
    ///
    /// The error message carries the dynamic loader's own diagnostic, e.g.
    /// `Could not open library ./libfoo.so : ./libfoo.so: cannot open shared
    /// object file: No such file or directory`.
    ///
    /// # Safety
    /// Loading runs the module's initialization routines, and the returned
    /// [`Module`] trusts that its `classname`/`libname`/`Factory` exports
    /// follow the layout in [`crate::ffi::abi`]. Only load trusted modules.
    pub unsafe fn load(path: impl AsRef<Path>) -> AppResult<Module> {
        let path = path.as_ref();

        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            AppError::with_source(
                ErrorKind::Load,
                format!("Could not open library {} : {}", path.display(), e),
                e,
            )
        })?;

        info!(path = %path.display(), "Module loaded");

        Ok(Module::new(path.to_path_buf(), library))
    }

    /// Returns `true` if `path` has the platform's shared-library extension.
    pub fn is_module_file(path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == std::env::consts::DLL_EXTENSION)
    }

    /// Lists candidate module files in `dir`, sorted by path.
    ///
    /// Nothing is loaded; use [`Loader::load`] on each result.
    pub fn discover(dir: &Path) -> AppResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(AppError::not_found(format!(
                "Plugin directory {} does not exist",
                dir.display()
            )));
        }

        let mut modules = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if Self::is_module_file(&path) {
                modules.push(path);
            }
        }
        modules.sort();

        debug!(dir = %dir.display(), count = modules.len(), "Discovered modules");

        Ok(modules)
    }
}
