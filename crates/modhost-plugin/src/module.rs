//! Loaded modules and typed symbol resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use tracing::{debug, info};

use modhost_core::error::{AppError, ErrorKind};
use modhost_core::result::AppResult;

use crate::ffi::abi::{
    CLASSNAME_SYMBOL, ExportedName, FACTORY_SYMBOL, FactoryVTable, LIBNAME_SYMBOL, ModuleFn,
};
use crate::ffi::safety::{c_str_to_string, check_factory_header};
use crate::instance::{Factory, ModuleFunction};

/// Which of the two historical protocol variants a module implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// `libname` plus free functions resolved by name.
    Minimal,
    /// `classname` plus a singleton `Factory`.
    Factory,
}

impl ProtocolVariant {
    /// The export holding the display name for this variant.
    pub fn name_symbol(self) -> &'static str {
        match self {
            Self::Minimal => LIBNAME_SYMBOL,
            Self::Factory => CLASSNAME_SYMBOL,
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimal => write!(f, "minimal"),
            Self::Factory => write!(f, "factory"),
        }
    }
}

/// State shared by a module and every handle obtained from it.
///
/// Each [`Factory`], [`PluginInstance`](crate::PluginInstance) and
/// [`ModuleFunction`] holds an `Arc` of this, so the library stays mapped
/// for as long as any of them is alive.
pub(crate) struct ModuleInner {
    path: PathBuf,
    library: libloading::Library,
}

impl ModuleInner {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) type KeepAlive = Arc<ModuleInner>;

/// A loaded module.
///
/// Cloning is cheap and shares the same mapping. The module is unmapped by
/// [`Module::unload`], or implicitly once the last handle is dropped.
#[derive(Clone)]
pub struct Module {
    inner: KeepAlive,
}

impl Module {
    pub(crate) fn new(path: PathBuf, library: libloading::Library) -> Self {
        Self {
            inner: Arc::new(ModuleInner { path, library }),
        }
    }

    /// The path the module was opened from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Number of live handles to this module, including this one.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Resolves the display name exported for `variant`.
    pub fn display_name(&self, variant: ProtocolVariant) -> AppResult<String> {
        let symbol = variant.name_symbol();
        let path = self.path().display();

        let missing = |source: Option<libloading::Error>| {
            let message = match variant {
                ProtocolVariant::Minimal => {
                    format!("Could not find library name in library {path}")
                }
                ProtocolVariant::Factory => format!("Could not find {symbol} in {path}"),
            };
            match source {
                Some(e) => AppError::with_source(ErrorKind::SymbolNotFound, message, e),
                None => AppError::symbol_not_found(message),
            }
        };

        let name = unsafe {
            self.inner
                .library
                .get::<*const ExportedName>(symbol.as_bytes())
        }
        .map_err(|e| missing(Some(e)))?;
        let name = *name;
        if name.is_null() {
            return Err(missing(None));
        }

        let name = unsafe { c_str_to_string((*name).0) }.ok_or_else(|| {
            AppError::abi_mismatch(format!(
                "Export {symbol} in {path} is not a UTF-8 string"
            ))
        })?;

        debug!(path = %path, symbol, name = %name, "Resolved display name");

        Ok(name)
    }

    /// Resolves `classname` (factory variant).
    pub fn class_name(&self) -> AppResult<String> {
        self.display_name(ProtocolVariant::Factory)
    }

    /// Resolves `libname` (minimal variant).
    pub fn library_name(&self) -> AppResult<String> {
        self.display_name(ProtocolVariant::Minimal)
    }

    /// Works out which variant the module implements from its name export.
    ///
    /// A `classname` that exists but cannot be read is reported as is rather
    /// than falling back to `libname`.
    pub fn variant(&self) -> AppResult<ProtocolVariant> {
        select_variant(self.path(), self.class_name(), || self.library_name())
    }

    /// Resolves the singleton `Factory` export and validates its header.
    pub fn factory(&self) -> AppResult<Factory> {
        let path = self.path().display();

        let vtable = unsafe {
            self.inner
                .library
                .get::<*const FactoryVTable>(FACTORY_SYMBOL.as_bytes())
        }
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::SymbolNotFound,
                format!("Could not find {FACTORY_SYMBOL} in {path}"),
                e,
            )
        })?;
        let vtable = NonNull::new((*vtable).cast_mut()).ok_or_else(|| {
            AppError::symbol_not_found(format!("Could not find {FACTORY_SYMBOL} in {path}"))
        })?;

        unsafe { self.factory_from_table(vtable) }
    }

    /// Validates a factory table belonging to this module and wraps it.
    ///
    /// # Safety
    /// `vtable` must point to readable memory inside this module that stays
    /// valid while the module is mapped.
    pub(crate) unsafe fn factory_from_table(
        &self,
        vtable: NonNull<FactoryVTable>,
    ) -> AppResult<Factory> {
        let path = self.path().display();

        check_factory_header(unsafe { vtable.as_ref() }).map_err(|mismatch| {
            AppError::abi_mismatch(format!(
                "{FACTORY_SYMBOL} in {path} is not a modhost factory: {mismatch}"
            ))
        })?;

        debug!(path = %path, "Resolved factory");

        Ok(Factory::new(vtable, self.inner.clone()))
    }

    /// Resolves an exported `extern "C" fn()` by name (minimal variant).
    ///
    /// # Safety
    /// The symbol's type cannot be checked: the caller asserts that `name`
    /// refers to a function taking no arguments and returning nothing.
    pub unsafe fn function(&self, name: &str) -> AppResult<ModuleFunction> {
        let func = unsafe { self.inner.library.get::<ModuleFn>(name.as_bytes()) }.map_err(|e| {
            AppError::with_source(
                ErrorKind::SymbolNotFound,
                format!(
                    "Could not find symbol {name} in library {}",
                    self.path().display()
                ),
                e,
            )
        })?;

        debug!(path = %self.path().display(), symbol = name, "Resolved function");

        Ok(ModuleFunction::new(name.to_string(), *func, self.inner.clone()))
    }

    /// Unmaps the module.
    ///
    /// Fails with [`ErrorKind::InUse`] while any other handle (factory,
    /// instance, function, or module clone) is alive. In that case this
    /// handle is released and the library is unmapped when the last
    /// remaining handle is dropped.
    pub fn unload(self) -> AppResult<()> {
        let path = self.inner.path.clone();

        let inner = Arc::try_unwrap(self.inner).map_err(|inner| {
            AppError::in_use(format!(
                "Module {} still has {} outstanding handle(s)",
                path.display(),
                Arc::strong_count(&inner) - 1
            ))
        })?;

        inner.library.close().map_err(|e| {
            AppError::with_source(
                ErrorKind::Load,
                format!("Could not close library {} : {}", path.display(), e),
                e,
            )
        })?;

        info!(path = %path.display(), "Module unloaded");

        Ok(())
    }
}

/// Picks the variant from the `classname` lookup, consulting `libname` only
/// when `classname` is absent.
fn select_variant(
    path: &Path,
    class_name: AppResult<String>,
    library_name: impl FnOnce() -> AppResult<String>,
) -> AppResult<ProtocolVariant> {
    match class_name {
        Ok(_) => Ok(ProtocolVariant::Factory),
        Err(e) if !e.is(ErrorKind::SymbolNotFound) => Err(e),
        Err(_) => library_name().map(|_| ProtocolVariant::Minimal).map_err(|e| {
            if !e.is(ErrorKind::SymbolNotFound) {
                return e;
            }
            AppError::symbol_not_found(format!(
                "Could not find {CLASSNAME_SYMBOL} or {LIBNAME_SYMBOL} in {}",
                path.display()
            ))
        }),
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("path", &self.inner.path)
            .field("handles", &self.handle_count())
            .finish()
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use crate::Loader;
    use crate::ffi::abi::RawPlugin;

    // The C library is always loadable and exports none of the protocol symbols.
    fn libc() -> Module {
        unsafe { Loader::load("libc.so.6") }.expect("libc loads")
    }

    unsafe extern "C" fn noop(_instance: *mut std::os::raw::c_void) {}

    unsafe extern "C" fn construct(_factory: *const std::os::raw::c_void) -> RawPlugin {
        RawPlugin {
            instance: std::ptr::null_mut(),
            test: noop,
            destroy: noop,
        }
    }

    fn test_table(magic: u32, abi_version: u32) -> FactoryVTable {
        FactoryVTable {
            magic,
            abi_version,
            factory: std::ptr::null(),
            construct,
        }
    }

    #[test]
    fn test_missing_classname() {
        let module = libc();
        let err = module.class_name().unwrap_err();
        assert_eq!(err.kind, ErrorKind::SymbolNotFound);
        assert_eq!(err.message, "Could not find classname in libc.so.6");
    }

    #[test]
    fn test_missing_libname() {
        let module = libc();
        let err = module.library_name().unwrap_err();
        assert_eq!(err.kind, ErrorKind::SymbolNotFound);
        assert_eq!(err.message, "Could not find library name in library libc.so.6");
    }

    #[test]
    fn test_missing_factory() {
        let err = libc().factory().unwrap_err();
        assert_eq!(err.kind, ErrorKind::SymbolNotFound);
        assert_eq!(err.message, "Could not find Factory in libc.so.6");
    }

    #[test]
    fn test_variant_requires_a_name_export() {
        let err = libc().variant().unwrap_err();
        assert_eq!(err.kind, ErrorKind::SymbolNotFound);
    }

    #[test]
    fn test_variant_keeps_unreadable_classname_error() {
        let unreadable = Err(AppError::abi_mismatch(
            "Export classname in ./libbad.so is not a UTF-8 string",
        ));
        let err = select_variant(Path::new("./libbad.so"), unreadable, || {
            panic!("libname must not be consulted")
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AbiMismatch);
        assert!(err.message.contains("classname"));
    }

    #[test]
    fn test_variant_falls_back_to_libname() {
        let absent = Err(AppError::symbol_not_found("Could not find classname in ./libmy.so"));
        let variant = select_variant(Path::new("./libmy.so"), absent, || Ok("MyLib".to_string()))
            .expect("minimal variant");
        assert_eq!(variant, ProtocolVariant::Minimal);
    }

    #[test]
    fn test_factory_table_with_bad_magic_is_abi_mismatch() {
        let module = libc();
        let table = test_table(0x1234_5678, crate::ffi::abi::ABI_VERSION);
        let err = unsafe { module.factory_from_table(NonNull::from(&table)) }.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AbiMismatch);
        assert!(
            err.message
                .starts_with("Factory in libc.so.6 is not a modhost factory: bad magic tag")
        );
    }

    #[test]
    fn test_factory_table_with_other_version_is_abi_mismatch() {
        let module = libc();
        let table = test_table(
            crate::ffi::abi::FACTORY_MAGIC,
            crate::ffi::abi::ABI_VERSION + 1,
        );
        let err = unsafe { module.factory_from_table(NonNull::from(&table)) }.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AbiMismatch);
        assert!(err.message.contains("ABI version 2"));
    }

    #[test]
    fn test_factory_table_with_current_header_is_accepted() {
        let module = libc();
        let table = test_table(
            crate::ffi::abi::FACTORY_MAGIC,
            crate::ffi::abi::ABI_VERSION,
        );
        let factory = unsafe { module.factory_from_table(NonNull::from(&table)) }
            .expect("valid header");
        assert_eq!(module.handle_count(), 2);
        drop(factory);
        assert_eq!(module.handle_count(), 1);
    }

    #[test]
    fn test_missing_function() {
        let err = unsafe { libc().function("missing") }.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SymbolNotFound);
        assert_eq!(err.message, "Could not find symbol missing in library libc.so.6");
    }

    #[test]
    fn test_unload_refused_while_function_alive() {
        let module = libc();
        let sync = unsafe { module.function("sync") }.expect("sync is exported");
        assert_eq!(module.handle_count(), 2);

        let err = module.clone().unload().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InUse);
        assert!(err.message.contains("2 outstanding handle(s)"));

        drop(sync);
        module.unload().expect("unload after release");
    }
}
