//! Handles to objects living inside a loaded module.
//!
//! Every handle carries a keep-alive token for its module, so the code and
//! data it points into cannot be unmapped underneath it.

use std::fmt;
use std::ptr::NonNull;

use tracing::debug;

use modhost_core::error::AppError;
use modhost_core::result::AppResult;

use crate::ffi::abi::{FactoryVTable, ModuleFn, RawPlugin};
use crate::module::KeepAlive;
use crate::traits::Plugin;

/// A module's singleton factory.
pub struct Factory {
    vtable: NonNull<FactoryVTable>,
    module: KeepAlive,
}

impl Factory {
    pub(crate) fn new(vtable: NonNull<FactoryVTable>, module: KeepAlive) -> Self {
        Self { vtable, module }
    }

    /// Asks the factory for a new plugin instance.
    ///
    /// A null instance is a protocol violation by the module and is reported
    /// as [`ErrorKind::Construction`](modhost_core::ErrorKind::Construction).
    pub fn construct(&self) -> AppResult<PluginInstance> {
        let vtable = unsafe { self.vtable.as_ref() };
        let raw = unsafe { (vtable.construct)(vtable.factory) };

        let Some(instance) = NonNull::new(raw.instance) else {
            return Err(AppError::construction(format!(
                "Factory in {} returned a null instance",
                self.module.path().display()
            )));
        };

        debug!(path = %self.module.path().display(), "Plugin instance constructed");

        Ok(PluginInstance {
            instance,
            raw,
            module: self.module.clone(),
        })
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("module", &self.module.path())
            .finish()
    }
}

/// A plugin instance constructed by a module's factory.
///
/// Owned exclusively by the host. Dropping it runs the module-defined
/// teardown before the module's keep-alive token is released.
pub struct PluginInstance {
    instance: NonNull<std::os::raw::c_void>,
    raw: RawPlugin,
    module: KeepAlive,
}

impl PluginInstance {
    /// Destroys the instance. Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }
}

impl Plugin for PluginInstance {
    fn test(&self) {
        unsafe { (self.raw.test)(self.instance.as_ptr()) }
    }
}

impl Drop for PluginInstance {
    fn drop(&mut self) {
        unsafe { (self.raw.destroy)(self.instance.as_ptr()) }
        debug!(path = %self.module.path().display(), "Plugin instance released");
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("instance", &self.instance)
            .field("module", &self.module.path())
            .finish()
    }
}

/// A free function exported by a minimal-variant module.
pub struct ModuleFunction {
    name: String,
    func: ModuleFn,
    module: KeepAlive,
}

impl ModuleFunction {
    pub(crate) fn new(name: String, func: ModuleFn, module: KeepAlive) -> Self {
        Self { name, func, module }
    }

    /// The exported symbol name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the function.
    pub fn call(&self) {
        unsafe { (self.func)() }
    }
}

impl fmt::Debug for ModuleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleFunction")
            .field("name", &self.name)
            .field("module", &self.module.path())
            .finish()
    }
}
