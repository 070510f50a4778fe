//! FFI ABI definitions for loadable modules.
//!
//! Defines the C-compatible exports every module must provide. A
//! factory-variant module exports:
//!
//! ```c
//! const char *classname;      /* display name */
//! FactoryVTable Factory;      /* singleton factory */
//! ```
//!
//! A minimal-variant module exports `const char *libname` and any number of
//! `void fn(void)` functions resolved by name.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};

/// Export carrying the display name in the factory variant.
pub const CLASSNAME_SYMBOL: &str = "classname";

/// Export carrying the display name in the minimal variant.
pub const LIBNAME_SYMBOL: &str = "libname";

/// Export carrying the singleton factory.
pub const FACTORY_SYMBOL: &str = "Factory";

/// Tag stored at the start of every [`FactoryVTable`] ("MHFC").
pub const FACTORY_MAGIC: u32 = 0x4D48_4643;

/// Layout version of [`FactoryVTable`] and [`RawPlugin`].
pub const ABI_VERSION: u32 = 1;

/// A display-name export: a pointer to a NUL-terminated string.
#[repr(transparent)]
#[derive(Debug)]
pub struct ExportedName(pub *const c_char);

impl ExportedName {
    /// Wraps a static C string literal.
    pub const fn from_c_str(name: &'static CStr) -> Self {
        Self(name.as_ptr())
    }
}

// The pointee is a string literal in the module's read-only data.
unsafe impl Sync for ExportedName {}

/// Type signature of a minimal-variant module function.
pub type ModuleFn = unsafe extern "C" fn();

/// Type signature of a factory's construct entry point.
///
/// `factory` is the [`FactoryVTable::factory`] pointer of the same table.
pub type ConstructFn = unsafe extern "C" fn(factory: *const c_void) -> RawPlugin;

/// Type signature of a plugin operation taking the instance pointer.
pub type InstanceFn = unsafe extern "C" fn(instance: *mut c_void);

/// The exported factory.
#[repr(C)]
#[derive(Debug)]
pub struct FactoryVTable {
    /// Must equal [`FACTORY_MAGIC`].
    pub magic: u32,
    /// Must equal [`ABI_VERSION`].
    pub abi_version: u32,
    /// Opaque module-side factory state.
    pub factory: *const c_void,
    /// Constructs a new plugin instance. Never returns a null instance.
    pub construct: ConstructFn,
}

// The factory pointer refers to an immutable module-level static.
unsafe impl Sync for FactoryVTable {}

/// A plugin instance handed across the load boundary.
///
/// Ownership of `instance` passes to the host, which must call `destroy`
/// exactly once and before the module is unloaded.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawPlugin {
    /// Opaque heap-allocated instance.
    pub instance: *mut c_void,
    /// Runs the plugin's `test` operation.
    pub test: InstanceFn,
    /// Destroys the instance and frees its allocation.
    pub destroy: InstanceFn,
}
