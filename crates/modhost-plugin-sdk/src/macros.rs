//! Export macros that register a module's symbols.

/// Registers the module's display name and its singleton factory.
///
/// Emits the `classname` and `Factory` exports. `factory` must name a
/// module-level `static` whose type implements `PluginFactory`.
///
/// # Example
/// ```rust,ignore
/// static FOO_FACTORY: FooFactory = FooFactory;
///
/// export_factory!(name: c"foo Object", factory: FOO_FACTORY);
/// ```
#[macro_export]
macro_rules! export_factory {
    (name: $name:expr, factory: $factory:path $(,)?) => {
        #[doc(hidden)]
        #[allow(non_upper_case_globals)]
        #[unsafe(no_mangle)]
        pub static classname: $crate::ffi::abi::ExportedName =
            $crate::ffi::abi::ExportedName::from_c_str($name);

        #[doc(hidden)]
        #[allow(non_upper_case_globals)]
        #[unsafe(no_mangle)]
        pub static Factory: $crate::ffi::abi::FactoryVTable =
            $crate::exports::factory_vtable(&$factory);
    };
}

/// Registers the display name of a minimal-variant module.
///
/// Emits the `libname` export. Functions the host calls by name are plain
/// `#[unsafe(no_mangle)] pub extern "C" fn name()` items.
///
/// # Example
/// ```rust,ignore
/// export_library_name!(c"MyLib");
///
/// #[unsafe(no_mangle)]
/// pub extern "C" fn run() {
///     println!("ran");
/// }
/// ```
#[macro_export]
macro_rules! export_library_name {
    ($name:expr $(,)?) => {
        #[doc(hidden)]
        #[allow(non_upper_case_globals)]
        #[unsafe(no_mangle)]
        pub static libname: $crate::ffi::abi::ExportedName =
            $crate::ffi::abi::ExportedName::from_c_str($name);
    };
}
