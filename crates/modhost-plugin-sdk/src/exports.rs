//! Builds the C ABI tables a module exports.

use std::os::raw::c_void;

use modhost_plugin::ffi::abi::{ABI_VERSION, FACTORY_MAGIC, FactoryVTable, RawPlugin};
use modhost_plugin::traits::{Plugin, PluginFactory};

/// Builds the exported factory table for a module-level factory static.
pub const fn factory_vtable<F: PluginFactory>(factory: &'static F) -> FactoryVTable {
    FactoryVTable {
        magic: FACTORY_MAGIC,
        abi_version: ABI_VERSION,
        factory: (factory as *const F).cast::<c_void>(),
        construct: construct_instance::<F>,
    }
}

unsafe extern "C" fn construct_instance<F: PluginFactory>(
    factory: *const c_void,
) -> RawPlugin {
    let factory = unsafe { &*factory.cast::<F>() };
    let plugin = Box::new(factory.construct());

    RawPlugin {
        instance: Box::into_raw(plugin).cast::<c_void>(),
        test: test_instance::<F::Plugin>,
        destroy: destroy_instance::<F::Plugin>,
    }
}

unsafe extern "C" fn test_instance<P: Plugin>(instance: *mut c_void) {
    let plugin = unsafe { &*instance.cast::<P>() };
    plugin.test();
}

unsafe extern "C" fn destroy_instance<P: Plugin>(instance: *mut c_void) {
    drop(unsafe { Box::from_raw(instance.cast::<P>()) });
}
