//! Capability traits shared by hosts and module authors.

/// The capability set of a plugin instance.
///
/// Module authors implement this for the type their factory constructs;
/// teardown belongs in `Drop`. On the host side, [`PluginInstance`] exposes
/// the same capability over the load boundary.
///
/// [`PluginInstance`]: crate::PluginInstance
pub trait Plugin {
    /// Performs the module's behavior.
    fn test(&self);
}

/// The capability set of a module's singleton factory.
///
/// Exactly one factory lives in each module, exported with
/// `modhost_plugin_sdk::export_factory!`.
pub trait PluginFactory: Sync {
    /// The plugin type this factory constructs.
    type Plugin: Plugin;

    /// Constructs a fresh plugin instance, handing ownership to the caller.
    fn construct(&self) -> Self::Plugin;
}
