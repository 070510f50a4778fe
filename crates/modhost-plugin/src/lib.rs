//! # modhost-plugin
//!
//! Runtime module loading for modhost. Provides:
//!
//! - The C ABI every loadable module exports (`classname`/`libname`,
//!   `Factory`), with a magic tag and version on the factory
//! - The [`Plugin`] and [`PluginFactory`] capability traits
//! - A host-side loader (`dynamic` feature) resolving typed handles that
//!   keep their module mapped while alive
//! - A [`ModuleRegistry`] serializing load/unload per path

pub mod ffi;
pub mod prelude;
pub mod traits;

#[cfg(feature = "dynamic")]
pub mod instance;
#[cfg(feature = "dynamic")]
pub mod loader;
#[cfg(feature = "dynamic")]
pub mod module;
#[cfg(feature = "dynamic")]
pub mod registry;

pub use traits::{Plugin, PluginFactory};

#[cfg(feature = "dynamic")]
pub use instance::{Factory, ModuleFunction, PluginInstance};
#[cfg(feature = "dynamic")]
pub use loader::Loader;
#[cfg(feature = "dynamic")]
pub use module::{Module, ProtocolVariant};
#[cfg(feature = "dynamic")]
pub use registry::ModuleRegistry;
