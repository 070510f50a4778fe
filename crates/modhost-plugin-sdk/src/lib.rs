//! # modhost-plugin-sdk
//!
//! SDK for writing modules that modhost can load at runtime.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modhost_plugin_sdk::prelude::*;
//!
//! struct Greeter;
//!
//! impl Plugin for Greeter {
//!     fn test(&self) {
//!         println!("hello from a module");
//!     }
//! }
//!
//! struct GreeterFactory;
//!
//! impl PluginFactory for GreeterFactory {
//!     type Plugin = Greeter;
//!
//!     fn construct(&self) -> Greeter {
//!         Greeter
//!     }
//! }
//!
//! static GREETER_FACTORY: GreeterFactory = GreeterFactory;
//!
//! export_factory!(name: c"Greeter", factory: GREETER_FACTORY);
//! ```
//!
//! Build the crate with `crate-type = ["cdylib"]` and pass the resulting
//! shared library to `modhost create`.

pub mod exports;
pub mod macros;

pub use modhost_plugin::ffi;

/// Prelude for convenient imports.
pub mod prelude {
    pub use modhost_plugin::traits::{Plugin, PluginFactory};

    pub use crate::{export_factory, export_library_name};
}
