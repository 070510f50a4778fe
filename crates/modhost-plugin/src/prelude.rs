//! Prelude for convenient imports.

pub use crate::ffi::abi::{ABI_VERSION, FACTORY_MAGIC};
pub use crate::traits::{Plugin, PluginFactory};

#[cfg(feature = "dynamic")]
pub use crate::{
    Factory, Loader, Module, ModuleFunction, ModuleRegistry, PluginInstance, ProtocolVariant,
};

pub use modhost_core::{AppError, AppResult, ErrorKind};
