//! Minimal variant: print the library name, then call a function by name.

use std::path::PathBuf;

use clap::Args;

use modhost_plugin::prelude::*;

/// Arguments for `modhost call`
#[derive(Debug, Args)]
pub struct CallArgs {
    /// Path to the module shared library
    pub module: PathBuf,
    /// Name of the exported `extern "C" fn()` to call
    pub function: String,
}

/// Execute `modhost call`
pub fn execute(args: &CallArgs) -> AppResult<()> {
    // The module and symbol are trusted because the user named them.
    let module = unsafe { Loader::load(&args.module) }?;

    let name = module.library_name()?;
    println!("Using library: {name}");

    let function = unsafe { module.function(&args.function) }?;
    function.call();
    drop(function);

    module.unload()
}
