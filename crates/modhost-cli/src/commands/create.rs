//! Factory variant: construct a plugin, test it, release it, unload.

use std::path::PathBuf;

use clap::Args;

use modhost_plugin::prelude::*;

/// Arguments for `modhost create`
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Path to the module shared library
    pub module: PathBuf,
}

/// Execute `modhost create`
pub fn execute(args: &CreateArgs) -> AppResult<()> {
    let module = unsafe { Loader::load(&args.module) }?;

    let name = module.class_name()?;
    println!("creating a \"{name}\"...");

    let factory = module.factory()?;
    let instance = factory.construct()?;
    instance.test();
    instance.release();
    drop(factory);

    module.unload()
}
