//! # plugin-mylib
//!
//! Example module implementing the minimal variant of the module protocol:
//! a `libname` export plus free functions the host resolves by name.

use modhost_plugin_sdk::export_library_name;

export_library_name!(c"MyLib");

/// Prints `ran`.
#[unsafe(no_mangle)]
pub extern "C" fn run() {
    println!("ran");
}
