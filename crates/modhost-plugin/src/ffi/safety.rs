//! FFI safety wrappers that convert between FFI types and Rust types.

use std::ffi::CStr;
use std::os::raw::c_char;

use super::abi::{ABI_VERSION, FACTORY_MAGIC, FactoryVTable};

/// Safely converts a C string pointer to a Rust `String`.
///
/// Returns `None` if the pointer is null or the bytes are not UTF-8.
///
/// # Safety
/// A non-null `ptr` must point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string()) }
}

/// Reason a factory header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMismatch {
    /// The magic tag differs from [`FACTORY_MAGIC`].
    Magic(u32),
    /// The ABI version differs from [`ABI_VERSION`].
    Version(u32),
}

impl std::fmt::Display for HeaderMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Magic(found) => write!(
                f,
                "bad magic tag {found:#010x} (expected {FACTORY_MAGIC:#010x})"
            ),
            Self::Version(found) => {
                write!(f, "ABI version {found} (host speaks {ABI_VERSION})")
            }
        }
    }
}

/// Validates the tag and version at the start of a factory table.
pub fn check_factory_header(vtable: &FactoryVTable) -> Result<(), HeaderMismatch> {
    if vtable.magic != FACTORY_MAGIC {
        return Err(HeaderMismatch::Magic(vtable.magic));
    }
    if vtable.abi_version != ABI_VERSION {
        return Err(HeaderMismatch::Version(vtable.abi_version));
    }
    Ok(())
}
