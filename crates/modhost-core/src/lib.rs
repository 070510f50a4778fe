//! # modhost-core
//!
//! Core crate for modhost. Contains the unified error system and the
//! configuration schemas used by the host binary.
//!
//! This crate has **no** internal dependencies on other modhost crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
