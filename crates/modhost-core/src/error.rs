//! Unified application error types for modhost.
//!
//! Loader, registry, and CLI errors are all expressed as [`AppError`] so
//! they propagate through the `?` operator with a single type.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The module could not be mapped by the dynamic loader.
    Load,
    /// A required export is absent from a loaded module.
    SymbolNotFound,
    /// An export was found but does not carry the expected tag or version.
    AbiMismatch,
    /// A factory failed to produce a plugin instance.
    Construction,
    /// The module still has outstanding handles and cannot be unloaded.
    InUse,
    /// The requested module or directory was not found.
    NotFound,
    /// A configuration error occurred.
    Configuration,
    /// A filesystem I/O error occurred.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "LOAD"),
            Self::SymbolNotFound => write!(f, "SYMBOL_NOT_FOUND"),
            Self::AbiMismatch => write!(f, "ABI_MISMATCH"),
            Self::Construction => write!(f, "CONSTRUCTION"),
            Self::InUse => write!(f, "IN_USE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Io => write!(f, "IO"),
        }
    }
}

/// The unified application error used throughout modhost.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    /// Create a symbol-not-found error.
    pub fn symbol_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SymbolNotFound, message)
    }

    /// Create an ABI mismatch error.
    pub fn abi_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AbiMismatch, message)
    }

    /// Create a construction error.
    pub fn construction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Construction, message)
    }

    /// Create an in-use error.
    pub fn in_use(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InUse, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns `true` if this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
