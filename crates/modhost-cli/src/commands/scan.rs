//! Module discovery.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use crate::output::{self, OutputFormat};
use modhost_core::config::HostConfig;
use modhost_plugin::prelude::*;

/// Arguments for `modhost scan`
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan (defaults to `plugins.directory` from config)
    pub dir: Option<PathBuf>,
}

/// One scanned module.
#[derive(Debug, Serialize, Tabled)]
pub struct ScanRow {
    /// File name
    #[tabled(rename = "File")]
    pub file: String,
    /// Display name, empty when unresolved
    #[tabled(rename = "Name")]
    pub name: String,
    /// `factory`, `minimal`, or `-`
    #[tabled(rename = "Variant")]
    pub variant: String,
    /// `ok` or the reason the module was skipped
    #[tabled(rename = "Status")]
    pub status: String,
}

/// Execute `modhost scan`
pub fn execute(args: &ScanArgs, config: &HostConfig, format: OutputFormat) -> AppResult<()> {
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| config.plugins.directory_path());

    let rows: Vec<ScanRow> = Loader::discover(&dir)?
        .iter()
        .map(|path| inspect(path))
        .collect();

    output::print_list(&rows, format);
    Ok(())
}

fn inspect(path: &Path) -> ScanRow {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let skipped = |reason: String| {
        warn!(path = %path.display(), reason = %reason, "Skipping module");
        ScanRow {
            file: file.clone(),
            name: String::new(),
            variant: "-".to_string(),
            status: reason,
        }
    };

    // Scanning loads every candidate; only point it at trusted directories.
    let module = match unsafe { Loader::load(path) } {
        Ok(module) => module,
        Err(e) => return skipped(e.message),
    };

    let resolved = module.variant().and_then(|variant| {
        let name = match variant {
            ProtocolVariant::Factory => {
                module.factory()?;
                module.class_name()?
            }
            ProtocolVariant::Minimal => module.library_name()?,
        };
        Ok((variant, name))
    });

    let row = match resolved {
        Ok((variant, name)) => ScanRow {
            file: file.clone(),
            name,
            variant: variant.to_string(),
            status: "ok".to_string(),
        },
        Err(e) => skipped(e.message),
    };

    if let Err(e) = module.unload() {
        warn!(path = %path.display(), error = %e, "Module did not unload cleanly");
    }

    row
}
