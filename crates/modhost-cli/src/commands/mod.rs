//! CLI command definitions and dispatch.

pub mod call;
pub mod create;
pub mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use modhost_core::config::HostConfig;
use modhost_core::result::AppResult;

/// modhost: load shared-library modules at runtime and drive their exports
#[derive(Debug, Parser)]
#[command(name = "modhost", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level; `RUST_LOG` takes precedence
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format for listings
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Call a function exported by a minimal-variant module
    Call(call::CallArgs),
    /// Construct and test a plugin from a factory-variant module
    Create(create::CreateArgs),
    /// List the modules in a directory with their names and variants
    Scan(scan::ScanArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self, config: &HostConfig) -> AppResult<()> {
        match &self.command {
            Commands::Call(args) => call::execute(args),
            Commands::Create(args) => create::execute(args),
            Commands::Scan(args) => scan::execute(args, config, self.format),
        }
    }
}
