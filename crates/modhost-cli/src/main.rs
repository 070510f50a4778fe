//! modhost CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use modhost_core::config::HostConfig;
use modhost_core::config::logging::LoggingConfig;

mod commands;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    let config = match HostConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_diagnostic(&e.message);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging, cli.log_level.as_deref());

    if let Err(e) = cli.execute(&config) {
        tracing::debug!(kind = %e.kind, error = %e, "Command failed");
        output::print_diagnostic(&e.message);
        std::process::exit(1);
    }
}

/// Logs go to stderr so module output on stdout stays clean.
fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}
