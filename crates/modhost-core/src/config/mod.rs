//! Host configuration schemas.
//!
//! Configuration is deserialized via the `config` crate from an optional
//! TOML file plus `MODHOST_`-prefixed environment variables (for example
//! `MODHOST_PLUGINS__DIRECTORY`). Every field has a default, so a host with
//! no configuration at all still starts.

pub mod logging;
pub mod plugin;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::plugin::PluginConfig;

use crate::error::AppError;

/// Root host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HostConfig {
    /// Load configuration.
    ///
    /// Merges `config/default` (optional), the given file (required when
    /// passed), and environment variables prefixed with `MODHOST`.
    pub fn load(file: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("MODHOST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config = HostConfig::default();
        assert_eq!(config.plugins.directory, "./plugins");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(
            file,
            "[plugins]\ndirectory = \"/opt/modules\"\n\n[logging]\nlevel = \"debug\""
        )
        .expect("write");

        let config = HostConfig::load(Some(file.path())).expect("load");
        assert_eq!(config.plugins.directory, "/opt/modules");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_explicit_file_is_configuration_error() {
        let err = HostConfig::load(Some(Path::new("/nonexistent/modhost.toml")))
            .expect_err("missing file must fail");
        assert_eq!(err.kind, crate::ErrorKind::Configuration);
    }
}
