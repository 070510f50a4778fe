//! Plugin discovery configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Plugin discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory scanned for module shared libraries.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
        }
    }
}

impl PluginConfig {
    /// Returns the plugin directory as a path.
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}
