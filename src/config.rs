//! Host configuration resolved from the environment

use std::path::PathBuf;

use crate::core::logging::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};

/// Overrides the directory `.cf/plugins` is created under
pub const PLUGIN_HOME_ENV_VAR: &str = "CF_PLUGIN_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub home_dir: PathBuf,
    pub plugin_dir: PathBuf,
    pub log_filter: String,
}

impl CliConfig {
    /// Configuration rooted at `home_dir`
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        let home_dir = home_dir.into();
        Self {
            plugin_dir: home_dir.join(".cf").join("plugins"),
            home_dir,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// `CF_PLUGIN_HOME`, else the user's home directory, else `.`
    pub fn from_env() -> Self {
        let home_dir = std::env::var_os(PLUGIN_HOME_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::with_home(home_dir);
        if let Ok(filter) = std::env::var(LOG_ENV_VAR) {
            config.log_filter = filter;
        }
        config
    }

    pub fn with_plugin_dir(mut self, plugin_dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = plugin_dir.into();
        self
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
