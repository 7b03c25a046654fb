//! Runtime configuration for the status cache.
//!
//! [`StatusConfig`] is read from `config.json` in the platform configuration
//! directory (see [`crate::core::dirs`]). Every field has a default, so a partial
//! file only overrides what it names and a missing file means "all defaults".

use crate::core::dirs::get_config_file;
use crate::core::error::{Result, StatusCacheError};
use crate::core::resolver::PriorityTable;
use crate::core::summary::ClassificationTable;
use crate::core::watcher::RearmPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    /// Minimum spacing between update notifications per repository
    pub debounce_ms: u64,
    /// Pass `--ignored` to `git status`
    pub include_ignored: bool,
    pub git_binary: String,
    pub rearm_attempts: u32,
    pub rearm_delay_ms: u64,
    pub priorities: PriorityTable,
    pub classification: ClassificationTable,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            include_ignored: false,
            git_binary: "git".to_string(),
            rearm_attempts: 3,
            rearm_delay_ms: 50,
            priorities: PriorityTable::default(),
            classification: ClassificationTable::default(),
        }
    }
}

impl StatusConfig {
    /// Load the user configuration, falling back to defaults when no file exists
    pub fn load_or_default() -> Result<Self> {
        let config_file = get_config_file()?;

        if config_file.exists() {
            Self::from_file(&config_file)
        } else {
            log::debug!(
                "No config file at {}, using defaults",
                config_file.display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StatusCacheError::config_read_failed(path, e))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| StatusCacheError::config_parse_failed(path, e))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rearm_policy(&self) -> RearmPolicy {
        RearmPolicy {
            attempts: self.rearm_attempts,
            delay: Duration::from_millis(self.rearm_delay_ms),
        }
    }
}
