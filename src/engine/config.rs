// Paw Memory Journal — Configuration
// `journal.toml` is optional; every field has a default. Command-line flags
// override whatever is loaded here.

use crate::atoms::constants::{DEFAULT_LOG_LEVEL, DEFAULT_PROJECT_ID};
use crate::atoms::error::{EngineError, EngineResult};
use crate::engine::paths;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// SQLite database; `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
    pub default_project: String,
    pub log_level: String,
    /// Log tolerated replay anomalies (deleting an already-absent path) at
    /// warn level during verification.
    pub surface_delete_warnings: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        JournalConfig {
            db_path: None,
            default_project: DEFAULT_PROJECT_ID.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            surface_delete_warnings: true,
        }
    }
}

impl JournalConfig {
    /// Load from the default location, or defaults if no file exists there.
    pub fn load_default() -> EngineResult<Self> {
        Self::load_or_default(&paths::default_config_path())
    }

    /// Load `path`; a missing file yields defaults, a malformed one is an error.
    pub fn load_or_default(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            debug!("[config] No config at {:?}; using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: JournalConfig = toml::from_str(&raw)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        info!("[config] Loaded {:?}", path);
        Ok(config)
    }

    pub fn parse(raw: &str) -> EngineResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(paths::default_db_path)
    }
}
