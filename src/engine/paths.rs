// Paw Memory Journal — Filesystem locations
// Config lives under the platform config dir, the database under the data dir.
// Both fall back to ~/.paw when the platform dir is unknown.

use crate::atoms::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DB_FILE_NAME};
use std::path::PathBuf;

fn fallback_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".paw")
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(fallback_dir)
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(fallback_dir)
}

/// `<config_dir>/openpawz/journal.toml`
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// `<data_dir>/openpawz/memory-journal.db`
pub fn default_db_path() -> PathBuf {
    data_dir().join(DB_FILE_NAME)
}
