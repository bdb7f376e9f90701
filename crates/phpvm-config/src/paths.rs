//! Well-known locations.

use crate::{CONFIG_FILENAME, GlobalConfig, ROOT_DIR_NAME};
use directories::{BaseDirs, ProjectDirs};
use phpvm_core::{EnvVars, Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// The user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| Error::config("could not determine home directory"))
}

/// Default location of the global config file.
///
/// - Linux: `~/.config/phpvm/config.toml`
/// - macOS: `~/Library/Application Support/phpvm/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("dev", "phpvm", "phpvm").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Resolve the installation root.
///
/// Precedence: `$PHPVM_DIR`, then `root` from the config, then `~/.phpvm`.
pub fn install_root(config: &GlobalConfig) -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(EnvVars::PHPVM_DIR).filter(|d| !d.is_empty()) {
        debug!("Using installation root from {}", EnvVars::PHPVM_DIR);
        return Ok(PathBuf::from(dir));
    }
    if let Some(ref root) = config.root {
        return Ok(root.clone());
    }
    Ok(home_dir()?.join(ROOT_DIR_NAME))
}
