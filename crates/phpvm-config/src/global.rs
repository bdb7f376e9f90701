//! Global configuration.
//!
//! Global config is stored at `~/.config/phpvm/config.toml` (or platform
//! equivalent, or `$PHPVM_CONFIG_FILE`). Every field is optional; a missing
//! file means defaults everywhere.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error type for global config operations.
#[derive(Debug, Error)]
pub enum GlobalConfigError {
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl From<GlobalConfigError> for phpvm_core::Error {
    fn from(err: GlobalConfigError) -> Self {
        let path = match &err {
            GlobalConfigError::ReadError { path, .. } | GlobalConfigError::ParseError { path, .. } => {
                path.clone()
            }
        };
        phpvm_core::Error::Config {
            message: err.to_string(),
            path: Some(path),
            source: Some(Box::new(err)),
            fixes: vec![],
        }
    }
}

/// Global configuration.
///
/// # Example
///
/// ```toml
/// # ~/.config/phpvm/config.toml
/// root = "/opt/phpvm"
/// catalog = "/etc/phpvm/catalog.toml"
///
/// [download]
/// timeout_secs = 120
/// retries = 5
/// backoff_ms = 250
///
/// [shell]
/// profiles = ["~/.zshrc"]
/// verify = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GlobalConfig {
    /// Installation root. `$PHPVM_DIR` takes precedence.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Catalog file replacing the built-in version table.
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// Download behaviour
    #[serde(default)]
    pub download: DownloadConfig,

    /// Shell startup file integration
    #[serde(default)]
    pub shell: ShellConfig,
}

/// Download settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Initial backoff between attempts, doubled every retry.
    pub backoff_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            retries: 3,
            backoff_ms: 500,
        }
    }
}

/// Shell integration settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Startup files to manage instead of `~/.bashrc`, `~/.zshrc`, `~/.profile`.
    /// A leading `~/` is expanded against the home directory.
    pub profiles: Option<Vec<PathBuf>>,
    /// Source the updated profile in a subshell after activation.
    pub verify: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            profiles: None,
            verify: true,
        }
    }
}

impl ShellConfig {
    /// Configured profiles with `~/` expanded against `home`.
    pub fn expanded_profiles(&self, home: &Path) -> Option<Vec<PathBuf>> {
        self.profiles.as_ref().map(|profiles| {
            profiles
                .iter()
                .map(|p| match p.strip_prefix("~") {
                    Ok(rest) => home.join(rest),
                    Err(_) => p.clone(),
                })
                .collect()
        })
    }
}

impl GlobalConfig {
    /// Parse global config from a TOML string.
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Parse global config from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GlobalConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            GlobalConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&content).map_err(|source| GlobalConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load the global configuration.
///
/// `explicit` (from `--config-file`) wins over `$PHPVM_CONFIG_FILE`, which wins
/// over the platform default. A missing default file yields defaults; a
/// missing explicit file is an error.
pub fn load_global_config(explicit: Option<&Path>) -> Result<GlobalConfig, GlobalConfigError> {
    let env_file = std::env::var_os(phpvm_core::EnvVars::PHPVM_CONFIG_FILE).map(PathBuf::from);

    if let Some(path) = explicit.map(Path::to_path_buf).or(env_file) {
        debug!("Loading config from {}", path.display());
        return GlobalConfig::from_file(&path);
    }

    let Some(config_file) = crate::paths::default_config_file() else {
        debug!("Could not determine global config path");
        return Ok(GlobalConfig::default());
    };

    if !config_file.exists() {
        debug!(
            "Global config file does not exist: {}",
            config_file.display()
        );
        return Ok(GlobalConfig::default());
    }

    debug!("Loading global config from: {}", config_file.display());
    GlobalConfig::from_file(&config_file)
}
