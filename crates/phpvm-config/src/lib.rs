//! Configuration for phpvm.
//!
//! This crate handles:
//! - Parsing the global `config.toml`
//! - Locating the installation root and the user's home directory
//! - Download and shell-integration settings

pub mod global;
pub mod paths;

pub use global::{
    DownloadConfig, GlobalConfig, GlobalConfigError, ShellConfig, load_global_config,
};
pub use paths::{default_config_file, home_dir, install_root};

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Name of the installation root directory under `$HOME`.
pub const ROOT_DIR_NAME: &str = ".phpvm";
