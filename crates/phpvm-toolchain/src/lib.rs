//! PHP version management for phpvm.
//!
//! This crate handles:
//! - The catalog of known PHP and Composer releases
//! - Resolving the best Composer release for a PHP version
//! - Installing PHP binaries and shared Composer artifacts
//! - Activating one installed PHP through `bin/` pointers and shell profiles
//! - Reporting catalog and activation state

pub mod activate;
pub mod catalog;
pub mod download;
pub mod install;
pub mod layout;
pub mod lock;
pub mod platform;
pub mod resolve;
pub mod shell;
pub mod status;
pub mod warning;
pub mod wrapper;

pub use activate::{Activation, Activator, ToolBinding, active_version};
pub use catalog::{Catalog, RuntimeVersion, ToolVersion};
pub use download::{DownloadOptions, Fetcher, HttpFetcher};
pub use install::{InstallReport, Installer, ToolInstall};
pub use layout::Layout;
pub use lock::InstallLock;
pub use platform::Arch;
pub use resolve::{extract_major_minor, resolve_tool};
pub use shell::{PATH_MARKER, ShellIntegration};
pub use status::{CatalogEntry, current_active, current_active_from, list_catalog};
pub use warning::Warning;
