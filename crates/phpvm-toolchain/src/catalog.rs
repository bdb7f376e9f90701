//! The catalog of known PHP and Composer releases.
//!
//! The catalog is immutable once built. The built-in table ships with phpvm;
//! a TOML file with the same shape can replace it:
//!
//! ```toml
//! [[runtime]]
//! version = "8.4.1"
//! released = "2024-11-21"
//! [runtime.urls]
//! x64 = "https://download.herdphp.com/herd-lite/linux/x64/8.4/php"
//! arm64 = "https://download.herdphp.com/herd-lite/linux/arm64/8.4/php"
//!
//! [[tool]]
//! version = "2.8.11"
//! released = "2024-08-21"
//! url = "https://getcomposer.org/download/2.8.11/composer.phar"
//! min_runtime = "7.2.5"
//! max_runtime = "8.4.99"
//! compatible = ["8.0", "8.1", "8.2", "8.3", "8.4"]
//! ```

use crate::platform::Arch;
use chrono::NaiveDate;
use phpvm_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A PHP release with prebuilt binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeVersion {
    /// Version id (e.g., "8.4.1").
    pub version: String,
    /// Release date.
    pub released: NaiveDate,
    /// Download URL per architecture tag (`x64`, `arm64`).
    pub urls: BTreeMap<String, String>,
}

impl RuntimeVersion {
    /// Download URL for `arch`, if the catalog has one.
    pub fn download_url(&self, arch: Arch) -> Option<&str> {
        self.urls.get(arch.tag()).map(String::as_str)
    }
}

/// A Composer release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersion {
    /// Version id (e.g., "2.8.11").
    pub version: String,
    /// Release date.
    pub released: NaiveDate,
    /// Download URL of `composer.phar`.
    pub url: String,
    /// Oldest supported PHP. Informational only.
    #[serde(default)]
    pub min_runtime: Option<String>,
    /// Newest supported PHP. Informational only.
    #[serde(default)]
    pub max_runtime: Option<String>,
    /// PHP major.minor keys this release is known to work with.
    pub compatible: Vec<String>,
}

impl ToolVersion {
    /// Whether `major_minor` is in the compatible set.
    pub fn supports(&self, major_minor: &str) -> bool {
        self.compatible.iter().any(|c| c == major_minor)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "runtime")]
    runtimes: Vec<RuntimeVersion>,
    #[serde(default, rename = "tool")]
    tools: Vec<ToolVersion>,
}

/// Immutable table of known runtime and tool releases.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    runtimes: Vec<RuntimeVersion>,
    tools: Vec<ToolVersion>,
}

impl Catalog {
    /// Build a catalog from explicit entries. Order is preserved.
    pub fn new(runtimes: Vec<RuntimeVersion>, tools: Vec<ToolVersion>) -> Self {
        Self { runtimes, tools }
    }

    /// The table shipped with phpvm.
    pub fn builtin() -> Self {
        Self::new(
            vec![runtime(
                "8.4.1",
                date(2024, 11, 21),
                "https://download.herdphp.com/herd-lite/linux/x64/8.4/php",
                "https://download.herdphp.com/herd-lite/linux/arm64/8.4/php",
            )],
            vec![
                ToolVersion {
                    version: "2.8.11".into(),
                    released: date(2024, 8, 21),
                    url: "https://getcomposer.org/download/2.8.11/composer.phar".into(),
                    min_runtime: Some("7.2.5".into()),
                    max_runtime: Some("8.4.99".into()),
                    compatible: keys(&["8.0", "8.1", "8.2", "8.3", "8.4"]),
                },
                ToolVersion {
                    version: "2.7.9".into(),
                    released: date(2024, 6, 4),
                    url: "https://getcomposer.org/download/2.7.9/composer.phar".into(),
                    min_runtime: Some("7.2.5".into()),
                    max_runtime: Some("8.3.99".into()),
                    compatible: keys(&["8.0", "8.1", "8.2", "8.3"]),
                },
            ],
        )
    }

    /// Parse a catalog from TOML.
    pub fn parse(s: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(s).map_err(|e| Error::Config {
            message: format!("invalid catalog: {}", e),
            path: None,
            source: Some(Box::new(e)),
            fixes: vec![],
        })?;
        Ok(Self::new(file.runtimes, file.tools))
    }

    /// Load a catalog file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading catalog from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io("failed to read catalog", path, e))?;
        Self::parse(&content).map_err(|e| match e {
            Error::Config {
                message,
                source,
                fixes,
                ..
            } => Error::Config {
                message,
                path: Some(path.to_path_buf()),
                source,
                fixes,
            },
            other => other,
        })
    }

    /// Load from `path` when given, otherwise use the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// All runtime releases in catalog order.
    pub fn runtimes(&self) -> &[RuntimeVersion] {
        &self.runtimes
    }

    /// All tool releases in catalog order.
    pub fn tools(&self) -> &[ToolVersion] {
        &self.tools
    }

    /// Look up a runtime release by exact id.
    pub fn runtime(&self, version: &str) -> Option<&RuntimeVersion> {
        self.runtimes.iter().find(|r| r.version == version)
    }
}

fn runtime(version: &str, released: NaiveDate, x64: &str, arm64: &str) -> RuntimeVersion {
    RuntimeVersion {
        version: version.into(),
        released,
        urls: BTreeMap::from([
            (Arch::X64.tag().to_string(), x64.to_string()),
            (Arch::Arm64.tag().to_string(), arm64.to_string()),
        ]),
    }
}

fn keys(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// Built-in dates are literals; an invalid one is a typo caught by the tests.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
