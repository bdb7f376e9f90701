//! PHP and Composer installation.
//!
//! Installing a PHP version downloads its binary into `versions/<id>/php`,
//! then resolves a compatible Composer release, downloads it once into the
//! shared `tools/<id>/composer.phar`, and writes a per-version wrapper that
//! binds the two. Composer failures never undo the PHP installation; they
//! come back as a [`Warning`].

use crate::catalog::Catalog;
use crate::download::Fetcher;
use crate::layout::{Layout, is_plain_component};
use crate::lock::InstallLock;
use crate::platform::Arch;
use crate::resolve::resolve_tool;
use crate::warning::Warning;
use crate::wrapper::{make_executable, write_wrapper};
use phpvm_core::{Error, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of setting up Composer for an installed PHP version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInstall {
    /// The wrapper was (re)written for this version.
    Installed {
        /// Composer version bound to the PHP version.
        version: String,
        /// Shared `composer.phar` path.
        artifact: PathBuf,
        /// Per-version wrapper path.
        wrapper: PathBuf,
        /// Whether the artifact was downloaded by this call.
        downloaded: bool,
    },
    /// PHP was already installed with a wrapper; nothing was touched.
    AlreadyConfigured,
    /// Composer could not be set up.
    Skipped(Warning),
}

/// Result of [`Installer::install`].
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// PHP version id.
    pub version: String,
    /// `versions/<id>`.
    pub install_dir: PathBuf,
    /// Installed PHP binary.
    pub runtime: PathBuf,
    /// True when the binary was already present and no download happened.
    pub was_cached: bool,
    /// Composer outcome.
    pub tool: ToolInstall,
}

impl InstallReport {
    /// The Composer warning, if setup was skipped.
    pub fn warning(&self) -> Option<&Warning> {
        match &self.tool {
            ToolInstall::Skipped(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Installs catalog versions into a [`Layout`].
pub struct Installer {
    layout: Layout,
    catalog: Arc<Catalog>,
    fetcher: Arc<dyn Fetcher>,
    machine: String,
}

impl Installer {
    /// Create an installer for the running machine's architecture.
    pub fn new(layout: Layout, catalog: Arc<Catalog>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            layout,
            catalog,
            fetcher,
            machine: std::env::consts::ARCH.to_string(),
        }
    }

    /// Override the machine name used to pick download URLs.
    pub fn with_arch(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    /// Install PHP `version` and, best-effort, a compatible Composer.
    ///
    /// Unknown versions and unsupported architectures fail before anything
    /// is written to disk.
    #[instrument(skip(self))]
    pub async fn install(&self, version: &str) -> Result<InstallReport> {
        let runtime = self
            .catalog
            .runtime(version)
            .ok_or_else(|| Error::version_not_found(version))?;

        let unsupported = || Error::unsupported_architecture(&self.machine, version);
        let arch = Arch::from_machine(&self.machine).ok_or_else(unsupported)?;
        let url = runtime.download_url(arch).ok_or_else(unsupported)?;

        if !is_plain_component(version) {
            return Err(Error::config(format!(
                "catalog version id '{}' is not a valid directory name",
                version
            )));
        }

        let _lock = InstallLock::acquire(&self.layout)?;

        let install_dir = self.layout.version_dir(version);
        let binary = self.layout.runtime_binary(version);
        let was_cached = binary.is_file();

        if was_cached {
            info!("PHP {} already installed at {}", version, binary.display());
        } else {
            let created = !install_dir.exists();
            fs::create_dir_all(&install_dir)
                .map_err(|e| Error::io("Failed to create install directory", &install_dir, e))?;

            let fetched = self
                .fetcher
                .fetch(url, &binary, &format!("PHP {}", version))
                .await;
            if let Err(err) = fetched {
                if created {
                    // Only removes the directory if the download left it empty.
                    let _ = fs::remove_dir(&install_dir);
                }
                return Err(err.for_version(version));
            }
            make_executable(&binary)?;
            info!("Installed PHP {} to {}", version, binary.display());
        }

        let tool = if was_cached && self.layout.tool_wrapper(version).is_file() {
            ToolInstall::AlreadyConfigured
        } else {
            match self.install_tool(version).await {
                Ok(tool) => tool,
                Err(err) => {
                    let warning = Warning::from_tool_error(version, &err);
                    warn!("{}", warning);
                    ToolInstall::Skipped(warning)
                }
            }
        };

        Ok(InstallReport {
            version: version.to_string(),
            install_dir,
            runtime: binary,
            was_cached,
            tool,
        })
    }

    async fn install_tool(&self, runtime: &str) -> Result<ToolInstall> {
        let tool = resolve_tool(&self.catalog, runtime).ok_or_else(|| Error::NoCompatibleTool {
            runtime: runtime.to_string(),
        })?;

        if !is_plain_component(&tool.version) {
            return Err(Error::config(format!(
                "catalog Composer id '{}' is not a valid directory name",
                tool.version
            )));
        }

        let tool_dir = self.layout.tool_dir(&tool.version);
        let artifact = self.layout.tool_artifact(&tool.version);
        let downloaded = if artifact.is_file() {
            debug!("Composer {} already present", tool.version);
            false
        } else {
            fs::create_dir_all(&tool_dir)
                .map_err(|e| Error::io("Failed to create tool directory", &tool_dir, e))?;
            self.fetcher
                .fetch(&tool.url, &artifact, &format!("Composer {}", tool.version))
                .await?;
            make_executable(&artifact)?;
            true
        };

        let wrapper = self.layout.tool_wrapper(runtime);
        write_wrapper(&wrapper, &self.layout.runtime_binary(runtime), &artifact)?;
        info!("Bound Composer {} to PHP {}", tool.version, runtime);

        Ok(ToolInstall::Installed {
            version: tool.version.clone(),
            artifact,
            wrapper,
            downloaded,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::catalog::{RuntimeVersion, ToolVersion};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn installer(root: &std::path::Path, fetcher: Arc<MemoryFetcher>) -> Installer {
        Installer::new(Layout::new(root), Arc::new(Catalog::builtin()), fetcher).with_arch("x86_64")
    }

    #[tokio::test]
    async fn test_install_runtime_and_tool() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = builtin_fetcher();
        let layout = Layout::new(dir.path());

        let report = installer(dir.path(), fetcher.clone())
            .install("8.4.1")
            .await
            .unwrap();

        assert!(!report.was_cached);
        assert_eq!(report.runtime, layout.runtime_binary("8.4.1"));
        assert!(layout.is_installed("8.4.1"));
        assert!(layout.tool_artifact("2.8.11").is_file());
        assert_eq!(
            report.tool,
            ToolInstall::Installed {
                version: "2.8.11".into(),
                artifact: layout.tool_artifact("2.8.11"),
                wrapper: layout.tool_wrapper("8.4.1"),
                downloaded: true,
            }
        );
        assert!(report.warning().is_none());

        let wrapper = fs::read_to_string(layout.tool_wrapper("8.4.1")).unwrap();
        assert!(wrapper.starts_with("#!/bin/bash\n"));
        assert!(wrapper.contains(&format!(
            "{} {} \"$@\"",
            layout.runtime_binary("8.4.1").display(),
            layout.tool_artifact("2.8.11").display()
        )));
        assert_eq!(fetcher.requests(), vec![PHP_X64, COMPOSER]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(layout.runtime_binary("8.4.1"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = builtin_fetcher();
        let installer = installer(dir.path(), fetcher.clone());

        installer.install("8.4.1").await.unwrap();
        let before = fs::read(Layout::new(dir.path()).tool_wrapper("8.4.1")).unwrap();
        let second = installer.install("8.4.1").await.unwrap();

        assert!(second.was_cached);
        assert_eq!(second.tool, ToolInstall::AlreadyConfigured);
        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(
            fs::read(Layout::new(dir.path()).tool_wrapper("8.4.1")).unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn test_cached_runtime_still_gets_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.version_dir("8.4.1")).unwrap();
        fs::write(layout.runtime_binary("8.4.1"), b"php").unwrap();

        let fetcher = builtin_fetcher();
        let report = installer(dir.path(), fetcher.clone())
            .install("8.4.1")
            .await
            .unwrap();

        assert!(report.was_cached);
        assert!(matches!(report.tool, ToolInstall::Installed { .. }));
        assert_eq!(fetcher.requests(), vec![COMPOSER]);
        assert!(layout.tool_wrapper("8.4.1").is_file());
    }

    #[tokio::test]
    async fn test_unknown_version_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let fetcher = builtin_fetcher();

        let err = installer(&root, fetcher.clone())
            .install("9.9.9")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::VersionNotFound { ref version, .. } if version == "9.9.9"));
        assert!(!root.exists());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_architecture() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");

        let err = installer(&root, builtin_fetcher())
            .with_arch("riscv64")
            .install("8.4.1")
            .await
            .unwrap_err();

        match &err {
            Error::UnsupportedArchitecture { arch, version, .. } => {
                assert_eq!(arch, "riscv64");
                assert_eq!(version, "8.4.1");
                assert_eq!(err.fixes()[0].command.as_deref(), Some("phpvm list"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_runtime_download_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let fetcher = Arc::new(MemoryFetcher::default());

        let err = installer(dir.path(), fetcher)
            .install("8.4.1")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DownloadFailed { .. }));
        assert!(err.to_string().contains("PHP 8.4.1"));
        assert_eq!(err.fixes()[0].command.as_deref(), Some("phpvm install 8.4.1"));
        assert!(!layout.version_dir("8.4.1").exists());
        assert!(!layout.is_installed("8.4.1"));
    }

    #[tokio::test]
    async fn test_tool_failure_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(MemoryFetcher::default().with(PHP_X64, b"php"));

        let report = installer(dir.path(), fetcher)
            .install("8.4.1")
            .await
            .unwrap();

        assert!(Layout::new(dir.path()).is_installed("8.4.1"));
        assert!(matches!(report.warning(), Some(Warning::ToolFailed { .. })));
    }

    #[tokio::test]
    async fn test_no_compatible_tool_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://example.com/php/7.4";
        let catalog = Catalog::new(
            vec![RuntimeVersion {
                version: "7.4.33".into(),
                released: NaiveDate::from_ymd_opt(2022, 11, 3).unwrap(),
                urls: BTreeMap::from([("x64".to_string(), url.to_string())]),
            }],
            Catalog::builtin().tools().to_vec(),
        );
        let fetcher = Arc::new(MemoryFetcher::default().with(url, b"php"));

        let report = Installer::new(Layout::new(dir.path()), Arc::new(catalog), fetcher.clone())
            .with_arch("amd64")
            .install("7.4.33")
            .await
            .unwrap();

        assert_eq!(
            report.warning(),
            Some(&Warning::NoCompatibleTool {
                runtime: "7.4.33".into()
            })
        );
        assert_eq!(fetcher.requests(), vec![url]);
    }

    #[tokio::test]
    async fn test_tool_shared_between_runtimes() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 11, 21).unwrap();
        let runtime = |version: &str| RuntimeVersion {
            version: version.into(),
            released: date,
            urls: BTreeMap::from([(
                "arm64".to_string(),
                format!("https://example.com/{version}/php"),
            )]),
        };
        let catalog = Catalog::new(
            vec![runtime("8.4.1"), runtime("8.3.14")],
            vec![ToolVersion {
                version: "2.8.11".into(),
                released: date,
                url: COMPOSER.into(),
                min_runtime: None,
                max_runtime: None,
                compatible: vec!["8.3".into(), "8.4".into()],
            }],
        );
        let fetcher = Arc::new(
            MemoryFetcher::default()
                .with("https://example.com/8.4.1/php", b"php84")
                .with("https://example.com/8.3.14/php", b"php83")
                .with(COMPOSER, b"<?php"),
        );
        let installer = Installer::new(layout.clone(), Arc::new(catalog), fetcher.clone())
            .with_arch("aarch64");

        installer.install("8.4.1").await.unwrap();
        let second = installer.install("8.3.14").await.unwrap();

        assert!(matches!(
            second.tool,
            ToolInstall::Installed {
                downloaded: false,
                ..
            }
        ));
        assert_eq!(
            fetcher
                .requests()
                .iter()
                .filter(|url| url.as_str() == COMPOSER)
                .count(),
            1
        );
        let wrapper = fs::read_to_string(layout.tool_wrapper("8.3.14")).unwrap();
        assert!(wrapper.contains(&layout.runtime_binary("8.3.14").display().to_string()));
    }
}
