//! Activation of an installed PHP version.
//!
//! The active version is whatever `bin/php` points at. Switching replaces
//! that symlink by rename so it always resolves to exactly one installed
//! binary, rewrites the `bin/composer` wrapper for the new version, and
//! makes sure `bin/` is on the user's PATH.

use crate::catalog::Catalog;
use crate::layout::Layout;
use crate::lock::InstallLock;
use crate::resolve::resolve_tool;
use crate::shell::ShellIntegration;
use crate::warning::Warning;
use crate::wrapper::{replace_symlink, write_wrapper};
use phpvm_core::{Error, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Composer state after an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolBinding {
    /// `bin/composer` runs this Composer release with the active PHP.
    Bound { version: String, wrapper: PathBuf },
    /// No wrapper was written; see the activation warnings.
    Unavailable,
}

/// Result of [`Activator::activate`].
#[derive(Debug, Clone)]
pub struct Activation {
    pub version: String,
    /// Installed binary the pointer resolves to.
    pub runtime: PathBuf,
    /// The `bin/php` pointer.
    pub pointer: PathBuf,
    pub tool: ToolBinding,
    /// Whether any shell startup file was changed.
    pub path_added: bool,
    /// Output of the verification subshell, when it ran cleanly.
    pub verification: Option<String>,
    pub warnings: Vec<Warning>,
}

/// Switches the active PHP version.
pub struct Activator {
    layout: Layout,
    catalog: Arc<Catalog>,
    shell: ShellIntegration,
    verify: bool,
}

impl Activator {
    pub fn new(layout: Layout, catalog: Arc<Catalog>, shell: ShellIntegration) -> Self {
        Self {
            layout,
            catalog,
            shell,
            verify: true,
        }
    }

    /// Enable or disable the post-activation verification subshell.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Make `version` the active PHP.
    ///
    /// Fails with `NotInstalled`, without touching the filesystem, when the
    /// version has no installed binary. Composer, shell and verification
    /// problems are reported as warnings.
    #[instrument(skip(self))]
    pub async fn activate(&self, version: &str) -> Result<Activation> {
        if !self.layout.is_installed(version) {
            return Err(Error::not_installed(version));
        }

        let _lock = InstallLock::acquire(&self.layout)?;

        let bin_dir = self.layout.bin_dir();
        fs::create_dir_all(&bin_dir)
            .map_err(|e| Error::io("Failed to create bin directory", &bin_dir, e))?;

        let runtime = self.layout.runtime_binary(version);
        let pointer = self.layout.active_runtime();
        replace_symlink(&runtime, &pointer)?;
        info!("Activated PHP {} ({})", version, runtime.display());

        let mut warnings = Vec::new();

        let tool = match self.bind_tool(version) {
            Ok(tool) => tool,
            Err(warning) => {
                warn!("{}", warning);
                warnings.push(warning);
                ToolBinding::Unavailable
            }
        };

        let path_added = match self.shell.ensure_path_entry(&bin_dir) {
            Ok(added) => added,
            Err(err) => {
                let warning = Warning::ShellUpdateFailed {
                    reason: err.to_string(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                false
            }
        };

        let verification = if path_added && self.verify {
            match self.shell.verify(&bin_dir).await {
                Ok(output) => Some(output),
                Err(err) => {
                    let warning = Warning::VerificationFailed {
                        reason: err.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    None
                }
            }
        } else {
            None
        };

        Ok(Activation {
            version: version.to_string(),
            runtime,
            pointer,
            tool,
            path_added,
            verification,
            warnings,
        })
    }

    /// Point `bin/composer` at the Composer release resolved for `version`.
    fn bind_tool(&self, version: &str) -> std::result::Result<ToolBinding, Warning> {
        let tool = resolve_tool(&self.catalog, version).ok_or_else(|| Warning::NoCompatibleTool {
            runtime: version.to_string(),
        })?;

        let artifact = self.layout.tool_artifact(&tool.version);
        if !artifact.is_file() {
            return Err(Warning::ToolArtifactMissing {
                runtime: version.to_string(),
                tool: tool.version.clone(),
                path: artifact,
            });
        }

        let wrapper = self.layout.active_tool();
        write_wrapper(&wrapper, &self.layout.active_runtime(), &artifact)
            .map_err(|err| Warning::from_tool_error(version, &err))?;
        info!("Composer {} linked to PHP {}", tool.version, version);

        Ok(ToolBinding::Bound {
            version: tool.version.clone(),
            wrapper,
        })
    }
}

/// Version `bin/php` currently points at, read from the symlink target.
///
/// `None` when nothing is active or the pointer does not lead into
/// `versions/`.
pub fn active_version(layout: &Layout) -> Option<String> {
    let target = fs::read_link(layout.active_runtime()).ok()?;
    let version_dir = target.parent()?;
    if version_dir.parent()? != layout.versions_dir() {
        return None;
    }
    version_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::shell::path_export_line;
    use std::path::Path;

    fn install_fake(layout: &Layout, version: &str) {
        fs::create_dir_all(layout.version_dir(version)).unwrap();
        fs::write(layout.runtime_binary(version), format!("php {version}")).unwrap();
    }

    fn install_banner_script(layout: &Layout, version: &str) {
        use std::os::unix::fs::PermissionsExt;
        let binary = layout.runtime_binary(version);
        fs::create_dir_all(layout.version_dir(version)).unwrap();
        fs::write(&binary, format!("#!/bin/sh\necho 'PHP {version} (cli)'\n")).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn activator(root: &Path, home: &Path) -> Activator {
        Activator::new(
            Layout::new(root),
            Arc::new(Catalog::builtin()),
            ShellIntegration::for_home(home),
        )
        .with_verification(false)
    }

    fn tree(dir: &Path) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(path) = stack.pop() {
            for entry in fs::read_dir(&path).unwrap() {
                let entry = entry.unwrap().path();
                if entry.is_dir() {
                    stack.push(entry.clone());
                }
                entries.push(entry);
            }
        }
        entries.sort();
        entries
    }

    #[tokio::test]
    async fn test_not_installed_mutates_nothing() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_fake(&layout, "8.4.1");
        let before = tree(root.path());

        let err = activator(root.path(), home.path())
            .activate("8.3.0")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotInstalled { ref version, .. } if version == "8.3.0"));
        assert_eq!(tree(root.path()), before);
        assert!(tree(home.path()).is_empty());
    }

    #[tokio::test]
    async fn test_pointer_resolves_to_installed_binary() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_fake(&layout, "8.4.1");

        let activation = activator(root.path(), home.path())
            .activate("8.4.1")
            .await
            .unwrap();

        assert_eq!(activation.pointer, layout.active_runtime());
        assert_eq!(
            fs::read_link(layout.active_runtime()).unwrap(),
            layout.runtime_binary("8.4.1")
        );
        assert_eq!(
            fs::read_to_string(layout.active_runtime()).unwrap(),
            "php 8.4.1"
        );
        assert_eq!(active_version(&layout).as_deref(), Some("8.4.1"));
        assert!(activation.path_added);
        assert!(activation.verification.is_none());
    }

    #[tokio::test]
    async fn test_switch_between_versions() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_fake(&layout, "8.4.1");
        install_fake(&layout, "8.3.14");
        let activator = activator(root.path(), home.path());

        activator.activate("8.4.1").await.unwrap();
        activator.activate("8.3.14").await.unwrap();

        assert_eq!(active_version(&layout).as_deref(), Some("8.3.14"));
        assert_eq!(
            fs::read_to_string(layout.active_runtime()).unwrap(),
            "php 8.3.14"
        );
        let leftovers: Vec<_> = fs::read_dir(layout.bin_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with('.'))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[tokio::test]
    async fn test_single_export_line_after_two_activations() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_fake(&layout, "8.4.1");
        let bashrc = home.path().join(".bashrc");
        fs::write(&bashrc, "alias ll='ls -l'\n").unwrap();
        let activator = activator(root.path(), home.path());

        let first = activator.activate("8.4.1").await.unwrap();
        let second = activator.activate("8.4.1").await.unwrap();

        assert!(first.path_added);
        assert!(!second.path_added);
        let line = path_export_line(&layout.bin_dir());
        let content = fs::read_to_string(&bashrc).unwrap();
        assert_eq!(content.lines().filter(|l| l.trim() == line).count(), 1);
        assert_eq!(content.matches(crate::shell::PATH_MARKER).count(), 1);
    }

    #[tokio::test]
    async fn test_composer_bound_when_artifact_present() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_fake(&layout, "8.4.1");
        fs::create_dir_all(layout.tool_dir("2.8.11")).unwrap();
        fs::write(layout.tool_artifact("2.8.11"), "<?php").unwrap();

        let activation = activator(root.path(), home.path())
            .activate("8.4.1")
            .await
            .unwrap();

        assert_eq!(
            activation.tool,
            ToolBinding::Bound {
                version: "2.8.11".into(),
                wrapper: layout.active_tool(),
            }
        );
        let wrapper = fs::read_to_string(layout.active_tool()).unwrap();
        assert!(wrapper.contains(&format!(
            "{} {} \"$@\"",
            layout.active_runtime().display(),
            layout.tool_artifact("2.8.11").display()
        )));
        assert!(activation.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_composer_is_a_warning() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_fake(&layout, "8.4.1");

        let activation = activator(root.path(), home.path())
            .activate("8.4.1")
            .await
            .unwrap();

        assert_eq!(activation.tool, ToolBinding::Unavailable);
        assert!(matches!(
            activation.warnings.as_slice(),
            [Warning::ToolArtifactMissing { runtime, tool, .. }]
                if runtime == "8.4.1" && tool == "2.8.11"
        ));
        let hint = activation.warnings[0].hint().unwrap();
        assert!(hint.contains("phpvm install 8.4.1"), "{hint}");
        assert!(!layout.active_tool().exists());
    }

    #[test]
    fn test_active_version_ignores_foreign_targets() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        assert_eq!(active_version(&layout), None);

        fs::create_dir_all(layout.bin_dir()).unwrap();
        std::os::unix::fs::symlink("/usr/bin/php", layout.active_runtime()).unwrap();
        assert_eq!(active_version(&layout), None);
    }

    #[tokio::test]
    async fn test_verification_reports_new_runtime() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_banner_script(&layout, "8.4.1");

        let activation = activator(root.path(), home.path())
            .with_verification(true)
            .activate("8.4.1")
            .await
            .unwrap();

        assert!(activation.path_added);
        let verification = activation.verification.unwrap();
        assert!(verification.contains("PHP 8.4.1 (cli)"), "{verification}");
        assert!(
            !activation
                .warnings
                .iter()
                .any(|w| matches!(w, Warning::VerificationFailed { .. }))
        );
    }

    #[tokio::test]
    async fn test_verification_skipped_when_path_unchanged() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        install_banner_script(&layout, "8.4.1");
        fs::write(
            home.path().join(".bashrc"),
            format!("{}\n", path_export_line(&layout.bin_dir())),
        )
        .unwrap();

        let activation = activator(root.path(), home.path())
            .with_verification(true)
            .activate("8.4.1")
            .await
            .unwrap();

        assert!(!activation.path_added);
        assert_eq!(activation.verification, None);
    }
}
