//! Read-only queries: catalog listing and the active PHP.

use crate::activate::active_version;
use crate::catalog::{Catalog, RuntimeVersion};
use crate::layout::{Layout, RUNTIME_BINARY};
use phpvm_core::{CommandRunner, Error, Result};
use std::ffi::OsStr;
use tracing::debug;

/// A catalog runtime annotated with local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub runtime: RuntimeVersion,
    /// The binary exists under `versions/`.
    pub installed: bool,
    /// `bin/php` points at this version.
    pub active: bool,
}

/// All catalog runtimes, newest release first.
pub fn list_catalog(catalog: &Catalog, layout: &Layout) -> Vec<CatalogEntry> {
    let active = active_version(layout);
    let mut entries: Vec<CatalogEntry> = catalog
        .runtimes()
        .iter()
        .map(|runtime| CatalogEntry {
            installed: layout.is_installed(&runtime.version),
            active: active.as_deref() == Some(runtime.version.as_str()),
            runtime: runtime.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.runtime.released.cmp(&a.runtime.released));
    entries
}

/// Version banner of the `php` found on PATH.
pub async fn current_active() -> Result<String> {
    current_active_from(RUNTIME_BINARY).await
}

/// Run `program -v` and return the first line of its output verbatim.
///
/// Any failure to locate, start or successfully run the program is
/// reported as `NoActiveRuntime`.
pub async fn current_active_from(program: impl AsRef<OsStr>) -> Result<String> {
    let program = program.as_ref();
    let path = which::which(program).map_err(|e| {
        Error::no_active_runtime(format!("{} not found: {}", program.to_string_lossy(), e))
    })?;
    debug!("Querying version of {}", path.display());

    let output = CommandRunner::new()
        .run(path.as_os_str(), [OsStr::new("-v")])
        .await
        .map_err(|e| Error::no_active_runtime(format!("failed to run {}: {}", path.display(), e)))?;

    if !output.success() {
        return Err(Error::no_active_runtime(format!(
            "{} -v exited with code {}: {}",
            path.display(),
            output.exit_code,
            output.combined().trim()
        )));
    }

    output
        .first_line()
        .map(str::to_string)
        .ok_or_else(|| Error::no_active_runtime(format!("{} -v printed nothing", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::fs;

    fn runtime(version: &str, released: (i32, u32, u32)) -> RuntimeVersion {
        RuntimeVersion {
            version: version.into(),
            released: NaiveDate::from_ymd_opt(released.0, released.1, released.2).unwrap(),
            urls: BTreeMap::new(),
        }
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let catalog = Catalog::new(
            vec![
                runtime("8.2.0", (2022, 12, 8)),
                runtime("8.4.1", (2024, 11, 21)),
                runtime("8.3.0", (2023, 11, 23)),
            ],
            vec![],
        );
        fs::create_dir_all(layout.version_dir("8.3.0")).unwrap();
        fs::write(layout.runtime_binary("8.3.0"), "").unwrap();

        let entries = list_catalog(&catalog, &layout);
        let versions: Vec<_> = entries.iter().map(|e| e.runtime.version.as_str()).collect();
        assert_eq!(versions, ["8.4.1", "8.3.0", "8.2.0"]);
        let installed: Vec<_> = entries.iter().map(|e| e.installed).collect();
        assert_eq!(installed, [false, true, false]);
        assert!(entries.iter().all(|e| !e.active));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_marks_active() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.version_dir("8.4.1")).unwrap();
        fs::write(layout.runtime_binary("8.4.1"), "").unwrap();
        fs::create_dir_all(layout.bin_dir()).unwrap();
        std::os::unix::fs::symlink(layout.runtime_binary("8.4.1"), layout.active_runtime())
            .unwrap();

        let entries = list_catalog(&Catalog::builtin(), &layout);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].installed);
        assert!(entries[0].active);
    }

    #[cfg(unix)]
    fn script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("php");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_current_active_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let php = script(
            dir.path(),
            "echo 'PHP 8.4.1 (cli) (built: Nov 21 2024)'\necho 'Copyright (c) The PHP Group'",
        );

        let banner = current_active_from(&php).await.unwrap();
        assert_eq!(banner, "PHP 8.4.1 (cli) (built: Nov 21 2024)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_current_active_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let php = script(dir.path(), "echo broken >&2\nexit 3");

        let err = current_active_from(&php).await.unwrap_err();
        assert!(matches!(err, Error::NoActiveRuntime { .. }));
    }

    #[tokio::test]
    async fn test_current_active_missing_binary() {
        let err = current_active_from("/nonexistent/phpvm-test/php")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoActiveRuntime { .. }));
    }
}
