//! On-disk layout of the installation root.
//!
//! ```text
//! <root>/
//!   versions/<php>/php          installed PHP binary
//!   versions/<php>/composer     wrapper bound to that PHP
//!   tools/<composer>/composer.phar
//!   bin/php                     activation pointer
//!   bin/composer                wrapper for the active PHP
//!   .lock
//! ```

use std::path::{Component, Path, PathBuf};

/// File name of the PHP binary.
pub const RUNTIME_BINARY: &str = "php";

/// File name of the Composer wrapper script.
pub const TOOL_WRAPPER: &str = "composer";

/// File name of the Composer artifact.
pub const TOOL_ARTIFACT: &str = "composer.phar";

/// Paths under an installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_dir().join(version)
    }

    pub fn runtime_binary(&self, version: &str) -> PathBuf {
        self.version_dir(version).join(RUNTIME_BINARY)
    }

    pub fn tool_wrapper(&self, version: &str) -> PathBuf {
        self.version_dir(version).join(TOOL_WRAPPER)
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.root.join("tools")
    }

    pub fn tool_dir(&self, tool_version: &str) -> PathBuf {
        self.tools_dir().join(tool_version)
    }

    pub fn tool_artifact(&self, tool_version: &str) -> PathBuf {
        self.tool_dir(tool_version).join(TOOL_ARTIFACT)
    }

    /// Directory users put on PATH.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn active_runtime(&self) -> PathBuf {
        self.bin_dir().join(RUNTIME_BINARY)
    }

    pub fn active_tool(&self) -> PathBuf {
        self.bin_dir().join(TOOL_WRAPPER)
    }

    /// Advisory lock serializing mutating operations.
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(".lock")
    }

    /// Whether `version` is installed, i.e. its PHP binary exists.
    ///
    /// Ids that are not a single plain path component are never installed.
    pub fn is_installed(&self, version: &str) -> bool {
        is_plain_component(version) && self.runtime_binary(version).is_file()
    }
}

/// Whether `id` can be used as one directory name without escaping its parent.
pub fn is_plain_component(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
