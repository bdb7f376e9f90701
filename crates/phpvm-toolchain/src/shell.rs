//! Shell startup file integration.
//!
//! Makes the `bin/` directory discoverable by appending a marked
//! `export PATH=...` line to the user's startup files. An entry is never
//! added twice to the same file.

use phpvm_core::{CommandRunner, Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Comment written above every PATH entry phpvm adds.
pub const PATH_MARKER: &str = "# Added by phpvm";

/// Startup files phpvm updates, in order.
const PROFILES: [&str; 3] = [".bashrc", ".zshrc", ".profile"];

/// Startup files tried when sourcing for verification, in order.
const VERIFY_PROFILES: [&str; 3] = [".zshrc", ".bashrc", ".profile"];

/// The startup files of one user.
#[derive(Debug, Clone)]
pub struct ShellIntegration {
    profiles: Vec<PathBuf>,
    verify_profiles: Vec<PathBuf>,
}

impl ShellIntegration {
    /// Use the standard bash, zsh and login profiles under `home`.
    pub fn for_home(home: &Path) -> Self {
        Self {
            profiles: PROFILES.iter().map(|p| home.join(p)).collect(),
            verify_profiles: VERIFY_PROFILES.iter().map(|p| home.join(p)).collect(),
        }
    }

    /// Use an explicit list of startup files, for both updating and
    /// verification. The first one is created when none exist.
    pub fn with_profiles(profiles: Vec<PathBuf>) -> Self {
        Self {
            verify_profiles: profiles.clone(),
            profiles,
        }
    }

    /// Files considered for the PATH entry.
    pub fn profiles(&self) -> &[PathBuf] {
        &self.profiles
    }

    /// Make sure `bin_dir` is exported onto PATH.
    ///
    /// Every existing startup file lacking the entry gets one. When some
    /// file already has it, no new file is created; when none of the files
    /// exist, the first one is created. Returns whether any file changed.
    pub fn ensure_path_entry(&self, bin_dir: &Path) -> Result<bool> {
        let mut updated = false;
        let mut already_present = false;

        for profile in self.profiles.iter().filter(|p| p.is_file()) {
            if contains_path_entry(profile, bin_dir)? {
                debug!("{} already exports {}", profile.display(), bin_dir.display());
                already_present = true;
                continue;
            }
            append_path_entry(profile, bin_dir)?;
            info!("Added {} to PATH in {}", bin_dir.display(), profile.display());
            updated = true;
        }

        if !updated
            && !already_present
            && let Some(default) = self.profiles.first()
        {
            append_path_entry(default, bin_dir)?;
            info!("Created {} with PATH entry", default.display());
            updated = true;
        }

        Ok(updated)
    }

    /// Source the preferred startup file in a throwaway `bash` and report
    /// what `php --version` prints there.
    pub async fn verify(&self, bin_dir: &Path) -> Result<String> {
        let profile = self
            .verify_profiles
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                Error::io(
                    "No shell configuration file found",
                    self.profiles.first().cloned().unwrap_or_default(),
                    io::Error::from(io::ErrorKind::NotFound),
                )
            })?;

        debug!("Verifying PATH by sourcing {}", profile.display());
        let script = verification_script(profile, bin_dir);
        let output = CommandRunner::new()
            .run_checked("bash", ["-c", script.as_str()])
            .await?;

        Ok(output.combined())
    }
}

/// The line phpvm appends.
pub fn path_export_line(bin_dir: &Path) -> String {
    format!("export PATH=\"{}:$PATH\"", bin_dir.display())
}

/// Whether `profile` already exports `bin_dir`, double-quoted, single-quoted
/// or unquoted.
///
/// Startup files need not be UTF-8, so lines are compared after lossy
/// decoding. A missing file lacks the entry; any other read failure is an
/// error.
pub fn contains_path_entry(profile: &Path, bin_dir: &Path) -> Result<bool> {
    let bytes = match fs::read(profile) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io("Failed to read shell profile", profile, e)),
    };
    let content = String::from_utf8_lossy(&bytes);
    let bin = bin_dir.display();
    let variants = [
        path_export_line(bin_dir),
        format!("export PATH='{}:$PATH'", bin),
        format!("export PATH={}:$PATH", bin),
    ];
    Ok(content
        .lines()
        .map(str::trim)
        .any(|line| variants.iter().any(|v| v == line)))
}

/// Append the marker and export line, creating `profile` if needed.
pub fn append_path_entry(profile: &Path, bin_dir: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(profile)
        .map_err(|e| Error::io("Failed to open shell profile", profile, e))?;

    let non_empty = file
        .metadata()
        .map(|m| m.len() > 0)
        .map_err(|e| Error::io("Failed to read shell profile", profile, e))?;

    let mut entry = String::new();
    if non_empty {
        entry.push('\n');
    }
    entry.push_str(PATH_MARKER);
    entry.push('\n');
    entry.push_str(&path_export_line(bin_dir));
    entry.push('\n');

    file.write_all(entry.as_bytes())
        .map_err(|e| Error::io("Failed to update shell profile", profile, e))
}

fn verification_script(profile: &Path, bin_dir: &Path) -> String {
    format!(
        "source \"{}\"\n{}\necho \"PHP version after applying changes:\"\nphp --version 2>/dev/null || echo \"PHP not found in PATH\"\n",
        profile.display(),
        path_export_line(bin_dir),
    )
}
