//! Composer wrapper scripts and atomic file replacement.

use phpvm_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shell script that runs `artifact` with `runtime`, forwarding all arguments.
pub fn render_wrapper(runtime: &Path, artifact: &Path) -> String {
    format!(
        "#!/bin/bash\n{} {} \"$@\"\n",
        runtime.display(),
        artifact.display()
    )
}

/// Set mode 0755 on `path`.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::io("Failed to set executable permissions", path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Write an executable wrapper at `dest`, replacing any existing file by rename.
pub fn write_wrapper(dest: &Path, runtime: &Path, artifact: &Path) -> Result<()> {
    let temp = temp_sibling(dest);
    let content = render_wrapper(runtime, artifact);

    let written = fs::write(&temp, content)
        .map_err(|e| Error::io("Failed to write wrapper script", &temp, e))
        .and_then(|()| make_executable(&temp))
        .and_then(|()| {
            fs::rename(&temp, dest).map_err(|e| Error::io("Failed to install wrapper", dest, e))
        });
    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written?;

    debug!(
        "Wrote wrapper {} -> {} {}",
        dest.display(),
        runtime.display(),
        artifact.display()
    );
    Ok(())
}

/// Point `link` at `target`, replacing any existing entry by rename.
///
/// The new symlink is created under a temporary name in the same directory
/// and renamed over `link`, so readers always see either the old or the new
/// target.
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    let temp = temp_sibling(link);
    // Leftover from an interrupted run.
    let _ = fs::remove_file(&temp);

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, &temp)
        .map_err(|e| Error::io("Failed to create symlink", &temp, e))?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, &temp)
        .map_err(|e| Error::io("Failed to create symlink", &temp, e))?;

    if let Err(e) = fs::rename(&temp, link) {
        let _ = fs::remove_file(&temp);
        return Err(Error::io("Failed to replace symlink", link, e));
    }

    debug!("Linked {} -> {}", link.display(), target.display());
    Ok(())
}

/// `.<name>.tmp-<pid>` next to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wrapper() {
        let script = render_wrapper(
            Path::new("/root/.phpvm/versions/8.4.1/php"),
            Path::new("/root/.phpvm/tools/2.8.11/composer.phar"),
        );
        assert_eq!(
            script,
            "#!/bin/bash\n/root/.phpvm/versions/8.4.1/php /root/.phpvm/tools/2.8.11/composer.phar \"$@\"\n"
        );
    }

    #[test]
    fn test_write_wrapper_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("composer");
        fs::write(&dest, "old").unwrap();

        write_wrapper(&dest, Path::new("/a/php"), Path::new("/b/composer.phar")).unwrap();

        let content = fs::read_to_string(&dest).unwrap();
        assert!(content.contains("/a/php /b/composer.phar \"$@\""));
        assert!(!temp_sibling(&dest).exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::write(&first, "1").unwrap();
        fs::write(&second, "2").unwrap();
        let link = dir.path().join("php");

        replace_symlink(&first, &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), first);

        replace_symlink(&second, &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), second);
        assert_eq!(fs::read_to_string(&link).unwrap(), "2");
        assert!(!temp_sibling(&link).exists());
    }

    #[test]
    fn test_temp_sibling_stays_in_directory() {
        let temp = temp_sibling(Path::new("/x/bin/php"));
        assert_eq!(temp.parent(), Some(Path::new("/x/bin")));
        assert!(
            temp.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(".php.tmp-")
        );
    }
}
