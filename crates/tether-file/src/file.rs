//! Locked, atomic file replacement shared by the stores.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// An exclusive writer lock on a sibling `.lock` file, released on drop.
pub(crate) struct WriteLock(File);

impl WriteLock {
    pub(crate) fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(sibling(path, "lock"))?;
        file.lock_exclusive()?;

        Ok(Self(file))
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

/// Replace `path` with `content`.
///
/// The content is written and synced to a temp file first and renamed into
/// place, so readers see either the old file or the new one.
pub(crate) fn replace(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = sibling(path, "tmp");

    let mut file = create_private(&temp_path)?;
    file.write_all(content)?;
    file.sync_data()?;
    drop(file);

    fs::rename(&temp_path, path)
}

/// Remove `path`; a missing file is not an error.
pub(crate) fn remove(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(unix)]
fn create_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // A leftover temp file keeps its old mode unless reset.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replace_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");

        replace(&path, b"first").unwrap();
        replace(&path, b"2nd").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"2nd");
        assert!(!dir.path().join("token.json.tmp").exists());
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        remove(&dir.path().join("absent.json")).unwrap();
    }
}
