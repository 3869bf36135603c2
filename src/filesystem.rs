// Filesystem access for install reconciliation

use std::fs;
use std::io;
use std::path::Path;

/// The operations the checker needs from the host's filesystem layer.
///
/// Implementations must treat a move onto the same path and a delete of a
/// missing directory as no-ops so a retried install is harmless.
pub trait PluginFilesystem: Send + Sync {
    /// Names of the entries directly under `dir`, sorted
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Move a directory (or file) to `to`
    fn move_dir(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a directory and everything under it
    fn delete_dir(&self, path: &Path) -> io::Result<()>;
}

/// Direct access to the local disk
pub struct LocalFilesystem;

impl PluginFilesystem for LocalFilesystem {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn move_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from == to {
            return Ok(());
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            // Cross-device moves cannot be renamed; fall back to copy + delete
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                copy_recursive(from, to)?;
                fs::remove_dir_all(from)
            }
            Err(e) => Err(e),
        }
    }

    fn delete_dir(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_file() {
        fs::copy(from, to)?;
        return Ok(());
    }
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
