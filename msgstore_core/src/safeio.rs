//! Atomic file writes.
//!
//! Content goes to a temp file in the destination directory, which is
//! synced and then renamed over the destination. Readers see either the old
//! file or the complete new one.

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Prefix for in-flight temp files. Never collides with record file names.
pub(crate) const TEMP_PREFIX: &str = ".tmp.";

/// Atomically write `data` to `path` with permission bits `mode`.
///
/// The mode is applied to the file directly, so it is not masked by the
/// umask. On failure the previous content of `path`, if any, is untouched
/// and the temp file is removed.
pub fn write_file(path: &Path, data: &[u8], mode: u32) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)?;

    set_mode(temp_file.as_file(), mode)?;

    temp_file.write_all(data)?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(path)?;

    sync_dir(dir);

    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &fs::File, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_file: &fs::File, _mode: u32) -> Result<()> {
    // Windows doesn't support POSIX permissions
    Ok(())
}

/// Flush the rename to disk. Best effort: some filesystems refuse to fsync
/// a directory.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!(dir = %dir.display(), error = %e, "directory sync failed");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
