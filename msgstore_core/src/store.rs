//! Store management and record I/O.

use crate::codec::Message;
use crate::error::{Error, Result};
use crate::escape::{query_escape, query_unescape};
use crate::message::{read_text_message, write_text_message};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// File name prefix marking a record file.
pub const STORE_ID_PREFIX: &str = "s:";

/// Permission bits for a newly created store directory (subject to umask).
pub const DIR_MODE: u32 = 0o770;

/// Permission bits for record files.
pub const FILE_MODE: u32 = 0o660;

/// A directory of records, one file per identifier.
///
/// The store keeps no state besides its directory: every operation goes to
/// the filesystem, so independent handles over the same directory see each
/// other's writes.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

/// Result of a directory scan, with the number of entries that carried the
/// record prefix but could not be decoded into an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListReport {
    /// Decoded identifiers, in directory order.
    pub ids: Vec<String>,
    /// Prefixed entries that were skipped.
    pub skipped: usize,
}

impl Store {
    /// Open the store at `dir`, creating the directory and any missing
    /// parents if needed.
    ///
    /// Opening an existing directory leaves its contents alone.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_dir(&dir)?;
        debug!(dir = %dir.display(), "opened store");
        Ok(Self { dir })
    }

    /// Get the directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the path of the file backing `id` (which may or may not exist).
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}{}", STORE_ID_PREFIX, query_escape(id)))
    }

    /// Store `msg` under `id`, replacing any previous record.
    ///
    /// The record is written in text form, atomically: on failure the
    /// previous record stays intact.
    pub fn put<T: Message>(&self, id: &str, msg: &T) -> Result<()> {
        let path = self.path_for(id);
        write_text_message(&path, msg, FILE_MODE)?;
        debug!(id, path = %path.display(), "stored record");
        Ok(())
    }

    /// Load the record stored under `id`.
    ///
    /// Returns `Ok(None)` if no record was ever written for `id`. Any other
    /// failure, including undecodable content, is an error.
    pub fn get<T: Message>(&self, id: &str) -> Result<Option<T>> {
        let path = self.path_for(id);
        trace!(id, path = %path.display(), "loading record");

        match read_text_message(&path) {
            Ok(msg) => Ok(Some(msg)),
            Err(e) if e.is_not_found() => self.absent(e).map(|()| None),
            Err(e) => Err(e),
        }
    }

    /// Check whether a record exists for `id`.
    pub fn contains(&self, id: &str) -> Result<bool> {
        match fs::symlink_metadata(self.path_for(id)) {
            Ok(_) => Ok(true),
            Err(e) => {
                let e = Error::from(e);
                if e.is_not_found() {
                    self.absent(e).map(|()| false)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Remove the record stored under `id`.
    ///
    /// Returns `Ok(false)` if there was nothing to remove.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(id, path = %path.display(), "removed record");
                Ok(true)
            }
            Err(e) => {
                let e = Error::from(e);
                if e.is_not_found() {
                    self.absent(e).map(|()| false)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// List the identifiers in the store.
    ///
    /// Order follows the directory listing and is unspecified. Entries
    /// without the record prefix are ignored; prefixed entries that do not
    /// decode are skipped.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.list_ids_report()?.ids)
    }

    /// Like [`Store::list_ids`], also counting skipped entries.
    pub fn list_ids_report(&self) -> Result<ListReport> {
        let mut report = ListReport::default();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();

            match id_from_file_name(&name) {
                FileName::Record(id) => report.ids.push(id),
                FileName::Foreign => continue,
                FileName::Malformed(reason) => {
                    debug!(
                        dir = %self.dir.display(),
                        entry = %name.to_string_lossy(),
                        reason = %reason,
                        "skipping malformed record file name"
                    );
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }

    /// Map a "not found" from a record path to an absent record, unless the
    /// store directory itself is gone.
    fn absent(&self, err: Error) -> Result<()> {
        if self.dir.is_dir() { Ok(()) } else { Err(err) }
    }
}

/// Classification of a directory entry name.
#[derive(Debug, PartialEq, Eq)]
enum FileName {
    /// A record file, with its decoded identifier.
    Record(String),
    /// Not a record file.
    Foreign,
    /// Looks like a record file but the identifier does not decode, or is
    /// not in the form [`Store::path_for`] would produce.
    Malformed(String),
}

fn id_from_file_name(name: &OsStr) -> FileName {
    let Some(name) = name.to_str() else {
        // An escaped identifier is always ASCII
        return if name.as_encoded_bytes().starts_with(STORE_ID_PREFIX.as_bytes()) {
            FileName::Malformed("file name is not UTF-8".to_string())
        } else {
            FileName::Foreign
        };
    };

    let Some(escaped) = name.strip_prefix(STORE_ID_PREFIX) else {
        return FileName::Foreign;
    };

    match query_unescape(escaped) {
        // A non-canonical name would list an id that get() cannot find
        Ok(id) if query_escape(&id) != escaped => {
            FileName::Malformed(format!("non-canonical escape for {:?}", id))
        }
        Ok(id) => FileName::Record(id),
        Err(e) => FileName::Malformed(e.to_string()),
    }
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}
