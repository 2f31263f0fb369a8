//! Path classification.
//! Stats a path with lstat semantics by default (the final symlink is not
//! followed) or stat semantics when `follow` is set, and folds the result
//! into a closed [`EntryKind`] so every dispatch site matches exhaustively.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::errors::{io_err, FsError, Result};

/// Closed set of filesystem entry kinds the engine dispatches over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    CharDevice,
    BlockDevice,
    Socket,
    Fifo,
}

impl EntryKind {
    fn from_file_type(ft: fs::FileType) -> Self {
        if ft.is_dir() {
            return EntryKind::Dir;
        }
        if ft.is_symlink() {
            return EntryKind::Symlink;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_char_device() {
                return EntryKind::CharDevice;
            }
            if ft.is_block_device() {
                return EntryKind::BlockDevice;
            }
            if ft.is_socket() {
                return EntryKind::Socket;
            }
            if ft.is_fifo() {
                return EntryKind::Fifo;
            }
        }
        EntryKind::File
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "directory",
            EntryKind::Symlink => "symlink",
            EntryKind::CharDevice => "character device",
            EntryKind::BlockDevice => "block device",
            EntryKind::Socket => "socket",
            EntryKind::Fifo => "fifo",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified filesystem entry: a path plus its metadata snapshot at the
/// moment of classification. Snapshots are read fresh at every traversal
/// step and never cached across steps.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub len: u64,
    /// Permission bits on Unix; a synthesized `0o444`/`0o666` elsewhere so
    /// the readonly attribute still round-trips.
    pub mode: u32,
    pub modified: FileTime,
    pub accessed: FileTime,
    pub dev: u64,
    pub ino: u64,
}

impl Entry {
    fn from_metadata(path: &Path, meta: &fs::Metadata) -> Self {
        #[cfg(unix)]
        let (mode, dev, ino) = {
            use std::os::unix::fs::MetadataExt;
            (meta.mode(), meta.dev(), meta.ino())
        };
        #[cfg(not(unix))]
        let (mode, dev, ino) = {
            let mode = if meta.permissions().readonly() { 0o444 } else { 0o666 };
            (mode, 0u64, 0u64)
        };

        Entry {
            path: path.to_path_buf(),
            kind: EntryKind::from_file_type(meta.file_type()),
            len: meta.len(),
            mode,
            modified: FileTime::from_last_modification_time(meta),
            accessed: FileTime::from_last_access_time(meta),
            dev,
            ino,
        }
    }

    /// Two entries are identical iff they name the exact same underlying
    /// filesystem object, not merely equal content.
    pub fn is_same(&self, other: &Entry) -> bool {
        #[cfg(unix)]
        {
            self.dev == other.dev && self.ino == other.ino
        }
        #[cfg(not(unix))]
        {
            match (
                dunce::canonicalize(&self.path),
                dunce::canonicalize(&other.path),
            ) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        }
    }
}

fn read_metadata(path: &Path, follow: bool) -> io::Result<fs::Metadata> {
    if follow {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
}

/// Classify a path that must exist. Absence is fatal (`SourceNotFound`),
/// which is the right behavior for operation sources.
pub fn classify(path: &Path, follow: bool) -> Result<Entry> {
    match read_metadata(path, follow) {
        Ok(meta) => Ok(Entry::from_metadata(path, &meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FsError::SourceNotFound(path.to_path_buf()))
        }
        Err(e) => Err(io_err("stat", path)(e)),
    }
}

/// Classify a path whose absence is an expected branch (destination
/// conflict checks). Missing yields `None` rather than an error.
pub(crate) fn try_classify(path: &Path, follow: bool) -> Result<Option<Entry>> {
    match read_metadata(path, follow) {
        Ok(meta) => Ok(Some(Entry::from_metadata(path, &meta))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err("stat", path)(e)),
    }
}

/// Whether a path currently exists (without following a final symlink, so
/// broken links count as existing).
pub fn path_exists_sync(path: impl AsRef<Path>) -> Result<bool> {
    Ok(try_classify(path.as_ref(), false)?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn classifies_file_and_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"abc").unwrap();

        let fe = classify(&file, false).unwrap();
        assert_eq!(fe.kind, EntryKind::File);
        assert_eq!(fe.len, 3);

        let de = classify(dir.path(), false).unwrap();
        assert_eq!(de.kind, EntryKind::Dir);
    }

    #[test]
    fn missing_source_is_enoent() {
        let dir = tempdir().unwrap();
        let err = classify(&dir.path().join("nope"), false).unwrap_err();
        assert_eq!(err.code(), "ENOENT");
        assert!(try_classify(&dir.path().join("nope"), false)
            .unwrap()
            .is_none());
    }

    #[test]
    fn same_path_is_identical() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a");
        fs::write(&file, b"x").unwrap();
        let a = classify(&file, false).unwrap();
        let b = classify(&file, false).unwrap();
        assert!(a.is_same(&b));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_is_not_followed_by_default() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("target");
        let link = dir.path().join("link");
        fs::write(&file, b"x").unwrap();
        std::os::unix::fs::symlink(&file, &link).unwrap();

        assert_eq!(classify(&link, false).unwrap().kind, EntryKind::Symlink);
        assert_eq!(classify(&link, true).unwrap().kind, EntryKind::File);
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_still_exists() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        assert!(path_exists_sync(&link).unwrap());
        assert_eq!(classify(&link, true).unwrap_err().code(), "ENOENT");
    }
}
