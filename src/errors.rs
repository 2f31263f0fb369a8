//! Typed error definitions for fsplus.
//! Every failure carries a stable POSIX-style `code()` so callers can branch
//! on the failure kind programmatically instead of parsing messages.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entry::EntryKind;

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Source path not found: {0}")]
    SourceNotFound(PathBuf),

    /// The source existed when classified but was gone by the time the leaf
    /// operation opened it.
    #[error("Source vanished during operation: {0}")]
    SourceVanished(PathBuf),

    #[error("Destination already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Cannot copy {kind} entry: {path}")]
    UnsupportedEntryKind { kind: EntryKind, path: PathBuf },

    #[error("Source and destination must not be the same.")]
    SameFile,

    #[error("Cannot {op} '{src}' into a path that overlaps it: '{dest}'")]
    SelfConflict {
        op: &'static str,
        src: PathBuf,
        dest: PathBuf,
    },

    #[error("Destination still busy after {attempts} attempts: {path}")]
    Busy {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("{op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The blocking-pool task backing an async call was dropped before
    /// completion (runtime shutdown).
    #[error("background task failed")]
    BackgroundTask,
}

impl FsError {
    /// Stable POSIX-style error code, e.g. `"ENOENT"` or `"EEXIST"`.
    pub fn code(&self) -> &'static str {
        match self {
            FsError::SourceNotFound(_) | FsError::SourceVanished(_) => "ENOENT",
            FsError::AlreadyExists(_) => "EEXIST",
            FsError::NotADirectory(_) => "ENOTDIR",
            FsError::UnsupportedEntryKind { .. }
            | FsError::SameFile
            | FsError::SelfConflict { .. } => "EINVAL",
            FsError::Busy { .. } => "EBUSY",
            FsError::Io { source, .. } => code_for_io(source),
            FsError::BackgroundTask => "EIO",
        }
    }
}

fn code_for_io(e: &io::Error) -> &'static str {
    #[cfg(unix)]
    if let Some(raw) = e.raw_os_error() {
        return match raw {
            libc::ENOENT => "ENOENT",
            libc::EEXIST => "EEXIST",
            libc::EACCES => "EACCES",
            libc::EPERM => "EPERM",
            libc::EXDEV => "EXDEV",
            libc::ENOTDIR => "ENOTDIR",
            libc::EISDIR => "EISDIR",
            libc::EBUSY | libc::ETXTBSY => "EBUSY",
            libc::ENOSPC => "ENOSPC",
            libc::ELOOP => "ELOOP",
            libc::EROFS => "EROFS",
            libc::ENAMETOOLONG => "ENAMETOOLONG",
            _ => "EIO",
        };
    }
    match e.kind() {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::AlreadyExists => "EEXIST",
        io::ErrorKind::PermissionDenied => "EACCES",
        _ => "EIO",
    }
}

/// Adapter for `.map_err(...)`: wraps an `io::Error` with the failing
/// operation and path so the caller sees both in the message and can still
/// reach the raw OS error through `source()`.
pub(crate) fn io_err<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> FsError + 'a {
    move |source| FsError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}
