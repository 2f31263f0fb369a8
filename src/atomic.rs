//! Atomic-ish file placement and rename error classification.
//!
//! A leaf file copy streams into a unique temp file in the destination
//! directory and then renames it over the final path, so readers never see
//! a half-written destination and overwrite happens in one step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;

use crate::errors::{io_err, FsError, Result};
use crate::stream;

/// Copy `src`'s bytes to `dest` via temp-file-then-rename. The destination
/// parent must already exist. An existing plain-file/symlink destination is
/// replaced by the rename.
pub(crate) fn place_file(src: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let tmp = unique_temp_path(dest_dir);

    match stream::copy_contents(src, &tmp) {
        Ok(bytes) => {
            trace!(src = %src.display(), bytes, "streamed to temp file");
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            // The parent was ensured before dispatch, so a missing path
            // here means the source disappeared after classification.
            if e.kind() == io::ErrorKind::NotFound {
                return Err(FsError::SourceVanished(src.to_path_buf()));
            }
            return Err(io_err("copy to temporary file", src)(e));
        }
    }

    if let Err(e) = rename_over(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err("rename temporary file into place", dest)(e));
    }
    Ok(())
}

/// Rename that replaces an existing destination file. Windows rename does
/// not overwrite, so the destination is unlinked first there. On Unix the
/// destination directory is fsynced best-effort to persist the rename.
pub(crate) fn rename_over(src: &Path, dest: &Path) -> io::Result<()> {
    #[cfg(windows)]
    if let Err(e) = fs::remove_file(dest) {
        if e.kind() != io::ErrorKind::NotFound {
            return Err(e);
        }
    }

    fs::rename(src, dest)?;

    #[cfg(unix)]
    if let Some(parent) = dest.parent() {
        let _ = fsync_dir(parent);
    }
    Ok(())
}

pub(crate) fn unique_temp_path(dir: &Path) -> PathBuf {
    // pid + nanos + process-wide counter: parallel siblings landing in the
    // same directory in the same instant must not collide.
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(".fsplus.{pid}.{nanos}.{seq}.tmp"))
}

/// EXDEV / ERROR_NOT_SAME_DEVICE: rename across filesystems is impossible
/// and the caller must fall back to copy + delete.
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17,
        _ => false,
    }
}

/// Transiently-busy destination: worth a bounded retry.
pub(crate) fn is_transient_busy(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EBUSY || code == libc::ETXTBSY,
        #[cfg(windows)]
        // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
        Some(code) => code == 32 || code == 33,
        _ => false,
    }
}

#[cfg(unix)]
pub(crate) fn fsync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn places_file_and_replaces_existing() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        place_file(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");

        // No temp litter left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".fsplus."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn vanished_source_is_reported() {
        let dir = tempdir().unwrap();
        let err = place_file(&dir.path().join("ghost"), &dir.path().join("dest")).unwrap_err();
        assert!(matches!(err, FsError::SourceVanished(_)));
        assert_eq!(err.code(), "ENOENT");
    }

    #[test]
    fn temp_paths_are_distinct() {
        let dir = tempdir().unwrap();
        let a = unique_temp_path(dir.path());
        let b = unique_temp_path(dir.path());
        assert_ne!(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn exdev_is_cross_device() {
        let e = io::Error::from_raw_os_error(libc::EXDEV);
        assert!(is_cross_device(&e));
        assert!(!is_transient_busy(&e));
        let busy = io::Error::from_raw_os_error(libc::EBUSY);
        assert!(is_transient_busy(&busy));
    }
}
