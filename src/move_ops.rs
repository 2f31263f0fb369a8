//! Move: atomic rename first, cross-device fallback to copy + delete.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;

use tracing::{debug, warn};

use crate::atomic;
use crate::conflict::{self, Resolution};
use crate::copy;
use crate::entry::{classify, try_classify, EntryKind};
use crate::errors::{io_err, FsError, Result};
use crate::mkdirs::ensure_dir_sync;
use crate::options::MoveOptions;
use crate::remove::remove_all_sync;

/// Move `src` to `dest`.
///
/// Attempts a rename; on a cross-device failure, recovers internally by
/// copying (timestamps preserved) and deleting the source. A transiently
/// busy destination is retried a bounded number of times.
pub fn move_path_sync(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &MoveOptions,
) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let src_entry = classify(src, false)?;
    if src == dest {
        return Err(FsError::SameFile);
    }
    let dest_entry = try_classify(dest, false)?;

    // A pure case change of the same entry on a case-insensitive filesystem
    // must go straight to rename; the delete-then-recreate path below would
    // destroy the entry.
    let case_only = dest_entry
        .as_ref()
        .is_some_and(|d| src_entry.is_same(d))
        && is_case_only_rename(src, dest);

    if !case_only {
        if src_entry.kind == EntryKind::Dir {
            conflict::guard_containment("move", src, dest)?;
        }

        match conflict::resolve(&src_entry, dest_entry.as_ref(), options.overwrite, false, false)? {
            // Hardlinked twin of the source under another name: rename(2)
            // of the same entry is a no-op, and so are we.
            Resolution::Skip => return Ok(()),
            Resolution::Overwrite => remove_all_sync(dest)?,
            Resolution::Proceed => {}
        }

        // The filesystem root has no parent and always exists.
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_sync(parent)?;
        }
    }

    match rename_with_retry(src, dest, options) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "renamed");
            Ok(())
        }
        Err(e) if atomic::is_cross_device(&e) => {
            debug!(src = %src.display(), dest = %dest.display(), error = %e,
                "cross-device rename; falling back to copy + delete");
            copy::copy_then_remove_source(src, dest, options.overwrite)
        }
        Err(e) if atomic::is_transient_busy(&e) => Err(FsError::Busy {
            path: dest.to_path_buf(),
            attempts: options.max_retries + 1,
            source: e,
        }),
        Err(e) => Err(io_err("rename", src)(e)),
    }
}

fn rename_with_retry(src: &Path, dest: &Path, options: &MoveOptions) -> io::Result<()> {
    let mut attempt = 0u32;
    loop {
        match fs::rename(src, dest) {
            Ok(()) => {
                #[cfg(unix)]
                if let Some(parent) = dest.parent() {
                    let _ = atomic::fsync_dir(parent);
                }
                return Ok(());
            }
            Err(e) if atomic::is_transient_busy(&e) && attempt < options.max_retries => {
                attempt += 1;
                warn!(dest = %dest.display(), error = %e, attempt, "destination busy; retrying rename");
                thread::sleep(options.retry_delay);
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_case_only_rename(src: &Path, dest: &Path) -> bool {
    if src.parent() != dest.parent() {
        return false;
    }
    match (
        src.file_name().and_then(|n| n.to_str()),
        dest.file_name().and_then(|n| n.to_str()),
    ) {
        (Some(a), Some(b)) => a != b && a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn case_only_rename_detection() {
        assert!(is_case_only_rename(
            Path::new("/tmp/readme.md"),
            Path::new("/tmp/README.md")
        ));
        assert!(!is_case_only_rename(
            Path::new("/tmp/a.txt"),
            Path::new("/tmp/a.txt")
        ));
        assert!(!is_case_only_rename(
            Path::new("/tmp/a.txt"),
            Path::new("/opt/A.txt")
        ));
        assert!(!is_case_only_rename(
            Path::new("/tmp/a.txt"),
            Path::new("/tmp/b.txt")
        ));
    }

    #[test]
    fn retry_surfaces_non_busy_errors_immediately() {
        let dir = tempdir().unwrap();
        let opts = MoveOptions::default();
        let err = rename_with_retry(
            &dir.path().join("ghost"),
            &dir.path().join("dest"),
            &opts,
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
