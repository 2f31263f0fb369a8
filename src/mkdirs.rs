//! Idempotent recursive directory creation (`mkdir -p` semantics).

use std::fs;
use std::path::Path;

use tracing::trace;

use crate::errors::{io_err, FsError, Result};

/// Create `path` and any missing ancestors. Already-existing directories
/// are success, including ones created concurrently by another operation
/// between our check and the create call. An existing non-directory
/// anywhere on the path fails with `ENOTDIR`.
pub fn ensure_dir_sync(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match fs::create_dir_all(path) {
        Ok(()) => {
            trace!(path = %path.display(), "ensured directory");
            Ok(())
        }
        Err(e) => {
            // The classic mkdir -p race: someone else created it first.
            match fs::symlink_metadata(path) {
                Ok(meta) if meta.is_dir() => Ok(()),
                Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
                Err(_) => {
                    #[cfg(unix)]
                    if e.raw_os_error() == Some(libc::ENOTDIR) {
                        return Err(FsError::NotADirectory(path.to_path_buf()));
                    }
                    Err(io_err("create directory", path)(e))
                }
            }
        }
    }
}
