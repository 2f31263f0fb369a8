//! Recursive force delete (`rm -rf` semantics): a missing path is success.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::entry::{try_classify, EntryKind};
use crate::errors::{io_err, Result};

pub fn remove_all_sync(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let Some(entry) = try_classify(path, false)? else {
        return Ok(());
    };

    let outcome = match entry.kind {
        EntryKind::Dir => fs::remove_dir_all(path),
        // Symlinks, devices, sockets and fifos all unlink like files.
        _ => fs::remove_file(path),
    };

    match outcome {
        Ok(()) => {
            debug!(path = %path.display(), kind = %entry.kind, "removed");
            Ok(())
        }
        // Lost a race with another remover; the goal state holds.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err("remove", path)(e)),
    }
}
