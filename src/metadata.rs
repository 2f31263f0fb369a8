//! Metadata preservation: timestamps and permission bits.
//! Failures here are real errors, not best-effort: the caller asked for
//! preservation explicitly.

use std::fs;
use std::path::Path;

use filetime::{set_file_times, FileTime};
use tracing::trace;

use crate::errors::{io_err, Result};

/// Copy atime/mtime from `src` onto `dest` with millisecond-or-better
/// fidelity. The source is re-statted here, after the data copy, because
/// the copy itself can bump the source atime on some platforms; the
/// post-copy read is the authoritative one.
pub(crate) fn preserve_timestamps(src: &Path, dest: &Path, follow: bool) -> Result<()> {
    let meta = if follow {
        fs::metadata(src)
    } else {
        fs::symlink_metadata(src)
    }
    .map_err(io_err("stat", src))?;

    let (accessed, modified) = file_times(&meta);

    // Setting times requires owner-write on some platforms. The caller's
    // mode-copy step afterwards restores the source bits.
    grant_owner_write_if_needed(dest)?;

    set_file_times(dest, accessed, modified).map_err(io_err("set file times", dest))?;
    trace!(dest = %dest.display(), "preserved timestamps");
    Ok(())
}

fn file_times(meta: &fs::Metadata) -> (FileTime, FileTime) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        (
            FileTime::from_unix_time(meta.atime(), meta.atime_nsec() as u32),
            FileTime::from_unix_time(meta.mtime(), meta.mtime_nsec() as u32),
        )
    }
    #[cfg(not(unix))]
    {
        (
            FileTime::from_last_access_time(meta),
            FileTime::from_last_modification_time(meta),
        )
    }
}

#[cfg(unix)]
fn grant_owner_write_if_needed(dest: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let meta = fs::metadata(dest).map_err(io_err("stat", dest))?;
    let mode = meta.permissions().mode();
    if mode & 0o200 == 0 {
        fs::set_permissions(dest, fs::Permissions::from_mode(mode | 0o200))
            .map_err(io_err("make destination writable", dest))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn grant_owner_write_if_needed(dest: &Path) -> Result<()> {
    let meta = fs::metadata(dest).map_err(io_err("stat", dest))?;
    let mut perms = meta.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(dest, perms).map_err(io_err("make destination writable", dest))?;
    }
    Ok(())
}

/// Apply the source's permission bits to `dest`. On non-Unix platforms this
/// degrades to mirroring the readonly attribute, which is what the
/// synthesized mode from [`Entry`](crate::Entry) encodes.
pub(crate) fn copy_permissions(src_mode: u32, dest: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(src_mode & 0o7777);
        fs::set_permissions(dest, perms).map_err(io_err("set permissions", dest))?;
    }
    #[cfg(not(unix))]
    {
        let meta = fs::metadata(dest).map_err(io_err("stat", dest))?;
        let mut perms = meta.permissions();
        perms.set_readonly(src_mode & 0o200 == 0);
        fs::set_permissions(dest, perms).map_err(io_err("set permissions", dest))?;
    }
    trace!(dest = %dest.display(), mode = format!("{src_mode:o}"), "copied permissions");
    Ok(())
}
