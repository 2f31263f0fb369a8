//! Recursive tree copy.
//!
//! Depth-first, pre-order. A directory entry is finalized (its permission
//! bits applied) only after all of its children complete, because creating
//! children mutates the directory. Sibling entries are fanned out on the
//! rayon pool and fail fast: the first error aborts not-yet-started
//! siblings while in-flight leaf operations run to completion.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::atomic;
use crate::conflict::{self, Resolution};
use crate::entry::{classify, try_classify, Entry, EntryKind};
use crate::errors::{io_err, FsError, Result};
use crate::metadata;
use crate::mkdirs::ensure_dir_sync;
use crate::options::CopyOptions;
use crate::remove::remove_all_sync;

/// Copy a file, directory tree, or symlink from `src` to `dest`.
///
/// Missing destination parents are created. Existing destination
/// directories are merged child-by-child; unrelated pre-existing children
/// survive. There is no tree-level atomicity: a failure partway leaves the
/// already-copied part in place.
pub fn copy_sync(src: impl AsRef<Path>, dest: impl AsRef<Path>, options: &CopyOptions) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let src_entry = classify(src, options.dereference)?;
    if src_entry.kind == EntryKind::Dir {
        conflict::guard_containment("copy", src, dest)?;
    }
    copy_entry(src, dest, src_entry, options)
}

fn copy_entry(src: &Path, dest: &Path, src_entry: Entry, opts: &CopyOptions) -> Result<()> {
    if let Some(filter) = &opts.filter {
        if !filter(src, dest) {
            trace!(src = %src.display(), "skipped by filter");
            return Ok(());
        }
    }

    // Never dereference the destination when merely checking for conflicts.
    let dest_entry = try_classify(dest, false)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_sync(parent)?;
    }

    match src_entry.kind {
        EntryKind::Dir => copy_dir(src, dest, &src_entry, dest_entry, opts),
        EntryKind::File | EntryKind::CharDevice | EntryKind::BlockDevice => {
            copy_file(src, dest, &src_entry, dest_entry, opts)
        }
        EntryKind::Symlink => copy_link(src, dest, &src_entry, dest_entry, opts),
        EntryKind::Socket | EntryKind::Fifo => Err(FsError::UnsupportedEntryKind {
            kind: src_entry.kind,
            path: src.to_path_buf(),
        }),
    }
}

fn copy_dir(
    src: &Path,
    dest: &Path,
    src_entry: &Entry,
    dest_entry: Option<Entry>,
    opts: &CopyOptions,
) -> Result<()> {
    let freshly_created = match conflict::resolve(
        src_entry,
        dest_entry.as_ref(),
        opts.overwrite,
        opts.error_on_exist,
        true,
    )? {
        Resolution::Skip => return Ok(()),
        Resolution::Overwrite => {
            // Destination exists as a non-directory; clear it out.
            remove_all_sync(dest)?;
            create_dir(dest)?;
            true
        }
        Resolution::Proceed => {
            if dest_entry.is_none() {
                create_dir(dest)?;
                true
            } else {
                false
            }
        }
    };

    let children = read_child_names(src)?;
    children.par_iter().try_for_each(|name| {
        let child_src = src.join(name);
        let child_dest = dest.join(name);
        // Fresh stat per traversal step; never reuse parent-level state.
        let child_entry = classify(&child_src, opts.dereference)?;
        copy_entry(&child_src, &child_dest, child_entry, opts)
    })?;

    // Mode bits go on last: populating the directory already mutated it.
    if freshly_created {
        metadata::copy_permissions(src_entry.mode, dest)?;
    }
    debug!(src = %src.display(), dest = %dest.display(), "copied directory");
    Ok(())
}

fn create_dir(dest: &Path) -> Result<()> {
    match fs::create_dir(dest) {
        Ok(()) => Ok(()),
        // Sibling operations may race on a shared merge destination.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dest.is_dir() => Ok(()),
        Err(e) => Err(io_err("create directory", dest)(e)),
    }
}

fn read_child_names(src: &Path) -> Result<Vec<OsString>> {
    let reader = match fs::read_dir(src) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FsError::SourceVanished(src.to_path_buf()));
        }
        Err(e) => return Err(io_err("read directory", src)(e)),
    };
    reader
        .map(|res| res.map(|d| d.file_name()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(io_err("read directory", src))
}

fn copy_file(
    src: &Path,
    dest: &Path,
    src_entry: &Entry,
    dest_entry: Option<Entry>,
    opts: &CopyOptions,
) -> Result<()> {
    match conflict::resolve(
        src_entry,
        dest_entry.as_ref(),
        opts.overwrite,
        opts.error_on_exist,
        true,
    )? {
        Resolution::Skip => return Ok(()),
        Resolution::Overwrite => {
            // rename_over replaces files and symlinks in one step; only a
            // directory destination needs clearing first.
            if dest_entry.as_ref().is_some_and(|d| d.kind == EntryKind::Dir) {
                remove_all_sync(dest)?;
            }
        }
        Resolution::Proceed => {}
    }

    atomic::place_file(src, dest)?;

    if opts.preserve_timestamps {
        metadata::preserve_timestamps(src, dest, opts.dereference)?;
    }
    metadata::copy_permissions(src_entry.mode, dest)?;
    debug!(src = %src.display(), dest = %dest.display(), "copied file");
    Ok(())
}

fn copy_link(
    src: &Path,
    dest: &Path,
    src_entry: &Entry,
    dest_entry: Option<Entry>,
    opts: &CopyOptions,
) -> Result<()> {
    if dest_entry.as_ref().is_some_and(|d| d.kind == EntryKind::Symlink) {
        conflict::check_symlink_pair(src, dest, opts.dereference)?;
    }

    match conflict::resolve(
        src_entry,
        dest_entry.as_ref(),
        opts.overwrite,
        opts.error_on_exist,
        true,
    )? {
        Resolution::Skip => return Ok(()),
        Resolution::Overwrite => remove_all_sync(dest)?,
        Resolution::Proceed => {}
    }

    let mut target = fs::read_link(src).map_err(io_err("read link", src))?;
    if opts.dereference {
        if target.is_relative() {
            target = src.parent().unwrap_or(Path::new("")).join(target);
        }
        target = dunce::canonicalize(&target).map_err(io_err("resolve link target", src))?;
    }

    make_symlink(&target, dest).map_err(io_err("create symlink", dest))?;
    debug!(src = %src.display(), dest = %dest.display(), target = %target.display(), "copied symlink");
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(windows)]
fn make_symlink(target: &Path, dest: &Path) -> io::Result<()> {
    // Windows distinguishes file from directory links; a dangling target
    // defaults to a file link.
    let target_is_dir = fs::metadata(target).map(|m| m.is_dir()).unwrap_or(false);
    if target_is_dir {
        std::os::windows::fs::symlink_dir(target, dest)
    } else {
        std::os::windows::fs::symlink_file(target, dest)
    }
}

/// Reuse of the tree copy by the move engine's cross-device fallback:
/// copy with timestamps preserved, then delete the source.
pub(crate) fn copy_then_remove_source(
    src: &Path,
    dest: &Path,
    overwrite: bool,
) -> Result<()> {
    let opts = CopyOptions {
        overwrite,
        // Guards the window between the caller's conflict check and here.
        error_on_exist: true,
        preserve_timestamps: true,
        ..CopyOptions::default()
    };
    copy_sync(src, dest, &opts)?;
    remove_all_sync(src)
}
