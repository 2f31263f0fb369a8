//! Conflict resolution between a classified source and destination, plus
//! the self-containment checks that must reject an operation before any
//! mutation happens.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::entry::{Entry, EntryKind};
use crate::errors::{io_err, FsError, Result};

/// What the engine may do about an existing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Nothing in the way, or the destination may be merged into.
    Proceed,
    /// Source and destination are the same object; doing nothing is the
    /// only safe outcome.
    Skip,
    /// Caller must delete/replace the destination before proceeding.
    Overwrite,
}

/// Decide whether an operation on `src` may touch `dest`.
///
/// `merge_directories` selects copy semantics (an existing destination
/// directory is merged child-by-child) over move semantics (any existing
/// destination is a conflict).
pub(crate) fn resolve(
    src: &Entry,
    dest: Option<&Entry>,
    overwrite: bool,
    error_on_exist: bool,
    merge_directories: bool,
) -> Result<Resolution> {
    let Some(dest) = dest else {
        return Ok(Resolution::Proceed);
    };

    if src.is_same(dest) {
        trace!(src = %src.path.display(), dest = %dest.path.display(), "identical entries; skipping");
        return Ok(Resolution::Skip);
    }

    // error_on_exist wins over overwrite: it must fail before any mutation.
    if error_on_exist {
        return Err(FsError::AlreadyExists(dest.path.clone()));
    }

    if merge_directories && src.kind == EntryKind::Dir && dest.kind == EntryKind::Dir {
        return Ok(Resolution::Proceed);
    }

    if overwrite {
        return Ok(Resolution::Overwrite);
    }

    Err(FsError::AlreadyExists(dest.path.clone()))
}

/// Symlink-onto-symlink rule: resolve both link targets and reject when
/// either resolved path is ancestor-or-same of the other. Removing and
/// re-creating the destination link in that situation would either create
/// a self-referential link or destroy the source.
pub(crate) fn check_symlink_pair(
    src_link: &Path,
    dest_link: &Path,
    dereference: bool,
) -> Result<()> {
    let src_target = resolve_link_target(src_link, dereference)?;
    let dest_target = resolve_link_target(dest_link, dereference)?;

    if src_target.starts_with(&dest_target) || dest_target.starts_with(&src_target) {
        return Err(FsError::SelfConflict {
            op: "copy",
            src: src_link.to_path_buf(),
            dest: dest_link.to_path_buf(),
        });
    }
    Ok(())
}

fn resolve_link_target(link: &Path, dereference: bool) -> Result<PathBuf> {
    let target = fs::read_link(link).map_err(io_err("read link", link))?;
    let absolute = if target.is_absolute() {
        target
    } else {
        link.parent().unwrap_or(Path::new("")).join(target)
    };
    if dereference {
        // A dangling target keeps its lexical form.
        Ok(dunce::canonicalize(&absolute).unwrap_or(absolute))
    } else {
        Ok(absolute)
    }
}

/// Reject operations whose destination lies inside the source subtree.
/// Checked before any mutation; both paths are left untouched on failure.
pub(crate) fn guard_containment(op: &'static str, src: &Path, dest: &Path) -> Result<()> {
    let src_resolved = resolve_lexical(src);
    let dest_resolved = resolve_lexical(dest);
    if dest_resolved != src_resolved && dest_resolved.starts_with(&src_resolved) {
        return Err(FsError::SelfConflict {
            op,
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path`, then re-append the
/// missing tail. The destination of a copy usually does not exist yet, so a
/// plain canonicalize is not enough for containment checks.
pub(crate) fn resolve_lexical(path: &Path) -> PathBuf {
    if let Ok(resolved) = dunce::canonicalize(path) {
        return resolved;
    }

    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    let mut prefix = path.to_path_buf();
    loop {
        match prefix.file_name() {
            Some(name) => tail.push(name.to_owned()),
            None => break,
        }
        if !prefix.pop() {
            break;
        }
        if let Ok(base) = dunce::canonicalize(&prefix) {
            let mut out = base;
            for name in tail.iter().rev() {
                out.push(name);
            }
            return out;
        }
    }
    path.to_path_buf()
}
