//! Recursive copy/move engine for local filesystems.
//!
//! One algorithm, two surfaces: every operation exists as an async fn
//! (`copy`, `move_path`, `remove_all`, `ensure_dir`, `path_exists`) and a
//! blocking twin (`*_sync`). The core is a depth-first tree copy with
//! per-entry conflict resolution, self-containment checks, timestamp and
//! permission preservation, and a move built on atomic rename with a
//! cross-device copy+delete fallback.
//!
//! All failures carry a stable POSIX-style code ([`FsError::code`]) so
//! callers branch on the failure kind instead of parsing messages. No
//! operation provides tree-level atomicity: a copy or move that fails
//! partway leaves the completed part of the destination in place.
//!
//! ```no_run
//! use fsplus::{copy_sync, CopyOptions};
//!
//! let opts = CopyOptions { preserve_timestamps: true, ..CopyOptions::default() };
//! copy_sync("assets", "build/assets", &opts)?;
//! # Ok::<(), fsplus::FsError>(())
//! ```

mod asynch;
mod atomic;
mod conflict;
mod copy;
mod entry;
mod errors;
mod metadata;
mod mkdirs;
mod move_ops;
mod options;
mod remove;
mod stream;

pub use asynch::{copy, ensure_dir, move_path, path_exists, remove_all};
pub use copy::copy_sync;
pub use entry::{classify, path_exists_sync, Entry, EntryKind};
pub use errors::{FsError, Result};
pub use mkdirs::ensure_dir_sync;
pub use move_ops::move_path_sync;
pub use options::{CopyFilter, CopyOptions, MoveOptions};
pub use remove::remove_all_sync;
