//! Operation options.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Per-entry predicate: return false to skip the entry and, for
/// directories, its entire subtree. Skips are silent, not errors.
pub type CopyFilter = Arc<dyn Fn(&Path, &Path) -> bool + Send + Sync>;

/// Options for `copy` / `copy_sync`.
#[derive(Clone)]
pub struct CopyOptions {
    /// Replace an existing destination entry. Defaults to true. Existing
    /// destination directories are merged, never replaced wholesale.
    pub overwrite: bool,
    /// Fail with `EEXIST` whenever the destination exists, before any
    /// mutation and regardless of `overwrite`. Defaults to false.
    pub error_on_exist: bool,
    /// Copy atime/mtime from source to destination (millisecond fidelity).
    /// Defaults to false.
    pub preserve_timestamps: bool,
    /// Follow symlinks and copy their targets instead of the links.
    /// Defaults to false.
    pub dereference: bool,
    pub filter: Option<CopyFilter>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            error_on_exist: false,
            preserve_timestamps: false,
            dereference: false,
            filter: None,
        }
    }
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for CopyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyOptions")
            .field("overwrite", &self.overwrite)
            .field("error_on_exist", &self.error_on_exist)
            .field("preserve_timestamps", &self.preserve_timestamps)
            .field("dereference", &self.dereference)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Options for `move_path` / `move_path_sync`.
#[derive(Debug, Clone)]
pub struct MoveOptions {
    /// Replace an existing destination entry. Defaults to false.
    pub overwrite: bool,
    /// Rename retries when the destination is transiently busy (another
    /// process holds it open on Windows, `ETXTBSY` on Unix).
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl MoveOptions {
    pub fn new() -> Self {
        Self::default()
    }
}
