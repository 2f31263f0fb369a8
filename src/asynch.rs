//! Async API surface.
//!
//! Each async operation is the sync engine executed on tokio's blocking
//! thread pool, so the two variants are the same algorithm and stay
//! behaviorally identical; only blocking vs suspending differs at the call
//! boundary.

use std::path::Path;

use tokio::task;

use crate::copy::copy_sync;
use crate::entry::path_exists_sync;
use crate::errors::{FsError, Result};
use crate::mkdirs::ensure_dir_sync;
use crate::move_ops::move_path_sync;
use crate::options::{CopyOptions, MoveOptions};
use crate::remove::remove_all_sync;

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
        Err(_) => Err(FsError::BackgroundTask),
    }
}

/// Async variant of [`copy_sync`].
pub async fn copy(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &CopyOptions,
) -> Result<()> {
    let src = src.as_ref().to_owned();
    let dest = dest.as_ref().to_owned();
    let options = options.clone();
    run_blocking(move || copy_sync(&src, &dest, &options)).await
}

/// Async variant of [`move_path_sync`].
pub async fn move_path(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &MoveOptions,
) -> Result<()> {
    let src = src.as_ref().to_owned();
    let dest = dest.as_ref().to_owned();
    let options = options.clone();
    run_blocking(move || move_path_sync(&src, &dest, &options)).await
}

/// Async variant of [`remove_all_sync`].
pub async fn remove_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    run_blocking(move || remove_all_sync(&path)).await
}

/// Async variant of [`ensure_dir_sync`].
pub async fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    run_blocking(move || ensure_dir_sync(&path)).await
}

/// Async variant of [`path_exists_sync`].
pub async fn path_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref().to_owned();
    run_blocking(move || path_exists_sync(&path)).await
}
