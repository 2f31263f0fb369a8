//! Streaming byte copy with platform fast paths.
//!
//! - The destination is created with `create_new` (O_EXCL semantics); this
//!   module never clobbers. Callers copy to a unique temp path and rename.
//! - Linux: `copy_file_range` in-kernel copy when the filesystem supports
//!   it, falling back to buffered streaming otherwise.
//! - macOS: APFS `clonefile` CoW clone, falling back to streaming.
//! - Everywhere else: 1 MiB buffered read/write.
//!
//! Snapshot semantics: the source is read once from start to EOF. Growth
//! during the copy is not included; truncation surfaces as early EOF.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy `src` -> `dst`, returning the number of bytes written.
pub(crate) fn copy_contents(src: &Path, dst: &Path) -> io::Result<u64> {
    #[cfg(target_os = "macos")]
    if let Some(bytes) = try_clonefile(src, dst)? {
        return Ok(bytes);
    }

    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    #[cfg(target_os = "linux")]
    let (src_f, dst_f) = match copy_file_range_loop(&src_f, &dst_f)? {
        Some(bytes) => return Ok(bytes),
        None => (src_f, dst_f),
    };

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

/// In-kernel copy. `Ok(None)` means the filesystem does not support
/// `copy_file_range` here and the caller should stream instead; that
/// decision can only be made before any byte has been copied.
#[cfg(target_os = "linux")]
fn copy_file_range_loop(src_f: &File, dst_f: &File) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: usize = 16 * 1024 * 1024;
    let mut total: u64 = 0;
    loop {
        let rc = unsafe {
            libc::copy_file_range(
                src_f.as_raw_fd(),
                std::ptr::null_mut(),
                dst_f.as_raw_fd(),
                std::ptr::null_mut(),
                CHUNK,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
        } else if rc == 0 {
            return Ok(Some(total));
        } else {
            let err = io::Error::last_os_error();
            let unsupported = matches!(
                err.raw_os_error(),
                Some(libc::EXDEV) | Some(libc::ENOSYS) | Some(libc::EINVAL) | Some(libc::EPERM)
            );
            if total == 0 && unsupported {
                return Ok(None);
            }
            return Err(err);
        }
    }
}

/// CoW clone on APFS. `Ok(None)` means the clone was not possible and the
/// caller should stream. `clonefile` fails with EEXIST if `dst` exists,
/// which matches the `create_new` contract of the streaming path.
#[cfg(target_os = "macos")]
fn try_clonefile(src: &Path, dst: &Path) -> io::Result<Option<u64>> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let (Ok(src_c), Ok(dst_c)) = (
        CString::new(src.as_os_str().as_bytes()),
        CString::new(dst.as_os_str().as_bytes()),
    ) else {
        return Ok(None);
    };

    let rc = unsafe { libc::clonefile(src_c.as_ptr(), dst_c.as_ptr(), 0) };
    if rc == 0 {
        let bytes = std::fs::metadata(src)?.len();
        return Ok(Some(bytes));
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        // Different volume, non-APFS, or not permitted: stream instead.
        Some(libc::EXDEV) | Some(libc::ENOTSUP) | Some(libc::EPERM) => Ok(None),
        _ => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copies_small_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"hello world").unwrap();

        let n = copy_contents(&src, &dst).unwrap();
        assert_eq!(n, 11);
        assert_eq!(fs::read(&dst).unwrap(), b"hello world");
    }

    #[test]
    fn copies_empty_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("empty");
        let dst = dir.path().join("out");
        File::create(&src).unwrap();

        assert_eq!(copy_contents(&src, &dst).unwrap(), 0);
        assert_eq!(fs::metadata(&dst).unwrap().len(), 0);
    }

    #[test]
    fn never_clobbers_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"data").unwrap();
        fs::write(&dst, b"x").unwrap();

        let err = copy_contents(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst).unwrap(), b"x");
    }

    #[test]
    fn crosses_buffer_boundaries() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.bin");
        let dst = dir.path().join("big.out");

        let size = 2 * BUF_SIZE + 123;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let n = copy_contents(&src, &dst).unwrap();
        assert_eq!(n as usize, size);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
