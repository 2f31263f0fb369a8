use fsplus::{move_path_sync, MoveOptions};
use std::fs;
use tempfile::tempdir;

#[test]
fn moves_file_same_device() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let src = tmp.path().join("src.txt");
    let dest = tmp.path().join("dest.txt");
    fs::write(&src, "payload")?;

    move_path_sync(&src, &dest, &MoveOptions::default())?;
    assert!(!src.exists(), "source must be gone after move");
    assert_eq!(fs::read_to_string(&dest)?, "payload");
    Ok(())
}

#[test]
fn creates_missing_destination_parent() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let src = tmp.path().join("src.txt");
    let dest = tmp.path().join("deep/nested/dest.txt");
    fs::write(&src, "p")?;

    move_path_sync(&src, &dest, &MoveOptions::default())?;
    assert_eq!(fs::read_to_string(&dest)?, "p");
    Ok(())
}

#[test]
fn missing_source_is_enoent() {
    let tmp = tempdir().unwrap();
    let err = move_path_sync(
        tmp.path().join("ghost"),
        tmp.path().join("dest"),
        &MoveOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), "ENOENT");
}

#[cfg(unix)]
#[test]
fn moves_symlink_without_following_it() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::symlink;
    let tmp = tempdir()?;
    let target = tmp.path().join("target");
    let link = tmp.path().join("link");
    fs::write(&target, "t")?;
    symlink(&target, &link)?;

    let dest = tmp.path().join("moved-link");
    move_path_sync(&link, &dest, &MoveOptions::default())?;

    assert!(fs::symlink_metadata(&dest)?.file_type().is_symlink());
    assert!(!link.exists());
    assert!(target.exists(), "the target itself is untouched");
    Ok(())
}
