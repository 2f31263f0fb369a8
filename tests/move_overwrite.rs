use fsplus::{move_path_sync, MoveOptions};
use std::fs;
use tempfile::tempdir;

#[test]
fn existing_destination_is_a_conflict_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let src = tmp.path().join("src.txt");
    let dest = tmp.path().join("dest.txt");
    fs::write(&src, "new")?;
    fs::write(&dest, "old")?;

    let err = move_path_sync(&src, &dest, &MoveOptions::default()).unwrap_err();
    assert_eq!(err.code(), "EEXIST");
    assert!(src.exists());
    assert_eq!(fs::read_to_string(&dest)?, "old");
    Ok(())
}

#[test]
fn overwrite_replaces_file_destination() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let src = tmp.path().join("src.txt");
    let dest = tmp.path().join("dest.txt");
    fs::write(&src, "new")?;
    fs::write(&dest, "old")?;

    let opts = MoveOptions {
        overwrite: true,
        ..MoveOptions::default()
    };
    move_path_sync(&src, &dest, &opts)?;
    assert!(!src.exists());
    assert_eq!(fs::read_to_string(&dest)?, "new");
    Ok(())
}

#[test]
fn overwrite_replaces_directory_destination_wholesale() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let src = tmp.path().join("src");
    let dest = tmp.path().join("dest");
    fs::create_dir(&src)?;
    fs::write(src.join("new.txt"), "n")?;
    fs::create_dir(&dest)?;
    fs::write(dest.join("stale.txt"), "s")?;

    let opts = MoveOptions {
        overwrite: true,
        ..MoveOptions::default()
    };
    move_path_sync(&src, &dest, &opts)?;

    // Unlike copy, move replaces: the destination tree is the source tree.
    assert!(!src.exists());
    assert!(dest.join("new.txt").exists());
    assert!(!dest.join("stale.txt").exists());
    Ok(())
}

#[test]
fn dir_destination_without_overwrite_is_eexist() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let src = tmp.path().join("src");
    let dest = tmp.path().join("dest");
    fs::create_dir(&src)?;
    fs::create_dir(&dest)?;

    let err = move_path_sync(&src, &dest, &MoveOptions::default()).unwrap_err();
    assert_eq!(err.code(), "EEXIST");
    assert!(src.exists());
    Ok(())
}
