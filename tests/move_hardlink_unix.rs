#![cfg(unix)]

use fsplus::{move_path_sync, MoveOptions};
use std::fs;
use tempfile::tempdir;

#[test]
fn hardlinked_twin_under_other_name_is_a_noop() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write(&a, "shared inode")?;
    fs::hard_link(&a, &b)?;

    // rename(2) of two names for the same inode does nothing and succeeds;
    // the engine mirrors that instead of deleting one of the names.
    move_path_sync(&a, &b, &MoveOptions::default())?;
    assert!(a.exists());
    assert!(b.exists());
    assert_eq!(fs::read_to_string(&b)?, "shared inode");
    Ok(())
}
