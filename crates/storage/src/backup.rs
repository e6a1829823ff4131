use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::StorageError;

/// Copy the whole store directory to a sibling path suffixed with a local
/// ISO-8601 timestamp (dashes in the date, colons in the time), e.g.
/// `Accounts-2026-08-28T14:03:55+09:00`. Returns the backup path.
///
/// The copy happens before any write; a failure here aborts the save that
/// requested it.
pub fn backup_store_dir(db_dir: &Path) -> Result<PathBuf, StorageError> {
    if !db_dir.is_dir() {
        return Err(StorageError::Backup(format!(
            "store directory does not exist: {}",
            db_dir.display()
        )));
    }

    let stamp = Local::now().format("%Y-%m-%dT%H:%M:%S%:z");
    let mut name = db_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(&format!("-{stamp}"));
    let dest = db_dir.with_file_name(name);

    copy_dir(db_dir, &dest).map_err(|e| {
        StorageError::Backup(format!("copy to {} failed: {e}", dest.display()))
    })?;
    Ok(dest)
}

fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    // Fails if the destination already exists, matching two backups landing
    // on the same second.
    fs::create_dir(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
