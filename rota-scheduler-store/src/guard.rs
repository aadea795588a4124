/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

//! Best-effort guards around shared-workbook writes: a timestamped backup
//! copy, and a `.lock` sibling file held while writing. Not a distributed
//! lock; it only reduces the window for concurrent edits on a synced drive.

use crate::error::StoreError;
use chrono::Local;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies `path` next to itself with a timestamp suffix. Returns the
/// backup path, or `None` (with a warning) when the copy fails; callers
/// continue without a backup.
pub fn backup_file(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_string_lossy();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let backup = path.with_file_name(format!("{}_backup_{}{}", stem, ts, ext));
    match fs::copy(path, &backup) {
        Ok(_) => Some(backup),
        Err(e) => {
            warn!("backup of {} failed: {}", path.display(), e);
            None
        }
    }
}

/// Exclusive `.lock` sibling of the guarded file, released on drop.
#[derive(Debug)]
pub struct LockGuard {
    lock_path: PathBuf,
}

impl LockGuard {
    pub fn acquire(target: &Path) -> Result<Self, StoreError> {
        let mut lock_name = target.as_os_str().to_os_string();
        lock_name.push(".lock");
        let lock_path = PathBuf::from(lock_name);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => Ok(LockGuard { lock_path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(StoreError::Locked {
                path: target.to_path_buf(),
            }),
            Err(e) => Err(StoreError::io(lock_path, e)),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            warn!("failed to release lock {}: {}", self.lock_path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("workbook.json");
        std::fs::write(&target, "{}").unwrap();

        let guard = LockGuard::acquire(&target).unwrap();
        assert!(matches!(
            LockGuard::acquire(&target),
            Err(StoreError::Locked { .. })
        ));
        drop(guard);
        let _second = LockGuard::acquire(&target).unwrap();
    }

    #[test]
    fn test_backup_copies_content() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("workbook.json");
        std::fs::write(&target, "payload").unwrap();

        let backup = backup_file(&target).unwrap();
        assert!(backup.file_name().unwrap().to_string_lossy().contains("workbook_backup_"));
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "payload");
    }

    #[test]
    fn test_backup_of_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(backup_file(&dir.path().join("absent.json")).is_none());
    }
}
