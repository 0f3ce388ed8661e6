// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Store write transaction with automatic backup
//!
//! Every store write goes through `begin()` then `commit()`.

use atomic_write_file::AtomicWriteFile;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

use crate::store::{FileStore, StoreError};

/// Atomic store write with a backup taken up front.
///
/// # Lifecycle
///
/// 1. `begin()` - Copies the current file (if any) into the backup directory
/// 2. Caller renders the new content in memory
/// 3. `commit()` - Writes via temp file + rename, so the store file is never
///    half-written
///
/// # Example
///
/// ```no_run
/// use gesture_binding_manager::store::{FileStore, StoreTransaction};
///
/// let store = FileStore::open("bindings.conf".into())?;
/// let tx = StoreTransaction::begin(&store)?;
/// tx.commit("bind = ToggleFullscreen, F11\n")?;
/// # Ok::<(), gesture_binding_manager::store::StoreError>(())
/// ```
pub struct StoreTransaction<'a> {
    store: &'a FileStore,
    backup_path: Option<PathBuf>,
}

impl<'a> StoreTransaction<'a> {
    /// Begins a transaction by backing up the current store file.
    ///
    /// A store file that does not exist yet has nothing to back up; the
    /// transaction then carries no backup path.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file cannot be read or the backup
    /// cannot be written. No changes are made in that case.
    pub fn begin(store: &'a FileStore) -> Result<Self, StoreError> {
        let backup_path = store.create_timestamped_backup()?;

        Ok(Self { store, backup_path })
    }

    /// Backup taken by `begin()`, if the file existed
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Atomically replaces the store file with `new_content`.
    ///
    /// Consumes the transaction. On error the original file is untouched.
    pub fn commit(self, new_content: &str) -> Result<(), StoreError> {
        let mut file = AtomicWriteFile::options()
            .open(self.store.path())
            .map_err(|e| {
                StoreError::WriteFailed(format!("Failed to open for atomic write: {}", e))
            })?;

        file.write_all(new_content.as_bytes())
            .map_err(|e| StoreError::WriteFailed(format!("Failed to write content: {}", e)))?;

        file.commit().map_err(|e| {
            StoreError::WriteFailed(format!("Failed to commit atomic write: {}", e))
        })?;

        Ok(())
    }
}
