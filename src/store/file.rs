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

//! File-backed binding store with atomic writes and backup support.
//!
//! The file holds one binding per line:
//!
//! ```text
//! # Managed by gesture-binding-manager
//! bind = IncreaseVolume, CTRL+Up
//! bind = ToggleVolumeMute, NONE
//! ```
//!
//! - **Lenient reads**: malformed lines are skipped and reported, never fatal
//! - **Atomic writes**: temp-file-then-rename, the file is never half-written
//! - **Automatic backups**: every write first copies the old file into
//!   `backups/` next to it, keeping the newest `backup_limit` copies

use chrono::Local;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::core::parser::{format_store_line, parse_store, ParseError};
use crate::core::types::{BindableEvent, Gesture};
use crate::store::{
    append_unique_in, remove_from_in, remove_in, BindingStore, StoreContents, StoreError, StoreMap,
    StoreTransaction,
};

/// Backups kept per store file unless configured otherwise
pub const DEFAULT_BACKUP_LIMIT: usize = 10;

const FILE_HEADER: &str = "# Managed by gesture-binding-manager\n# Format: bind = EVENT, GESTURE\n";

/// Binding store persisted to a single text file.
///
/// Keeps an in-memory copy of the mapping; every mutation rewrites the
/// whole file through a [`StoreTransaction`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    backup_dir: PathBuf,
    backup_limit: usize,
    bindings: StoreMap,
}

impl FileStore {
    /// Opens (without reading) the store at `path`.
    ///
    /// The file itself may be missing: it is created on the first write.
    /// The parent directory and a `backups/` directory next to the file are
    /// created if needed. A symlinked store file is allowed with a warning.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::BackupDirNotWritable` if the backup directory
    /// cannot be created or is read-only.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if path.read_link().is_ok() {
            warn!(path = %path.display(), "store file is a symlink");
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        // e.g., ~/.config/gesture-bindings/bindings.conf → ~/.config/gesture-bindings/backups/
        let backup_dir = parent.join("backups");
        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| StoreError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(StoreError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self {
            path,
            backup_dir,
            backup_limit: DEFAULT_BACKUP_LIMIT,
            bindings: StoreMap::new(),
        })
    }

    /// Sets how many backups are kept (at least one)
    pub fn with_backup_limit(mut self, limit: usize) -> Self {
        self.backup_limit = limit.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Reads the store file as text. A missing file reads as empty.
    ///
    /// Lines are decoded one at a time: a line that is not valid UTF-8 is
    /// left blank in the returned text and reported as a parse error, so
    /// line numbers still match the file.
    fn read_contents(&self) -> Result<(String, Vec<ParseError>), StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((String::new(), Vec::new())),
            Err(e) => return Err(e.into()),
        };

        let mut content = String::with_capacity(bytes.len());
        let mut undecodable = Vec::new();

        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            if index > 0 {
                content.push('\n');
            }
            match std::str::from_utf8(raw) {
                Ok(line) => content.push_str(line),
                Err(_) => undecodable.push(ParseError::InvalidSyntax {
                    line: index + 1,
                    message: "line is not valid UTF-8".to_string(),
                }),
            }
        }

        Ok((content, undecodable))
    }

    /// Renders the in-memory mapping in file format
    pub fn render(&self) -> String {
        let mut content = String::from(FILE_HEADER);

        for (event, gestures) in &self.bindings {
            for gesture in gestures {
                content.push_str(&format_store_line(*event, gesture));
                content.push('\n');
            }
        }

        content
    }

    /// Copies the current store file into the backup directory.
    ///
    /// Returns `Ok(None)` when there is no file to back up yet.
    pub(crate) fn create_timestamped_backup(&self) -> Result<Option<PathBuf>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        // YYYY-MM-DD_HHMMSS_mmm sorts lexicographically in time order
        let timestamp = Local::now().format("%Y-%m-%d_%H%M%S_%3f");
        let backup_path = self
            .backup_dir
            .join(format!("{}.{}", self.file_name()?, timestamp));

        fs::copy(&self.path, &backup_path)
            .map_err(|e| StoreError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

        Ok(Some(backup_path))
    }

    /// Lists backups of this store file, oldest first
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, StoreError> {
        let prefix = format!("{}.", self.file_name()?);

        let mut backups = fs::read_dir(&self.backup_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();

        backups.sort();
        Ok(backups)
    }

    /// Deletes the oldest backups beyond the limit, returning how many went
    pub fn cleanup_old_backups(&self) -> Result<usize, StoreError> {
        let backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(self.backup_limit);

        for backup in &backups[..excess] {
            fs::remove_file(backup)?;
        }

        Ok(excess)
    }

    fn file_name(&self) -> Result<&str, StoreError> {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StoreError::BackupFailed(format!(
                    "store path has no UTF-8 file name: {}",
                    self.path.display()
                ))
            })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let tx = StoreTransaction::begin(self)?;
        debug!(
            path = %self.path.display(),
            backup = ?tx.backup_path(),
            "writing binding store"
        );
        tx.commit(&self.render())?;

        // The new file is in place; a failed prune must not undo the write
        match self.cleanup_old_backups() {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "pruned old store backups"),
            Err(e) => warn!(error = %e, "failed to prune old store backups"),
        }

        Ok(())
    }

    /// Applies `change` to the mapping and persists it, restoring the
    /// previous mapping if the new file could not be written
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut StoreMap) -> T,
        changed: impl Fn(&T) -> bool,
    ) -> Result<T, StoreError> {
        let before = self.bindings.clone();
        let result = change(&mut self.bindings);

        if changed(&result) {
            if let Err(e) = self.persist() {
                self.bindings = before;
                return Err(e);
            }
        }

        Ok(result)
    }
}

impl BindingStore for FileStore {
    fn load(&mut self) -> Result<StoreContents, StoreError> {
        let (content, undecodable) = self.read_contents()?;
        let mut parsed = parse_store(&content);
        parsed.skipped.extend(undecodable);

        let mut bindings = StoreMap::new();
        for (_, event, gesture) in parsed.entries {
            append_unique_in(&mut bindings, event, gesture);
        }

        let skipped = parsed
            .skipped
            .iter()
            .map(|e| format!("{}: {}", self.path.display(), e))
            .collect::<Vec<_>>();

        self.bindings = bindings.clone();

        Ok(StoreContents { bindings, skipped })
    }

    fn append_unique(
        &mut self,
        event: BindableEvent,
        gesture: Gesture,
    ) -> Result<bool, StoreError> {
        self.mutate(|map| append_unique_in(map, event, gesture), |added| *added)
    }

    fn remove_gesture(&mut self, gesture: &Gesture) -> Result<usize, StoreError> {
        self.mutate(|map| remove_in(map, gesture), |removed| *removed > 0)
    }

    fn remove_from(&mut self, event: BindableEvent, gesture: &Gesture) -> Result<bool, StoreError> {
        self.mutate(|map| remove_from_in(map, event, gesture), |removed| *removed)
    }

    fn snapshot(&self) -> StoreMap {
        self.bindings.clone()
    }
}
