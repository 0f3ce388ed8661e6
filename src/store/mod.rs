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

//! Durable binding storage
//!
//! The registry talks to storage only through [`BindingStore`]: a mapping
//! from event to an ordered list of gestures, read once at startup and
//! updated on every successful mutation.
//!
//! - **`MemoryStore`**: in-process mapping, useful for tests and embedding
//! - **`FileStore`**: line-oriented file with atomic writes and backups
//!
//! # Example
//!
//! ```no_run
//! use gesture_binding_manager::store::{BindingStore, FileStore};
//!
//! let mut store = FileStore::open("/home/user/.config/gesture-bindings/bindings.conf".into())?;
//! let contents = store.load()?;
//! println!("{} events have stored gestures", contents.bindings.len());
//! # Ok::<(), gesture_binding_manager::store::StoreError>(())
//! ```

pub mod error;
pub mod file;
pub mod transaction;

pub use error::StoreError;
pub use file::FileStore;
pub use transaction::StoreTransaction;

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::types::{BindableEvent, Gesture};

/// Event → ordered gestures, the shape every store exposes
pub type StoreMap = BTreeMap<BindableEvent, Vec<Gesture>>;

/// Everything a store produced at load time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreContents {
    pub bindings: StoreMap,
    /// Human-readable descriptions of entries that could not be read
    pub skipped: Vec<String>,
}

/// Durable backing mapping the registry synchronises with
///
/// Implementations must be `Send`: the registry keeps its store behind
/// its own lock and may be shared across threads.
pub trait BindingStore: Send {
    /// Reads every stored binding. Malformed entries go to `skipped`.
    fn load(&mut self) -> Result<StoreContents, StoreError>;

    /// Appends `gesture` to `event`'s list unless already present.
    ///
    /// Returns `Ok(false)` when the gesture was already stored for `event`.
    fn append_unique(&mut self, event: BindableEvent, gesture: Gesture) -> Result<bool, StoreError>;

    /// Removes `gesture` from every event's list, returning how many entries went.
    fn remove_gesture(&mut self, gesture: &Gesture) -> Result<usize, StoreError>;

    /// Removes `gesture` from `event`'s list only. Returns true if it was there.
    fn remove_from(&mut self, event: BindableEvent, gesture: &Gesture) -> Result<bool, StoreError>;

    /// Current mapping as the store sees it
    fn snapshot(&self) -> StoreMap;
}

/// Add-if-absent on a store mapping. Returns true if the gesture was added.
pub fn append_unique_in(map: &mut StoreMap, event: BindableEvent, gesture: Gesture) -> bool {
    let gestures = map.entry(event).or_default();
    if gestures.contains(&gesture) {
        return false;
    }

    gestures.push(gesture);
    true
}

/// Removes a gesture from every event of a store mapping
pub fn remove_in(map: &mut StoreMap, gesture: &Gesture) -> usize {
    let mut removed = 0;

    for gestures in map.values_mut() {
        let before = gestures.len();
        gestures.retain(|g| g != gesture);
        removed += before - gestures.len();
    }

    map.retain(|_, gestures| !gestures.is_empty());
    removed
}

/// Removes a gesture from one event of a store mapping
pub fn remove_from_in(map: &mut StoreMap, event: BindableEvent, gesture: &Gesture) -> bool {
    let Some(gestures) = map.get_mut(&event) else {
        return false;
    };

    let before = gestures.len();
    gestures.retain(|g| g != gesture);
    let removed = gestures.len() != before;

    if gestures.is_empty() {
        map.remove(&event);
    }
    removed
}

/// Store that lives only in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    bindings: StoreMap,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, keeping the first occurrence of duplicate pairs
    pub fn with_bindings(pairs: impl IntoIterator<Item = (BindableEvent, Gesture)>) -> Self {
        let mut bindings = StoreMap::new();
        for (event, gesture) in pairs {
            append_unique_in(&mut bindings, event, gesture);
        }

        Self { bindings }
    }

    /// Wraps the store so a caller can keep a handle after handing it to a registry
    pub fn shared(self) -> Arc<Mutex<MemoryStore>> {
        Arc::new(Mutex::new(self))
    }
}

impl BindingStore for MemoryStore {
    fn load(&mut self) -> Result<StoreContents, StoreError> {
        Ok(StoreContents {
            bindings: self.bindings.clone(),
            skipped: Vec::new(),
        })
    }

    fn append_unique(
        &mut self,
        event: BindableEvent,
        gesture: Gesture,
    ) -> Result<bool, StoreError> {
        Ok(append_unique_in(&mut self.bindings, event, gesture))
    }

    fn remove_gesture(&mut self, gesture: &Gesture) -> Result<usize, StoreError> {
        Ok(remove_in(&mut self.bindings, gesture))
    }

    fn remove_from(&mut self, event: BindableEvent, gesture: &Gesture) -> Result<bool, StoreError> {
        Ok(remove_from_in(&mut self.bindings, event, gesture))
    }

    fn snapshot(&self) -> StoreMap {
        self.bindings.clone()
    }
}

impl<S: BindingStore> BindingStore for Arc<Mutex<S>> {
    fn load(&mut self) -> Result<StoreContents, StoreError> {
        self.lock().load()
    }

    fn append_unique(
        &mut self,
        event: BindableEvent,
        gesture: Gesture,
    ) -> Result<bool, StoreError> {
        self.lock().append_unique(event, gesture)
    }

    fn remove_gesture(&mut self, gesture: &Gesture) -> Result<usize, StoreError> {
        self.lock().remove_gesture(gesture)
    }

    fn remove_from(&mut self, event: BindableEvent, gesture: &Gesture) -> Result<bool, StoreError> {
        self.lock().remove_from(event, gesture)
    }

    fn snapshot(&self) -> StoreMap {
        self.lock().snapshot()
    }
}

#[cfg(test)]
mod tests;
