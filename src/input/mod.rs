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

//! Key-press routing from windows to the registry
//!
//! The windowing layer owns raw input. It hands each key-down to
//! [`KeyMonitor::on_key_down`] together with the window it arrived in; the
//! monitor ignores windows that were never registered and forwards the rest
//! to [`GestureRegistry::activate`].

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::core::registry::GestureRegistry;
use crate::core::types::{Gesture, Key, Modifiers};

/// Opaque handle for a host window
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// A raw key-down as delivered by the windowing layer
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyDown {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyDown {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub const fn gesture(&self) -> Gesture {
        Gesture::new(self.key, self.modifiers)
    }
}

/// Watches a set of windows and turns their key presses into activations
pub struct KeyMonitor {
    registry: Arc<GestureRegistry>,
    windows: Mutex<HashSet<WindowId>>,
}

impl KeyMonitor {
    pub fn new(registry: Arc<GestureRegistry>) -> Self {
        Self {
            registry,
            windows: Mutex::new(HashSet::new()),
        }
    }

    /// Starts routing key presses from `window`. False if already monitored.
    pub fn monitor(&self, window: WindowId) -> bool {
        let added = self.windows.lock().insert(window);
        if added {
            debug!(%window, "monitoring window");
        }
        added
    }

    /// Stops routing key presses from `window`. False if it was not monitored.
    pub fn unmonitor(&self, window: WindowId) -> bool {
        let removed = self.windows.lock().remove(&window);
        if removed {
            debug!(%window, "stopped monitoring window");
        }
        removed
    }

    pub fn is_monitoring(&self, window: WindowId) -> bool {
        self.windows.lock().contains(&window)
    }

    /// Handles a key-down in `window`.
    ///
    /// Returns true when the press resolved to a bound event (and an
    /// activation was published), meaning the host should treat it as handled.
    pub fn on_key_down(&self, window: WindowId, key_down: KeyDown) -> bool {
        if key_down.key == Key::None || !self.is_monitoring(window) {
            return false;
        }

        self.registry
            .activate(&key_down.gesture(), window)
            .is_some()
    }
}

#[cfg(test)]
mod tests;
