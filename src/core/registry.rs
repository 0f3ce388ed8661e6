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

//! Process-wide gesture registry
//!
//! `GestureRegistry` is the single authority for gesture → event
//! associations. It:
//! - Loads factory defaults and overlays stored bindings, once
//! - Enforces global gesture uniqueness
//! - Refuses to remove protected defaults
//! - Mirrors every successful mutation into the attached store
//!
//! # Concurrency
//!
//! All state sits behind one `parking_lot::Mutex`. Every operation, reads
//! included, takes it; compound operations (set, clear, update) hold it for
//! their whole duration, so concurrent callers observe a linear history and
//! never a half-applied change. Store writes happen under the same lock.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gesture_binding_manager::core::{BindableEvent, Gesture, GestureRegistry, Key};
//! use gesture_binding_manager::events::TracingPublisher;
//!
//! let registry = GestureRegistry::new();
//! registry.initialize(Arc::new(TracingPublisher), None);
//!
//! let f11 = Gesture::key(Key::F11);
//! assert_eq!(registry.lookup(&f11), Some(BindableEvent::ToggleFullscreen));
//! assert!(!registry.remove_binding(&f11).is_success()); // protected default
//! ```

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::collection::{BindOutcome, BindingCollection};
use crate::core::defaults::DefaultBindingSet;
use crate::core::types::{BindableEvent, Binding, Gesture, Key, Modifiers};
use crate::events::{Activation, BindingNotification, EventPublisher, LoadReport};
use crate::input::WindowId;
use crate::store::{BindingStore, StoreContents};

/// Misuse of the registry API
///
/// Business conflicts are reported through [`BindOutcome`]; this error is
/// reserved for callers whose view of the bindings is out of date.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RegistryError {
    /// `update_binding` was given an old gesture the event does not hold
    #[error("{event} does not have the binding {gesture}; cannot update")]
    UnknownBinding {
        event: BindableEvent,
        gesture: Gesture,
    },
}

/// State guarded by the registry lock
struct RegistryState {
    bindings: BindingCollection,
    store: Option<Box<dyn BindingStore>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

/// Thread-safe gesture → event registry
///
/// Construct one per process and share it by reference (or `Arc`).
pub struct GestureRegistry {
    defaults: &'static DefaultBindingSet,
    state: Mutex<RegistryState>,
    init_lock: Mutex<()>,
    initialized: AtomicBool,
}

impl GestureRegistry {
    /// Creates an empty registry using the standard default catalog
    ///
    /// Nothing is bound until [`initialize`](Self::initialize) runs.
    pub fn new() -> Self {
        Self::with_defaults(DefaultBindingSet::standard())
    }

    /// Creates an empty registry with a custom default catalog
    pub fn with_defaults(defaults: &'static DefaultBindingSet) -> Self {
        Self {
            defaults,
            state: Mutex::new(RegistryState {
                bindings: BindingCollection::new(),
                store: None,
                publisher: None,
            }),
            init_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Loads defaults, overlays stored bindings and attaches `store`.
    ///
    /// Runs at most once: the first caller wins and later calls return
    /// `false` without touching anything. Safe to race from many threads.
    ///
    /// Publishes `Loading` before and `Loaded` after the load. Stored
    /// gestures augment the defaults; entries that are malformed or collide
    /// with an existing binding are skipped and listed in the report. A
    /// store that fails to load entirely is logged and the registry still
    /// ends up initialized with defaults only.
    pub fn initialize(
        &self,
        publisher: Arc<dyn EventPublisher>,
        mut store: Option<Box<dyn BindingStore>>,
    ) -> bool {
        if self.initialized.load(Ordering::Acquire) {
            return false;
        }

        let _init = self.init_lock.lock();
        if self.initialized.load(Ordering::Acquire) {
            return false;
        }

        publisher.publish(BindingNotification::Loading);

        let mut report = LoadReport::new();
        let contents = match store.as_mut().map(|s| s.load()) {
            Some(Ok(contents)) => contents,
            Some(Err(e)) => {
                warn!(error = %e, "failed to load binding store, continuing with defaults");
                report.add_skipped(format!("store could not be read: {}", e));
                StoreContents::default()
            }
            None => StoreContents::default(),
        };

        let total = {
            let mut state = self.state.lock();
            self.load_into(&mut state.bindings, contents, &mut report);
            state.store = store;
            state.publisher = Some(Arc::clone(&publisher));
            state.bindings.len()
        };

        self.initialized.store(true, Ordering::Release);

        info!(%report, total, "gesture registry initialized");
        publisher.publish(BindingNotification::Loaded(report));
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Event bound to `gesture`, if any
    pub fn lookup(&self, gesture: &Gesture) -> Option<BindableEvent> {
        self.state.lock().bindings.owner(gesture)
    }

    pub fn is_registered(&self, gesture: &Gesture) -> bool {
        self.lookup(gesture).is_some()
    }

    pub fn is_key_registered(&self, key: Key, modifiers: Modifiers) -> bool {
        self.is_registered(&Gesture::new(key, modifiers))
    }

    /// Snapshot of the gestures bound to `event` (empty if none)
    pub fn get_bindings(&self, event: BindableEvent) -> BTreeSet<Gesture> {
        self.state.lock().bindings.gestures(event)
    }

    /// Snapshot of every live binding, grouped by event
    pub fn bindings(&self) -> Vec<Binding> {
        self.state.lock().bindings.iter().copied().collect()
    }

    /// Binds `gesture` to `event`.
    ///
    /// Rejected with `AlreadyBound` if any event (including `event`) already
    /// holds the gesture. On success the gesture is appended to the store.
    pub fn add_binding(&self, event: BindableEvent, gesture: Gesture) -> BindOutcome {
        let mut state = self.state.lock();
        self.add_locked(&mut state, event, gesture)
    }

    /// Unbinds `gesture` from whichever event holds it.
    ///
    /// Refused with `Protected` if the gesture is a non-overridable default
    /// of its current event. Removing an unbound gesture is `Unchanged`.
    pub fn remove_binding(&self, gesture: &Gesture) -> BindOutcome {
        let mut state = self.state.lock();
        self.remove_locked(&mut state, gesture)
    }

    /// Removes every gesture bound to `event`.
    ///
    /// Protected defaults stay; their siblings are still removed and the
    /// result reports the first refusal. This partial effect is not rolled back.
    pub fn clear_bindings(&self, event: BindableEvent) -> BindOutcome {
        let mut state = self.state.lock();
        self.clear_locked(&mut state, event)
    }

    /// Makes `gesture` the only binding of `event`.
    ///
    /// Equivalent to `set_bindings(event, [gesture])`. Binding
    /// `Gesture::NONE` leaves the event explicitly unbound.
    pub fn set_binding(&self, event: BindableEvent, gesture: Gesture) -> BindOutcome {
        self.set_bindings(event, [gesture])
    }

    pub fn set_key_binding(
        &self,
        event: BindableEvent,
        key: Key,
        modifiers: Modifiers,
    ) -> BindOutcome {
        self.set_binding(event, Gesture::new(key, modifiers))
    }

    /// Replaces all of `event`'s gestures with `gestures`.
    ///
    /// All or nothing: if any removal or addition fails, the event's
    /// previous gestures are restored (in memory and in the store) and the
    /// first failing outcome is returned.
    pub fn set_bindings(
        &self,
        event: BindableEvent,
        gestures: impl IntoIterator<Item = Gesture>,
    ) -> BindOutcome {
        let mut state = self.state.lock();
        let previous = state.bindings.bindings_for(event).to_vec();

        let mut outcome = self.clear_locked(&mut state, event);
        if outcome.is_success() {
            for gesture in gestures {
                outcome = outcome.and(self.add_locked(&mut state, event, gesture));
                if !outcome.is_success() {
                    break;
                }
            }
        }

        if !outcome.is_success() {
            debug!(%event, %outcome, "set_bindings failed, restoring previous gestures");
            self.restore_locked(&mut state, event, &previous);
        }

        outcome
    }

    /// Replaces `old` with `new` on `event`.
    ///
    /// `new == None` stands for `Gesture::NONE`. If the new gesture cannot
    /// be added, `old` is put back.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownBinding` if `event` does not currently
    /// hold `old`. No state changes in that case.
    pub fn update_binding(
        &self,
        event: BindableEvent,
        old: Gesture,
        new: Option<Gesture>,
    ) -> Result<BindOutcome, RegistryError> {
        let new = new.unwrap_or(Gesture::NONE);
        let mut state = self.state.lock();

        if !state.bindings.contains(event, &old) {
            return Err(RegistryError::UnknownBinding {
                event,
                gesture: old,
            });
        }

        let removed = self.remove_from_locked(&mut state, event, &old);
        if !removed.is_success() {
            return Ok(removed);
        }

        let added = self.add_locked(&mut state, event, new);
        if !added.is_success() {
            debug!(%event, %old, %new, %added, "update failed, restoring old gesture");
            let _ = self.add_locked(&mut state, event, old);
        }

        Ok(removed.and(added))
    }

    /// Resolves `gesture` and publishes an `Activated` notification.
    ///
    /// Returns the resolved event. Nothing is published for unbound
    /// gestures or before initialization.
    pub fn activate(&self, gesture: &Gesture, window: WindowId) -> Option<BindableEvent> {
        let (event, publisher) = {
            let state = self.state.lock();
            (state.bindings.owner(gesture)?, state.publisher.clone())
        };

        if let Some(publisher) = publisher {
            publisher.publish(BindingNotification::Activated(Activation {
                event,
                gesture: *gesture,
                window,
            }));
        }

        Some(event)
    }

    /// Inserts defaults then stored bindings, recording what happened
    fn load_into(
        &self,
        bindings: &mut BindingCollection,
        contents: StoreContents,
        report: &mut LoadReport,
    ) {
        for default in self.defaults.iter() {
            match bindings.insert(*default) {
                Ok(()) => report.defaults_loaded += 1,
                Err(owner) => report.add_skipped(format!(
                    "default {} for {} is already bound to {}",
                    default.gesture, default.event, owner
                )),
            }
        }

        for message in contents.skipped {
            warn!(%message, "skipping malformed stored binding");
            report.add_skipped(message);
        }

        for (event, gestures) in contents.bindings {
            for gesture in gestures {
                // Stored copies of defaults are already in place
                if bindings.contains(event, &gesture) {
                    continue;
                }

                let binding = self.binding_for(event, gesture);
                match bindings.insert(binding) {
                    Ok(()) => report.record_restored(binding),
                    Err(owner) => {
                        warn!(%event, %gesture, %owner, "skipping stored binding, already bound");
                        report.add_skipped(format!(
                            "stored {} for {} is already bound to {}",
                            gesture, event, owner
                        ));
                    }
                }
            }
        }
    }

    fn binding_for(&self, event: BindableEvent, gesture: Gesture) -> Binding {
        Binding::new(event, gesture, !self.defaults.is_protected(event, &gesture))
    }

    fn add_locked(
        &self,
        state: &mut RegistryState,
        event: BindableEvent,
        gesture: Gesture,
    ) -> BindOutcome {
        if let Err(owner) = state.bindings.insert(self.binding_for(event, gesture)) {
            debug!(%event, %gesture, %owner, "rejected duplicate binding");
            return BindOutcome::AlreadyBound { owner };
        }

        if let Some(store) = state.store.as_mut() {
            if let Err(e) = store.append_unique(event, gesture) {
                warn!(%event, %gesture, error = %e, "binding added in memory but not persisted");
            }
        }

        debug!(%event, %gesture, "binding added");
        BindOutcome::Applied
    }

    fn remove_locked(&self, state: &mut RegistryState, gesture: &Gesture) -> BindOutcome {
        if let Some(binding) = state.bindings.binding(gesture) {
            if !binding.overridable {
                debug!(event = %binding.event, %gesture, "refused to remove protected default");
                return BindOutcome::Protected {
                    event: binding.event,
                };
            }
        }

        let removed = state.bindings.remove(gesture);
        if removed.is_empty() {
            return BindOutcome::Unchanged;
        }

        if let Some(store) = state.store.as_mut() {
            if let Err(e) = store.remove_gesture(gesture) {
                warn!(%gesture, error = %e, "binding removed in memory but not persisted");
            }
        }

        debug!(%gesture, count = removed.len(), "binding removed");
        BindOutcome::Applied
    }

    /// Removes `gesture` from `event` only, leaving sentinels on other events alone
    fn remove_from_locked(
        &self,
        state: &mut RegistryState,
        event: BindableEvent,
        gesture: &Gesture,
    ) -> BindOutcome {
        let protected = state
            .bindings
            .bindings_for(event)
            .iter()
            .any(|b| b.gesture == *gesture && !b.overridable);
        if protected {
            debug!(%event, %gesture, "refused to remove protected default");
            return BindOutcome::Protected { event };
        }

        if state.bindings.remove_from(event, gesture).is_none() {
            return BindOutcome::Unchanged;
        }

        if let Some(store) = state.store.as_mut() {
            if let Err(e) = store.remove_from(event, gesture) {
                warn!(%event, %gesture, error = %e, "binding removed in memory but not persisted");
            }
        }

        debug!(%event, %gesture, "binding removed");
        BindOutcome::Applied
    }

    fn clear_locked(&self, state: &mut RegistryState, event: BindableEvent) -> BindOutcome {
        let gestures = state.bindings.gestures(event);

        gestures
            .iter()
            .fold(BindOutcome::Unchanged, |outcome, gesture| {
                outcome.and(self.remove_from_locked(state, event, gesture))
            })
    }

    /// Puts `event` back to exactly `previous`
    fn restore_locked(
        &self,
        state: &mut RegistryState,
        event: BindableEvent,
        previous: &[Binding],
    ) {
        for gesture in state.bindings.gestures(event) {
            if !previous.iter().any(|b| b.gesture == gesture) {
                let _ = self.remove_from_locked(state, event, &gesture);
            }
        }

        for binding in previous {
            if !state.bindings.contains(event, &binding.gesture) {
                let _ = self.add_locked(state, event, binding.gesture);
            }
        }
    }
}

impl Default for GestureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
