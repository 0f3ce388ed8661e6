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

//! Live binding storage with O(1) uniqueness checks
//!
//! `BindingCollection` keeps two views of the same data:
//! - event → bindings, in insertion order, for `get_bindings`
//! - gesture → owning event, the reverse index enforcing global uniqueness
//!
//! # Performance
//! - Insert: O(1) average case (plus the event's binding count)
//! - Owner lookup: O(1) average case
//! - Remove: O(k) where k = bindings on the owning event
//!
//! The collection is not synchronised; `GestureRegistry` wraps it in a lock.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::core::types::{BindableEvent, Binding, Gesture};

/// Outcome of a registry mutation
///
/// Conflicts are expected business conditions, not errors, so they are
/// values the caller branches on. [`BindOutcome::is_success`] gives the
/// plain boolean view.
#[must_use]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum BindOutcome {
    /// The mutation took effect
    Applied,
    /// Nothing to do (e.g. removing a gesture nobody holds)
    Unchanged,
    /// The gesture is already bound, possibly to the same event
    AlreadyBound { owner: BindableEvent },
    /// The gesture is a protected default of `event`
    Protected { event: BindableEvent },
}

impl BindOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BindOutcome::Applied | BindOutcome::Unchanged)
    }

    /// Combines two outcomes: the first failure wins
    pub fn and(self, next: BindOutcome) -> BindOutcome {
        match (self.is_success(), next.is_success()) {
            (false, _) => self,
            (true, false) => next,
            (true, true) if self == BindOutcome::Applied || next == BindOutcome::Applied => {
                BindOutcome::Applied
            }
            (true, true) => BindOutcome::Unchanged,
        }
    }
}

impl fmt::Display for BindOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindOutcome::Applied => write!(f, "applied"),
            BindOutcome::Unchanged => write!(f, "unchanged"),
            BindOutcome::AlreadyBound { owner } => write!(f, "already bound to {}", owner),
            BindOutcome::Protected { event } => write!(f, "protected default of {}", event),
        }
    }
}

/// Event → bindings map paired with a gesture → event reverse index
///
/// Invariant: every non-sentinel gesture appears in at most one event's
/// bindings, and `owners` holds exactly those gestures. The sentinel
/// (`Gesture::NONE`) may sit in several events and is never indexed.
#[derive(Debug, Default)]
pub struct BindingCollection {
    by_event: BTreeMap<BindableEvent, Vec<Binding>>,
    owners: HashMap<Gesture, BindableEvent>,
}

impl BindingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a binding unless its gesture is already taken
    ///
    /// Returns the current owner on conflict. For the sentinel the conflict
    /// check is limited to the binding's own event.
    pub fn insert(&mut self, binding: Binding) -> Result<(), BindableEvent> {
        if binding.gesture.is_none() {
            if self.contains(binding.event, &binding.gesture) {
                return Err(binding.event);
            }
        } else if let Some(owner) = self.owners.get(&binding.gesture) {
            return Err(*owner);
        } else {
            self.owners.insert(binding.gesture, binding.event);
        }

        self.by_event.entry(binding.event).or_default().push(binding);
        Ok(())
    }

    /// Removes every binding holding `gesture`
    ///
    /// Real gestures match at most one binding; the sentinel can match one
    /// per event.
    pub fn remove(&mut self, gesture: &Gesture) -> Vec<Binding> {
        let mut removed = Vec::new();

        let events = match self.owners.remove(gesture) {
            Some(owner) => vec![owner],
            None if gesture.is_none() => self.by_event.keys().copied().collect(),
            None => Vec::new(),
        };

        for event in events {
            if let Some(bindings) = self.by_event.get_mut(&event) {
                bindings.retain(|b| {
                    if b.gesture == *gesture {
                        removed.push(*b);
                        false
                    } else {
                        true
                    }
                });

                if bindings.is_empty() {
                    self.by_event.remove(&event);
                }
            }
        }

        removed
    }

    /// Removes `gesture` from `event` only
    pub fn remove_from(&mut self, event: BindableEvent, gesture: &Gesture) -> Option<Binding> {
        let bindings = self.by_event.get_mut(&event)?;
        let index = bindings.iter().position(|b| b.gesture == *gesture)?;
        let removed = bindings.remove(index);

        if bindings.is_empty() {
            self.by_event.remove(&event);
        }
        if !gesture.is_none() {
            self.owners.remove(gesture);
        }

        Some(removed)
    }

    /// Event currently bound to `gesture`
    pub fn owner(&self, gesture: &Gesture) -> Option<BindableEvent> {
        self.owners.get(gesture).copied()
    }

    /// The binding currently holding a real gesture
    pub fn binding(&self, gesture: &Gesture) -> Option<&Binding> {
        let owner = self.owners.get(gesture)?;
        self.by_event
            .get(owner)?
            .iter()
            .find(|b| b.gesture == *gesture)
    }

    pub fn contains(&self, event: BindableEvent, gesture: &Gesture) -> bool {
        self.by_event
            .get(&event)
            .map(|bindings| bindings.iter().any(|b| b.gesture == *gesture))
            .unwrap_or(false)
    }

    /// Snapshot of the gestures bound to `event`
    pub fn gestures(&self, event: BindableEvent) -> BTreeSet<Gesture> {
        self.by_event
            .get(&event)
            .map(|bindings| bindings.iter().map(|b| b.gesture).collect())
            .unwrap_or_default()
    }

    /// Bindings of `event` in insertion order
    pub fn bindings_for(&self, event: BindableEvent) -> &[Binding] {
        self.by_event
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All bindings, grouped by event
    pub fn iter(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.by_event.values().flatten()
    }

    /// Total number of bindings, sentinels included
    pub fn len(&self) -> usize {
        self.by_event.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }
}
