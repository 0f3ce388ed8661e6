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

//! Offline conflict detection for stored bindings
//!
//! The registry never holds a conflict: it rejects the second claim on a
//! gesture. A store file edited by hand can still contain one, and the
//! registry would silently skip the losing entry at load time. This module
//! audits raw claims (defaults plus store lines) so the CLI can report them
//! up front.
//!
//! # Performance
//! - Add claim: O(1) average case
//! - List all conflicts: O(n log n) where n = number of unique gestures

use std::collections::HashMap;
use std::fmt;

use crate::core::defaults::DefaultBindingSet;
use crate::core::types::{BindableEvent, Gesture};

/// Where a claim on a gesture came from
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClaimSource {
    /// Factory default; `protected` mirrors `!overridable`
    Default { protected: bool },
    /// Store file entry with its 1-based line number
    Store { line: usize },
}

impl fmt::Display for ClaimSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimSource::Default { protected: true } => write!(f, "protected default"),
            ClaimSource::Default { protected: false } => write!(f, "default"),
            ClaimSource::Store { line } => write!(f, "store line {}", line),
        }
    }
}

/// One event's claim on a gesture
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Claim {
    pub event: BindableEvent,
    pub source: ClaimSource,
}

/// A gesture claimed by two or more distinct events
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    pub gesture: Gesture,
    /// Claims in the order they were added; the first one wins at load time
    pub claims: Vec<Claim>,
}

/// Detects gestures claimed by more than one event
#[derive(Debug, Default)]
pub struct ConflictDetector {
    claims: HashMap<Gesture, Vec<Claim>>,
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every entry of a default catalog
    pub fn add_defaults(&mut self, defaults: &DefaultBindingSet) {
        for binding in defaults.iter() {
            self.add_claim(
                binding.event,
                binding.gesture,
                ClaimSource::Default {
                    protected: !binding.overridable,
                },
            );
        }
    }

    /// Records a claim. The sentinel gesture never conflicts and is ignored.
    pub fn add_claim(&mut self, event: BindableEvent, gesture: Gesture, source: ClaimSource) {
        if gesture.is_none() {
            return;
        }

        self.claims
            .entry(gesture)
            .or_default()
            .push(Claim { event, source });
    }

    /// Finds every gesture claimed by two or more distinct events, ordered by gesture
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = self
            .claims
            .iter()
            .filter(|(_, claims)| Self::distinct_events(claims) > 1)
            .map(|(gesture, claims)| Conflict {
                gesture: *gesture,
                claims: claims.clone(),
            })
            .collect::<Vec<_>>();

        conflicts.sort_by_key(|c| c.gesture);
        conflicts
    }

    pub fn has_conflict(&self, gesture: &Gesture) -> bool {
        self.claims
            .get(gesture)
            .map(|claims| Self::distinct_events(claims) > 1)
            .unwrap_or(false)
    }

    /// Total number of claims recorded
    pub fn total_claims(&self) -> usize {
        self.claims.values().map(Vec::len).sum()
    }

    fn distinct_events(claims: &[Claim]) -> usize {
        let mut events = claims.iter().map(|c| c.event).collect::<Vec<_>>();
        events.sort();
        events.dedup();
        events.len()
    }
}
