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

//! Summary of a registry load
//!
//! Carried by the `Loaded` notification so subscribers (a log panel, a
//! startup toast) can show what was restored and what was dropped.

use serde::Serialize;
use std::fmt;

use crate::core::types::Binding;

/// Why an entry did not make it into the registry
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LoadIssue {
    pub message: String,
}

/// What initialization loaded
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Number of factory defaults inserted
    pub defaults_loaded: usize,
    /// Bindings restored from the store, in load order
    pub restored: Vec<Binding>,
    /// Entries that were skipped (malformed, conflicting, unreadable store)
    pub skipped: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_issues(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn add_skipped(&mut self, message: String) {
        self.skipped.push(LoadIssue { message });
    }

    pub fn record_restored(&mut self, binding: Binding) {
        self.restored.push(binding);
    }

    /// One line per fact, suitable for a log view
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Loaded {} default bindings", self.defaults_loaded)];

        lines.extend(self.restored.iter().map(|b| format!("Restored {}", b)));
        lines.extend(self.skipped.iter().map(|issue| format!("Skipped: {}", issue.message)));

        lines
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} defaults, {} restored, {} skipped",
            self.defaults_loaded,
            self.restored.len(),
            self.skipped.len()
        )
    }
}
