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

//! Factory-default bindings
//!
//! The catalog is fixed at build time. Entries flagged non-overridable are
//! protected: the registry refuses to remove or replace them.

use crate::core::types::{BindableEvent, Binding, Gesture, Key, Modifiers};

/// Static catalog of factory-default bindings
#[derive(Debug)]
pub struct DefaultBindingSet {
    bindings: &'static [Binding],
}

const STANDARD_BINDINGS: &[Binding] = &[
    Binding::new(BindableEvent::ToggleFullscreen, Gesture::key(Key::F11), false),
    Binding::new(
        BindableEvent::ToggleFullscreen,
        Gesture::new(Key::Enter, Modifiers::ALT),
        true,
    ),
    Binding::new(BindableEvent::IncreaseVolume, Gesture::key(Key::PageUp), true),
    Binding::new(BindableEvent::DecreaseVolume, Gesture::key(Key::PageDown), true),
    Binding::new(BindableEvent::ToggleVolumeMute, Gesture::key(Key::VolumeMute), false),
    Binding::new(BindableEvent::ToggleVolumeMute, Gesture::key(Key::M), true),
];

static STANDARD: DefaultBindingSet = DefaultBindingSet::new(STANDARD_BINDINGS);

static EMPTY: DefaultBindingSet = DefaultBindingSet::new(&[]);

impl DefaultBindingSet {
    pub const fn new(bindings: &'static [Binding]) -> Self {
        Self { bindings }
    }

    /// The application's factory defaults
    pub fn standard() -> &'static DefaultBindingSet {
        &STANDARD
    }

    /// A catalog with no defaults at all
    pub fn empty() -> &'static DefaultBindingSet {
        &EMPTY
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter()
    }

    /// True if (event, gesture) is a non-overridable default
    pub fn is_protected(&self, event: BindableEvent, gesture: &Gesture) -> bool {
        self.bindings
            .iter()
            .any(|b| !b.overridable && b.event == event && b.gesture == *gesture)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
