// Copyright 2025 bakri (tidynest@proton.me)
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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the fundamental data structures and algorithms
//! for gesture binding management, including:
//! - Type definitions for keys, modifiers, gestures and bindings
//! - The factory-default catalog and its protected entries
//! - The live binding collection with its uniqueness index
//! - The thread-safe registry that owns it
//! - Gesture and store-line parsing
//! - Offline conflict detection for hand-edited stores
//!
//! Nothing here touches a display server; the only I/O is delegated to a
//! `BindingStore` injected at initialization.

pub mod collection;
pub mod conflict;
pub mod defaults;
pub mod parser;
pub mod registry;
pub mod types;

pub use collection::{BindOutcome, BindingCollection};
pub use conflict::{Claim, ClaimSource, Conflict, ConflictDetector};
pub use defaults::DefaultBindingSet;
pub use registry::{GestureRegistry, RegistryError};
pub use types::*;

#[cfg(test)]
mod tests;
