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

//! Gesture Binding Manager
//!
//! A thread-safe registry mapping application commands ("bindable events")
//! to keyboard gestures, with protected factory defaults and a durable store.
//!
//! # Features
//!
//! - **Global Uniqueness:** A gesture triggers at most one event, ever
//! - **Protected Defaults:** Factory bindings that cannot be removed
//! - **Store Synchronisation:** Every successful change is written through
//! - **Atomic Operations:** Safe file writes with timestamped backups
//! - **Conflict Audit:** Offline check of hand-edited store files
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, defaults, registry, parser, conflicts)
//! - **`store`:** Durable storage (memory and file backends, atomic writes)
//! - **`events`:** Outgoing notifications (loading, loaded, activated)
//! - **`input`:** Routing key presses from monitored windows to the registry
//!
//! # Examples
//!
//! ## Rebinding an event
//!
//! ```
//! use std::sync::Arc;
//! use gesture_binding_manager::core::{BindableEvent, Gesture, GestureRegistry, Key, Modifiers};
//! use gesture_binding_manager::events::TracingPublisher;
//! use gesture_binding_manager::store::MemoryStore;
//!
//! let registry = GestureRegistry::new();
//! registry.initialize(Arc::new(TracingPublisher), Some(Box::new(MemoryStore::new())));
//!
//! let ctrl_up = Gesture::new(Key::Up, Modifiers::CONTROL);
//! assert!(registry.set_binding(BindableEvent::IncreaseVolume, ctrl_up).is_success());
//! assert_eq!(registry.lookup(&ctrl_up), Some(BindableEvent::IncreaseVolume));
//! ```
//!
//! ## Persisting to a file
//!
//! ```no_run
//! use std::sync::Arc;
//! use gesture_binding_manager::core::GestureRegistry;
//! use gesture_binding_manager::events::TracingPublisher;
//! use gesture_binding_manager::store::FileStore;
//!
//! let store = FileStore::open("/tmp/gesture-bindings/bindings.conf".into())?;
//! let registry = GestureRegistry::new();
//! registry.initialize(Arc::new(TracingPublisher), Some(Box::new(store)));
//! # Ok::<(), gesture_binding_manager::store::StoreError>(())
//! ```

pub mod core;
pub mod events;
pub mod input;
pub mod store;

// Re-export commonly used types for convenience
pub use core::{BindOutcome, BindableEvent, Binding, Gesture, GestureRegistry, Key, Modifiers};
