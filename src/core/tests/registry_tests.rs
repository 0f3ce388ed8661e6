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

//! Registry tests
//!
//! Covers the mutation contract (add, remove, clear, set, update), protected
//! defaults, initialization and its notifications, store synchronisation
//! (including a failing store) and concurrent access.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::core::collection::BindOutcome;
use crate::core::defaults::DefaultBindingSet;
use crate::core::registry::{GestureRegistry, RegistryError};
use crate::core::types::{BindableEvent, Binding, Gesture, Key, Modifiers};
use crate::events::{BindingNotification, ChannelPublisher, EventPublisher, TracingPublisher};
use crate::input::WindowId;
use crate::store::{BindingStore, MemoryStore, StoreContents, StoreError, StoreMap};

use BindableEvent::{DecreaseVolume, IncreaseVolume, ToggleFullscreen, ToggleVolumeMute};

/// Helper: registry with the standard defaults loaded and no store
fn standard_registry() -> GestureRegistry {
    let registry = GestureRegistry::new();
    assert!(registry.initialize(Arc::new(TracingPublisher), None));
    registry
}

/// Helper: registry with no defaults at all
fn empty_registry() -> GestureRegistry {
    let registry = GestureRegistry::with_defaults(DefaultBindingSet::empty());
    assert!(registry.initialize(Arc::new(TracingPublisher), None));
    registry
}

/// Helper: registry backed by a shared memory store the test can inspect
fn registry_with_store(store: MemoryStore) -> (GestureRegistry, Arc<Mutex<MemoryStore>>) {
    let shared = store.shared();
    let registry = GestureRegistry::new();
    registry.initialize(Arc::new(TracingPublisher), Some(Box::new(Arc::clone(&shared))));
    (registry, shared)
}

fn set(gestures: &[Gesture]) -> BTreeSet<Gesture> {
    gestures.iter().copied().collect()
}

fn ctrl(key: Key) -> Gesture {
    Gesture::new(key, Modifiers::CONTROL)
}

fn drain(rx: &Receiver<BindingNotification>) -> Vec<BindingNotification> {
    rx.try_iter().collect()
}

/// Store whose every operation fails
struct BrokenStore;

impl BindingStore for BrokenStore {
    fn load(&mut self) -> Result<StoreContents, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }

    fn append_unique(&mut self, _: BindableEvent, _: Gesture) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }

    fn remove_gesture(&mut self, _: &Gesture) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }

    fn remove_from(&mut self, _: BindableEvent, _: &Gesture) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }

    fn snapshot(&self) -> StoreMap {
        StoreMap::new()
    }
}

// ============================================================================
// Add / Lookup
// ============================================================================

#[test]
fn test_add_then_duplicate_rejected() {
    let registry = empty_registry();
    let f11 = Gesture::key(Key::F11);

    assert_eq!(registry.add_binding(ToggleFullscreen, f11), BindOutcome::Applied);
    assert_eq!(
        registry.add_binding(IncreaseVolume, f11),
        BindOutcome::AlreadyBound { owner: ToggleFullscreen }
    );

    assert_eq!(registry.lookup(&f11), Some(ToggleFullscreen));
    assert!(registry.get_bindings(IncreaseVolume).is_empty());
}

#[test]
fn test_add_same_gesture_to_same_event_rejected() {
    let registry = empty_registry();
    let m = Gesture::key(Key::M);

    assert!(registry.add_binding(ToggleVolumeMute, m).is_success());
    assert!(!registry.add_binding(ToggleVolumeMute, m).is_success());
    assert_eq!(registry.get_bindings(ToggleVolumeMute), set(&[m]));
}

#[test]
fn test_lookup_unbound_is_none() {
    let registry = standard_registry();

    assert_eq!(registry.lookup(&ctrl(Key::Q)), None);
    assert!(!registry.is_registered(&ctrl(Key::Q)));
    assert!(registry.is_key_registered(Key::F11, Modifiers::NONE));
    assert!(!registry.is_key_registered(Key::F11, Modifiers::SHIFT));
}

#[test]
fn test_get_bindings_is_a_snapshot() {
    let registry = standard_registry();

    let mut snapshot = registry.get_bindings(IncreaseVolume);
    snapshot.insert(ctrl(Key::Up));

    assert_eq!(
        registry.get_bindings(IncreaseVolume),
        set(&[Gesture::key(Key::PageUp)])
    );
}

// ============================================================================
// Defaults and protection
// ============================================================================

#[test]
fn test_defaults_loaded_on_initialize() {
    let registry = standard_registry();

    assert_eq!(
        registry.get_bindings(ToggleFullscreen),
        set(&[Gesture::key(Key::F11), Gesture::new(Key::Enter, Modifiers::ALT)])
    );
    assert_eq!(registry.bindings().len(), DefaultBindingSet::standard().len());
}

#[test]
fn test_protected_default_cannot_be_removed() {
    let registry = standard_registry();
    let f11 = Gesture::key(Key::F11);

    assert_eq!(
        registry.remove_binding(&f11),
        BindOutcome::Protected { event: ToggleFullscreen }
    );
    assert!(registry.get_bindings(ToggleFullscreen).contains(&f11));
}

#[test]
fn test_overridable_default_can_be_removed() {
    let registry = standard_registry();
    let page_up = Gesture::key(Key::PageUp);

    assert_eq!(registry.remove_binding(&page_up), BindOutcome::Applied);
    assert_eq!(registry.lookup(&page_up), None);
}

#[test]
fn test_protected_default_stays_bound_when_readded_elsewhere() {
    let registry = standard_registry();

    assert_eq!(
        registry.add_binding(IncreaseVolume, Gesture::key(Key::VolumeMute)),
        BindOutcome::AlreadyBound { owner: ToggleVolumeMute }
    );
}

#[test]
fn test_bindings_report_overridable_flag() {
    let registry = standard_registry();

    let f11 = registry
        .bindings()
        .into_iter()
        .find(|b| b.gesture == Gesture::key(Key::F11))
        .unwrap();
    assert!(!f11.overridable);

    assert!(registry.add_binding(IncreaseVolume, ctrl(Key::Up)).is_success());
    let added = registry
        .bindings()
        .into_iter()
        .find(|b| b.gesture == ctrl(Key::Up))
        .unwrap();
    assert_eq!(added, Binding::new(IncreaseVolume, ctrl(Key::Up), true));
}

// ============================================================================
// Remove / Clear
// ============================================================================

#[test]
fn test_remove_unregistered_is_success() {
    let registry = standard_registry();

    let outcome = registry.remove_binding(&ctrl(Key::Z));

    assert_eq!(outcome, BindOutcome::Unchanged);
    assert!(outcome.is_success());
}

#[test]
fn test_clear_removes_all_overridable() {
    let registry = standard_registry();
    assert!(registry.add_binding(IncreaseVolume, ctrl(Key::Up)).is_success());

    assert_eq!(registry.clear_bindings(IncreaseVolume), BindOutcome::Applied);
    assert!(registry.get_bindings(IncreaseVolume).is_empty());
}

#[test]
fn test_clear_keeps_partial_effect_with_protected_default() {
    let registry = standard_registry();

    let outcome = registry.clear_bindings(ToggleFullscreen);

    assert_eq!(outcome, BindOutcome::Protected { event: ToggleFullscreen });
    // ALT+Enter went, F11 stayed
    assert_eq!(
        registry.get_bindings(ToggleFullscreen),
        set(&[Gesture::key(Key::F11)])
    );
}

#[test]
fn test_clear_unbound_event_is_unchanged() {
    let registry = empty_registry();
    assert_eq!(registry.clear_bindings(DecreaseVolume), BindOutcome::Unchanged);
}

// ============================================================================
// Set
// ============================================================================

#[test]
fn test_set_binding_replaces_overridable_default() {
    let registry = standard_registry();
    let ctrl_up = ctrl(Key::Up);

    assert!(registry.set_binding(IncreaseVolume, ctrl_up).is_success());

    assert_eq!(registry.get_bindings(IncreaseVolume), set(&[ctrl_up]));
    assert_eq!(registry.lookup(&Gesture::key(Key::PageUp)), None);
}

#[test]
fn test_set_key_binding() {
    let registry = standard_registry();

    assert!(registry
        .set_key_binding(DecreaseVolume, Key::Down, Modifiers::CONTROL)
        .is_success());
    assert_eq!(registry.get_bindings(DecreaseVolume), set(&[ctrl(Key::Down)]));
}

#[test]
fn test_set_binding_to_sentinel_unbinds() {
    let registry = standard_registry();

    assert!(registry.set_binding(IncreaseVolume, Gesture::NONE).is_success());

    assert_eq!(registry.get_bindings(IncreaseVolume), set(&[Gesture::NONE]));
    assert_eq!(registry.lookup(&Gesture::NONE), None);
    assert_eq!(registry.lookup(&Gesture::key(Key::PageUp)), None);
}

#[test]
fn test_set_binding_rolls_back_on_duplicate() {
    let registry = standard_registry();

    // M belongs to ToggleVolumeMute
    let outcome = registry.set_binding(IncreaseVolume, Gesture::key(Key::M));

    assert_eq!(outcome, BindOutcome::AlreadyBound { owner: ToggleVolumeMute });
    assert_eq!(
        registry.get_bindings(IncreaseVolume),
        set(&[Gesture::key(Key::PageUp)])
    );
}

#[test]
fn test_set_binding_refused_on_protected_event() {
    let registry = standard_registry();
    let before = registry.get_bindings(ToggleFullscreen);

    let outcome = registry.set_binding(ToggleFullscreen, ctrl(Key::F));

    assert_eq!(outcome, BindOutcome::Protected { event: ToggleFullscreen });
    assert_eq!(registry.get_bindings(ToggleFullscreen), before);
    assert_eq!(registry.lookup(&ctrl(Key::F)), None);
}

#[test]
fn test_set_bindings_many_is_all_or_nothing() {
    let registry = standard_registry();
    let gestures = [ctrl(Key::Up), Gesture::key(Key::F11), ctrl(Key::K)];

    let outcome = registry.set_bindings(IncreaseVolume, gestures);

    assert_eq!(outcome, BindOutcome::AlreadyBound { owner: ToggleFullscreen });
    assert_eq!(
        registry.get_bindings(IncreaseVolume),
        set(&[Gesture::key(Key::PageUp)])
    );
    assert_eq!(registry.lookup(&ctrl(Key::Up)), None);
    assert_eq!(registry.lookup(&ctrl(Key::K)), None);
}

#[test]
fn test_set_bindings_many() {
    let registry = standard_registry();
    let gestures = [ctrl(Key::Up), Gesture::key(Key::VolumeUp)];

    assert_eq!(registry.set_bindings(IncreaseVolume, gestures), BindOutcome::Applied);
    assert_eq!(registry.get_bindings(IncreaseVolume), set(&gestures));
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn test_update_missing_old_binding_is_error() {
    let registry = standard_registry();
    let before = registry.bindings();

    let result = registry.update_binding(
        DecreaseVolume,
        ctrl(Key::Down),
        Some(Gesture::new(Key::Down, Modifiers::SHIFT)),
    );

    assert_eq!(
        result,
        Err(RegistryError::UnknownBinding {
            event: DecreaseVolume,
            gesture: ctrl(Key::Down),
        })
    );
    assert_eq!(registry.bindings(), before);
}

#[test]
fn test_update_gesture_owned_by_other_event_is_error() {
    let registry = standard_registry();

    // PageUp exists, but on IncreaseVolume
    let result = registry.update_binding(DecreaseVolume, Gesture::key(Key::PageUp), None);

    assert!(matches!(result, Err(RegistryError::UnknownBinding { .. })));
}

#[test]
fn test_update_replaces_gesture() {
    let registry = standard_registry();
    let page_down = Gesture::key(Key::PageDown);
    let ctrl_down = ctrl(Key::Down);

    let outcome = registry
        .update_binding(DecreaseVolume, page_down, Some(ctrl_down))
        .unwrap();

    assert_eq!(outcome, BindOutcome::Applied);
    assert_eq!(registry.get_bindings(DecreaseVolume), set(&[ctrl_down]));
}

#[test]
fn test_update_to_none_keeps_size() {
    let registry = standard_registry();
    let before = registry.get_bindings(ToggleVolumeMute).len();

    let outcome = registry
        .update_binding(ToggleVolumeMute, Gesture::key(Key::M), None)
        .unwrap();

    assert!(outcome.is_success());
    let after = registry.get_bindings(ToggleVolumeMute);
    assert_eq!(after.len(), before);
    assert!(after.contains(&Gesture::NONE));
    assert!(!after.contains(&Gesture::key(Key::M)));
}

#[test]
fn test_update_restores_old_gesture_on_duplicate() {
    let registry = standard_registry();
    let page_down = Gesture::key(Key::PageDown);

    let outcome = registry
        .update_binding(DecreaseVolume, page_down, Some(Gesture::key(Key::F11)))
        .unwrap();

    assert_eq!(outcome, BindOutcome::AlreadyBound { owner: ToggleFullscreen });
    assert_eq!(registry.get_bindings(DecreaseVolume), set(&[page_down]));
}

#[test]
fn test_update_protected_default_refused() {
    let registry = standard_registry();

    let outcome = registry
        .update_binding(ToggleFullscreen, Gesture::key(Key::F11), Some(Gesture::key(Key::F12)))
        .unwrap();

    assert_eq!(outcome, BindOutcome::Protected { event: ToggleFullscreen });
    assert_eq!(registry.lookup(&Gesture::key(Key::F12)), None);
}

#[test]
fn test_sentinel_on_one_event_survives_update_of_another() {
    let registry = standard_registry();
    assert!(registry.set_binding(IncreaseVolume, Gesture::NONE).is_success());
    assert!(registry.set_binding(DecreaseVolume, Gesture::NONE).is_success());

    assert!(registry
        .update_binding(IncreaseVolume, Gesture::NONE, Some(ctrl(Key::Up)))
        .unwrap()
        .is_success());

    assert_eq!(registry.get_bindings(IncreaseVolume), set(&[ctrl(Key::Up)]));
    assert_eq!(registry.get_bindings(DecreaseVolume), set(&[Gesture::NONE]));
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_initialize_runs_once() {
    let registry = GestureRegistry::new();
    assert!(!registry.is_initialized());

    assert!(registry.initialize(Arc::new(TracingPublisher), None));
    assert!(!registry.initialize(Arc::new(TracingPublisher), None));
    assert!(registry.is_initialized());
    assert_eq!(registry.bindings().len(), DefaultBindingSet::standard().len());
}

#[test]
fn test_initialize_publishes_loading_then_loaded() {
    let (publisher, rx) = ChannelPublisher::new();
    let store = MemoryStore::with_bindings([(IncreaseVolume, ctrl(Key::Up))]);
    let registry = GestureRegistry::new();

    registry.initialize(Arc::new(publisher), Some(Box::new(store)));

    let notifications = drain(&rx);
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0], BindingNotification::Loading);

    let BindingNotification::Loaded(report) = &notifications[1] else {
        panic!("expected Loaded, got {:?}", notifications[1]);
    };
    assert_eq!(report.defaults_loaded, DefaultBindingSet::standard().len());
    assert_eq!(
        report.restored,
        vec![Binding::new(IncreaseVolume, ctrl(Key::Up), true)]
    );
    assert!(!report.has_issues());
}

#[test]
fn test_concurrent_initialize_first_caller_wins() {
    let registry = Arc::new(GestureRegistry::new());
    let (publisher, rx) = ChannelPublisher::new();
    let publisher: Arc<dyn EventPublisher> = Arc::new(publisher);
    let barrier = Arc::new(Barrier::new(8));

    let handles = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let publisher = Arc::clone(&publisher);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.initialize(publisher, None)
            })
        })
        .collect::<Vec<_>>();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(drain(&rx).len(), 2);
    assert_eq!(registry.bindings().len(), DefaultBindingSet::standard().len());
}

#[test]
fn test_store_augments_defaults() {
    let store = MemoryStore::with_bindings([
        (IncreaseVolume, ctrl(Key::Up)),
        (DecreaseVolume, ctrl(Key::Down)),
    ]);
    let (registry, _) = registry_with_store(store);

    assert_eq!(
        registry.get_bindings(IncreaseVolume),
        set(&[Gesture::key(Key::PageUp), ctrl(Key::Up)])
    );
    assert_eq!(registry.lookup(&ctrl(Key::Down)), Some(DecreaseVolume));
}

#[test]
fn test_conflicting_store_entry_skipped() {
    let (publisher, rx) = ChannelPublisher::new();
    let store = MemoryStore::with_bindings([
        (IncreaseVolume, Gesture::key(Key::F11)),
        (IncreaseVolume, ctrl(Key::Up)),
    ]);
    let registry = GestureRegistry::new();

    registry.initialize(Arc::new(publisher), Some(Box::new(store)));

    assert_eq!(registry.lookup(&Gesture::key(Key::F11)), Some(ToggleFullscreen));
    assert_eq!(registry.lookup(&ctrl(Key::Up)), Some(IncreaseVolume));

    let loaded = drain(&rx).pop().unwrap();
    let BindingNotification::Loaded(report) = loaded else {
        panic!("expected Loaded");
    };
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].message.contains("F11"));
}

#[test]
fn test_stored_copy_of_default_not_duplicated() {
    let store = MemoryStore::with_bindings([(ToggleFullscreen, Gesture::key(Key::F11))]);
    let (registry, _) = registry_with_store(store);

    assert_eq!(registry.bindings().len(), DefaultBindingSet::standard().len());
}

#[test]
fn test_unreadable_store_still_initializes() {
    let (publisher, rx) = ChannelPublisher::new();
    let registry = GestureRegistry::new();

    assert!(registry.initialize(Arc::new(publisher), Some(Box::new(BrokenStore))));

    assert!(registry.is_initialized());
    assert!(registry.is_key_registered(Key::F11, Modifiers::NONE));

    let BindingNotification::Loaded(report) = drain(&rx).pop().unwrap() else {
        panic!("expected Loaded");
    };
    assert!(report.has_issues());
}

#[test]
fn test_publisher_may_query_registry() {
    struct QueryingPublisher {
        registry: Arc<GestureRegistry>,
        seen: Mutex<Vec<usize>>,
    }

    impl EventPublisher for QueryingPublisher {
        fn publish(&self, notification: BindingNotification) {
            if let BindingNotification::Loaded(_) = notification {
                self.seen.lock().push(self.registry.bindings().len());
            }
        }
    }

    let registry = Arc::new(GestureRegistry::new());
    let publisher = Arc::new(QueryingPublisher {
        registry: Arc::clone(&registry),
        seen: Mutex::new(Vec::new()),
    });

    registry.initialize(publisher.clone(), None);

    assert_eq!(*publisher.seen.lock(), vec![DefaultBindingSet::standard().len()]);
}

#[test]
fn test_mutations_before_initialize_are_kept() {
    let registry = GestureRegistry::new();
    assert!(registry.add_binding(IncreaseVolume, Gesture::key(Key::F11)).is_success());

    let (publisher, rx) = ChannelPublisher::new();
    registry.initialize(Arc::new(publisher), None);

    assert_eq!(registry.lookup(&Gesture::key(Key::F11)), Some(IncreaseVolume));
    let BindingNotification::Loaded(report) = drain(&rx).pop().unwrap() else {
        panic!("expected Loaded");
    };
    assert_eq!(report.defaults_loaded, DefaultBindingSet::standard().len() - 1);
}

// ============================================================================
// Store synchronisation
// ============================================================================

#[test]
fn test_add_writes_through_to_store() {
    let (registry, store) = registry_with_store(MemoryStore::new());

    assert!(registry.add_binding(IncreaseVolume, ctrl(Key::Up)).is_success());

    assert_eq!(store.lock().snapshot()[&IncreaseVolume], vec![ctrl(Key::Up)]);
}

#[test]
fn test_defaults_not_written_to_store_at_load() {
    let (_registry, store) = registry_with_store(MemoryStore::new());
    assert!(store.lock().snapshot().is_empty());
}

#[test]
fn test_remove_and_set_write_through_to_store() {
    let store = MemoryStore::with_bindings([(IncreaseVolume, ctrl(Key::Up))]);
    let (registry, store) = registry_with_store(store);

    assert!(registry.set_binding(IncreaseVolume, ctrl(Key::K)).is_success());

    let snapshot = store.lock().snapshot();
    assert_eq!(snapshot[&IncreaseVolume], vec![ctrl(Key::K)]);

    assert!(registry.remove_binding(&ctrl(Key::K)).is_success());
    assert!(store.lock().snapshot().is_empty());
}

#[test]
fn test_failed_set_leaves_store_as_it_was() {
    let store = MemoryStore::with_bindings([(IncreaseVolume, ctrl(Key::Up))]);
    let (registry, store) = registry_with_store(store);

    let outcome = registry.set_bindings(IncreaseVolume, [ctrl(Key::K), Gesture::key(Key::M)]);

    assert!(!outcome.is_success());
    let after = store.lock().snapshot();
    assert!(after[&IncreaseVolume].contains(&ctrl(Key::Up)));
    assert!(!after[&IncreaseVolume].contains(&ctrl(Key::K)));
}

#[test]
fn test_store_failures_are_swallowed() {
    let registry = GestureRegistry::new();
    registry.initialize(Arc::new(TracingPublisher), Some(Box::new(BrokenStore)));

    assert_eq!(registry.add_binding(IncreaseVolume, ctrl(Key::Up)), BindOutcome::Applied);
    assert_eq!(registry.remove_binding(&ctrl(Key::Up)), BindOutcome::Applied);
    assert!(registry.set_binding(DecreaseVolume, ctrl(Key::Down)).is_success());
    assert_eq!(registry.lookup(&ctrl(Key::Down)), Some(DecreaseVolume));
}

#[test]
fn test_in_memory_changes_not_recovered_without_store() {
    let registry = standard_registry();
    assert!(registry.set_binding(IncreaseVolume, ctrl(Key::Up)).is_success());

    let fresh = standard_registry();

    assert_eq!(fresh.lookup(&ctrl(Key::Up)), None);
    assert_eq!(
        fresh.get_bindings(IncreaseVolume),
        set(&[Gesture::key(Key::PageUp)])
    );
}

#[test]
fn test_store_changes_recovered_by_fresh_registry() {
    let (registry, store) = registry_with_store(MemoryStore::new());
    assert!(registry.set_binding(IncreaseVolume, ctrl(Key::Up)).is_success());

    let reloaded = MemoryStore::with_bindings(
        store
            .lock()
            .snapshot()
            .into_iter()
            .flat_map(|(event, gestures)| gestures.into_iter().map(move |g| (event, g))),
    );
    let (fresh, _) = registry_with_store(reloaded);

    assert_eq!(fresh.lookup(&ctrl(Key::Up)), Some(IncreaseVolume));
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn test_activate_publishes_for_bound_gesture() {
    let (publisher, rx) = ChannelPublisher::new();
    let registry = GestureRegistry::new();
    registry.initialize(Arc::new(publisher), None);
    drain(&rx);

    assert_eq!(
        registry.activate(&Gesture::key(Key::F11), WindowId(7)),
        Some(ToggleFullscreen)
    );
    assert_eq!(registry.activate(&ctrl(Key::Q), WindowId(7)), None);

    let notifications = drain(&rx);
    assert_eq!(notifications.len(), 1);
    let BindingNotification::Activated(activation) = &notifications[0] else {
        panic!("expected Activated");
    };
    assert_eq!(activation.event, ToggleFullscreen);
    assert_eq!(activation.window, WindowId(7));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_disjoint_adds_all_succeed() {
    let registry = Arc::new(empty_registry());
    let plan = [
        (ToggleFullscreen, [Key::A, Key::B, Key::C, Key::D]),
        (IncreaseVolume, [Key::E, Key::F, Key::G, Key::H]),
        (DecreaseVolume, [Key::I, Key::J, Key::K, Key::L]),
        (ToggleVolumeMute, [Key::M, Key::N, Key::O, Key::P]),
    ];

    let handles = plan
        .iter()
        .map(|(event, keys)| {
            let registry = Arc::clone(&registry);
            let (event, keys) = (*event, *keys);
            thread::spawn(move || {
                for key in keys {
                    for mods in [Modifiers::NONE, Modifiers::SHIFT, Modifiers::CONTROL] {
                        if !registry.add_binding(event, Gesture::new(key, mods)).is_success() {
                            return false;
                        }
                    }
                }
                true
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(registry.bindings().len(), 4 * 12);
    for (event, keys) in plan {
        for key in keys {
            assert_eq!(registry.lookup(&Gesture::key(key)), Some(event));
        }
    }
}

#[test]
fn test_concurrent_adds_of_same_gesture_only_one_wins() {
    let registry = Arc::new(empty_registry());
    let barrier = Arc::new(Barrier::new(BindableEvent::ALL.len()));
    let contested = ctrl(Key::X);

    let handles = BindableEvent::ALL
        .into_iter()
        .map(|event| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.add_binding(event, contested).is_success()
            })
        })
        .collect::<Vec<_>>();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    let owner = registry.lookup(&contested).unwrap();
    let holders = BindableEvent::ALL
        .into_iter()
        .filter(|event| registry.get_bindings(*event).contains(&contested))
        .collect::<Vec<_>>();
    assert_eq!(holders, vec![owner]);
}
