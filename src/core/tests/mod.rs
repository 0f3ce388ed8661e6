//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Type tests (Key, Modifiers, Gesture, BindableEvent)
//! - Gesture and store-line parsing
//! - Binding collection and its uniqueness index
//! - Conflict detection
//! - Registry operations, persistence and concurrency

#[cfg(test)]
mod registry_tests;
