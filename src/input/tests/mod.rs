//! Input module tests
//!
//! Contains test suites for key-press routing:
//! - Window monitoring and activation through the registry
