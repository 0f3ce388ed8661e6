//! Store module tests
//!
//! Contains test suites for the binding stores:
//! - Memory store mapping semantics
//! - File store reads, atomic writes and backups
