//! ironchan/crates/integration-tests/src/lib.rs
//!
//! Shared fixtures for the cross-crate test suite.

pub mod fixtures;
