//! Shared helpers for integration tests.

pub mod compilation_helpers;
