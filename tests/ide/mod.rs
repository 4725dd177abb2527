//! IDE layer tests
//!
//! Tests for the file-driven analysis host:
//! - Multi-file compilations and incremental updates
//! - Diagnostics mapped back to files and positions
