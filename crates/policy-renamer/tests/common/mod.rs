//! Shared test utilities for policy-renamer integration tests.
//!
//! This module provides:
//! - `TestHarness` for running sessions against temp directories
//! - `PdfBuilder` for generating small PDFs with a text layer
//! - Stub collaborators (gated extractors, failing archive builders)

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{archive_entry, archive_names, TestHarness};
