//! Nullable infrastructure for deterministic testing.
//!
//! The stake store is abstracted behind a trait; this crate provides a
//! test-friendly implementation that returns deterministic values, can be
//! controlled programmatically (including injected backend failures), and
//! never touches the filesystem.
//!
//! Usage: swap the real implementation for the nullable in tests.

pub mod store;

pub use store::NullStakeStore;
