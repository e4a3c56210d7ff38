//!
//! Utilities and helpers for cross-component testing.
//!

mod golden;

pub use mock::*;
