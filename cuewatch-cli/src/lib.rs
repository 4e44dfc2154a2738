//! Library target for the `cuewatch` package.
//!
//! The primary deliverable of this package is the `cuewatch` CLI binary
//! (`src/main.rs`). This library exists so CI can run `cargo test -p cuewatch --doc`
//! for feature/doctype validation.

#[doc(hidden)]
pub use cuewatch_engine;
