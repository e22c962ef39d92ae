#![deny(missing_docs)]

//! # Declaration Patching
//!
//! Finds `public interface` / `public class` headers in C# source text and
//! inserts a marker attribute directly above them, at most once.
//!
//! Matching is textual: a header is recognised only when it is the first text
//! on its line and not inside a block comment. The patcher does not parse the
//! language beyond that.
//!
//! - **declarations**: Targets, search outcomes and the insertion itself.

pub(crate) mod common;

/// Target description, lookup and insertion.
pub mod declarations;

pub use declarations::{
    locate, patch, patch_bytes, patch_with, DeclarationKind, DeclarationTarget, MatchResult,
    PatchOptions, Patched, DEFAULT_LOOKBACK,
};
