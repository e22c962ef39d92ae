#![deny(missing_docs)]

//! # Deprecator Core
//!
//! Text-level patcher that marks C# interfaces and classes as deprecated by
//! inserting an attribute line above their declaration, idempotently and
//! without touching any other byte of the file.

/// Shared error types.
pub mod error;

/// Line-preserving source buffers.
pub mod buffer;

/// Marker attributes (rendering and detection).
pub mod marker;

/// Declaration lookup and insertion.
pub mod patcher;

pub use buffer::SourceBuffer;
pub use error::{AppError, AppResult};
pub use marker::{Marker, DEFAULT_ATTRIBUTE};
pub use patcher::{
    locate, patch, patch_bytes, patch_with, DeclarationKind, DeclarationTarget, MatchResult,
    PatchOptions, Patched, DEFAULT_LOOKBACK,
};
