//! # PhET-iO IO
//!
//! Persistence layer for captured PhET-iO state.
//!
//! This crate provides:
//! - Structured error handling with context wrapping
//! - Validated JSON helpers, gzip-aware by file extension
//! - Versioned, fingerprinted state snapshot files

/// Error types and result aliases for I/O operations
pub mod error;
/// Validated JSON helpers for strings and files
pub mod serialization;
/// Versioned state snapshot files
pub mod snapshot;

pub use error::{IoError, Result};
pub use serialization::{from_json, read_json_file, to_json_pretty, write_json_file};
pub use snapshot::{compute_fingerprint, StateSnapshot, SNAPSHOT_VERSION};
