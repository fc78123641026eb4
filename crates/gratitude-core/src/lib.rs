//! Core types and pure aggregations for the gratitude statistics service.
//!
//! This crate is deliberately free of HTTP and runtime dependencies. The
//! store and API crates depend on it; it depends on nothing of theirs.

pub mod aggregate;
pub mod entry;
pub mod error;
pub mod frequency;
pub mod range;
pub mod source;

pub use entry::{Entry, FrequencyEntry};
pub use error::{Error, Result};
pub use range::DateRange;
