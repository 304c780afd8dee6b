//! Strongly-typed IDs used across Nova.
//!
//! Kept as a separate module for backwards compatibility; the canonical
//! definitions live in `nova-ids`.

pub use nova_ids::*;
