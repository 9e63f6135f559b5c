//! Secondary indexes for the catalog
//!
//! Indexes are derived, in-memory-only state. They are never persisted and
//! never the source of truth: the catalog rebuilds them from its movie list
//! after the startup load and after every successful create or delete.

mod manager;

pub use manager::{MovieIndex, MoviePosition};
