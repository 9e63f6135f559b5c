//! dudaflix - a small movie recommendation catalog
//!
//! Movies are persisted to an embedded append-only document store, mirrored
//! in memory, indexed by genre and rating, and served over a JSON HTTP API.

pub mod catalog;
pub mod cli;
pub mod http_server;
pub mod index;
pub mod observability;
pub mod storage;
