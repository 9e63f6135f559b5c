//! Embedded document store
//!
//! The store file holds the canonical persistent state of every movie. It is
//! an append-only sequence of checksummed records with no in-place updates.
//!
//! - Every append is fsynced before it is acknowledged
//! - Every read verifies the record checksum
//! - Deletes append a tombstone; the latest record per id wins
//! - Corruption is fatal for the scan that found it

mod errors;
mod reader;
mod record;
mod store;
mod writer;

pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::StorageReader;
pub use record::{compute_checksum, DocumentRecord};
pub use store::{DocumentStore, FileStore, StoredDocument};
pub use writer::{StorageWriter, STORE_FILE_NAME};
