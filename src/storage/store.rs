//! Document store facade
//!
//! `DocumentStore` is what the catalog talks to: load every live document,
//! insert a body and get back its assigned id, remove by id. `FileStore` is
//! the embedded implementation on top of the append-only record file.

use std::path::Path;

use serde_json::Value;
use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::reader::StorageReader;
use super::writer::StorageWriter;

/// A live document with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub body: Value,
}

pub trait DocumentStore {
    /// All live documents, in insertion order.
    fn load_all(&mut self) -> StorageResult<Vec<StoredDocument>>;

    /// Persist `body` under a freshly assigned id.
    fn insert(&mut self, body: &Value) -> StorageResult<StoredDocument>;

    /// Remove the document with `id`. Returns how many documents were removed.
    fn remove(&mut self, id: &str) -> StorageResult<usize>;
}

/// Store backed by `<data_dir>/movies.db`.
///
/// `remove` only sees ids that were inserted through this handle or found by
/// the last successful `load_all`.
pub struct FileStore {
    writer: StorageWriter,
}

impl FileStore {
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let writer = StorageWriter::open(data_dir)?;
        Ok(Self { writer })
    }

    fn assign_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string();
            if !self.writer.is_live(&id) {
                return id;
            }
        }
    }
}

impl DocumentStore for FileStore {
    fn load_all(&mut self) -> StorageResult<Vec<StoredDocument>> {
        self.writer.load_live_set()?;
        let mut reader = StorageReader::open(self.writer.path())?;
        reader
            .live_documents()?
            .into_iter()
            .map(|record| {
                let body = serde_json::from_slice(&record.document_body).map_err(|e| {
                    StorageError::corruption_for_document(
                        &record.document_id,
                        format!("Document body is not valid JSON: {}", e),
                    )
                })?;
                Ok(StoredDocument {
                    id: record.document_id,
                    body,
                })
            })
            .collect()
    }

    fn insert(&mut self, body: &Value) -> StorageResult<StoredDocument> {
        let bytes = serde_json::to_vec(body).map_err(|e| {
            StorageError::write_failed_no_source(format!("Failed to encode document: {}", e))
        })?;

        let id = self.assign_id();
        self.writer.insert(&id, bytes)?;

        Ok(StoredDocument {
            id,
            body: body.clone(),
        })
    }

    fn remove(&mut self, id: &str) -> StorageResult<usize> {
        if !self.writer.is_live(id) {
            return Ok(0);
        }
        self.writer.write_tombstone(id)?;
        Ok(1)
    }
}
