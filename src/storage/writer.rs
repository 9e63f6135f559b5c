//! Append-only writer for the movie store file
//!
//! Every append is followed by `sync_all`; a write is not acknowledged until
//! the fsync returns. Records are never rewritten in place.
//!
//! A failed append truncates the file back to the last acknowledged record.
//! If that truncation fails too, it is retried before the next append, so a
//! new record never lands behind a partial one.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::reader::StorageReader;
use super::record::DocumentRecord;

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "movies.db";

pub struct StorageWriter {
    storage_path: PathBuf,
    file: File,
    current_offset: u64,
    /// Bytes past `current_offset` may hold a partial record
    torn_tail: bool,
    /// Live document id -> offset of its latest record
    live_offsets: HashMap<String, u64>,
}

impl StorageWriter {
    /// Opens or creates `<data_dir>/movies.db`.
    ///
    /// The live-id table starts empty; call `load_live_set` to rebuild it from
    /// the existing records.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", data_dir.display()),
                    e,
                )
            })?;
        }

        let storage_path = data_dir.join(STORE_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&storage_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open storage file: {}", storage_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            storage_path,
            file,
            current_offset,
            torn_tail: false,
            live_offsets: HashMap::new(),
        })
    }

    /// Scans the file and replaces the live-id table.
    ///
    /// On corruption the table is left untouched and the error is returned.
    pub fn load_live_set(&mut self) -> StorageResult<()> {
        let mut offsets = HashMap::new();
        if self.current_offset == 0 {
            self.live_offsets = offsets;
            return Ok(());
        }

        let mut reader = StorageReader::open(&self.storage_path)?;
        loop {
            let offset = reader.current_offset();
            match reader.read_next()? {
                Some(record) if record.is_tombstone => {
                    offsets.remove(&record.document_id);
                }
                Some(record) => {
                    offsets.insert(record.document_id, offset);
                }
                None => break,
            }
        }

        self.live_offsets = offsets;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Number of documents whose latest record is not a tombstone.
    pub fn live_count(&self) -> usize {
        self.live_offsets.len()
    }

    pub fn is_live(&self, document_id: &str) -> bool {
        self.live_offsets.contains_key(document_id)
    }

    /// Appends a live document record. Returns its byte offset.
    pub fn insert(&mut self, document_id: &str, document_body: Vec<u8>) -> StorageResult<u64> {
        let offset = self.append(&DocumentRecord::live(document_id, document_body))?;
        self.live_offsets.insert(document_id.to_string(), offset);
        Ok(offset)
    }

    /// Appends a tombstone for `document_id`. Returns its byte offset.
    pub fn write_tombstone(&mut self, document_id: &str) -> StorageResult<u64> {
        let offset = self.append(&DocumentRecord::tombstone(document_id))?;
        self.live_offsets.remove(document_id);
        Ok(offset)
    }

    fn append(&mut self, record: &DocumentRecord) -> StorageResult<u64> {
        let serialized = record.serialize();
        self.discard_torn_tail()?;
        let offset = self.current_offset;

        if let Err(e) = self.file.write_all(&serialized) {
            return Err(self.abort_append(StorageError::write_failed(
                format!("Failed to write document: {}", record.document_id),
                e,
            )));
        }

        if let Err(e) = self.file.sync_all() {
            return Err(self.abort_append(StorageError::write_failed(
                format!("fsync failed after writing document: {}", record.document_id),
                e,
            )));
        }

        self.current_offset += serialized.len() as u64;
        Ok(offset)
    }

    fn abort_append(&mut self, err: StorageError) -> StorageError {
        self.torn_tail = true;
        // Retried on the next append if it fails here.
        let _ = self.discard_torn_tail();
        err
    }

    /// Truncates the file to `current_offset` after a failed append.
    fn discard_torn_tail(&mut self) -> StorageResult<()> {
        if !self.torn_tail {
            return Ok(());
        }

        self.file.set_len(self.current_offset).map_err(|e| {
            StorageError::write_failed("Failed to discard partial record", e)
        })?;
        self.file.sync_all().map_err(|e| {
            StorageError::write_failed("fsync failed after discarding partial record", e)
        })?;

        self.torn_tail = false;
        Ok(())
    }
}
