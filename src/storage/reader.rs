//! Sequential reader for the movie store file
//!
//! Every record read is checksum-verified. A bad record aborts the scan with
//! `DUDA_DATA_CORRUPTION`; there is no skip-and-continue.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{DocumentRecord, MIN_RECORD_SIZE};

#[derive(Debug)]
pub struct StorageReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl StorageReader {
    /// Opens the store file for reading.
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        let file = File::open(storage_path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to open storage file: {}", storage_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of file.
    pub fn read_next(&mut self) -> StorageResult<Option<DocumentRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        let min_size = MIN_RECORD_SIZE as u64;

        if remaining < min_size {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated storage: {} bytes remaining, minimum record size is {}",
                    remaining, min_size
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < min_size || record_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Invalid record length {} ({} bytes remaining)",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = DocumentRecord::deserialize(&record_buf)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(record))
    }

    /// Reads every record in file order, tombstones included.
    pub fn read_all(&mut self) -> StorageResult<Vec<DocumentRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Resolves the file into the set of live documents.
    ///
    /// Latest record per id wins and a tombstone drops the id. Survivors are
    /// returned in the order their ids were first written.
    pub fn live_documents(&mut self) -> StorageResult<Vec<DocumentRecord>> {
        // id -> (sequence of its first live write, latest record)
        let mut latest: HashMap<String, (u64, DocumentRecord)> = HashMap::new();
        let mut sequence = 0u64;

        while let Some(record) = self.read_next()? {
            if record.is_tombstone {
                latest.remove(&record.document_id);
                continue;
            }
            match latest.get_mut(&record.document_id) {
                Some(entry) => entry.1 = record,
                None => {
                    latest.insert(record.document_id.clone(), (sequence, record));
                    sequence += 1;
                }
            }
        }

        let mut survivors: Vec<(u64, DocumentRecord)> = latest.into_values().collect();
        survivors.sort_unstable_by_key(|(first_write, _)| *first_write);
        Ok(survivors.into_iter().map(|(_, record)| record).collect())
    }
}
