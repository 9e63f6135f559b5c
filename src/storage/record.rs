//! On-disk record format for the movie store
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Document ID      | (length-prefixed string)
//! +------------------+
//! | Tombstone Flag   | (u8: 0 = live, 1 = deleted)
//! +------------------+
//! | Document Body    | (length-prefixed JSON bytes)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32)
//! +------------------+
//! ```
//!
//! The checksum covers every byte before it, including the length prefix.

use std::io::{self, Cursor, Read};

use crc32fast::Hasher;

/// Smallest possible record: length + empty id + flag + empty body + checksum.
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 1 + 4 + 4;

/// A single append-only entry in the store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Store-assigned identifier
    pub document_id: String,
    /// Whether this entry marks the document as removed
    pub is_tombstone: bool,
    /// Serialized JSON body (empty for tombstones)
    pub document_body: Vec<u8>,
}

impl DocumentRecord {
    /// A live record carrying a document body.
    pub fn live(document_id: impl Into<String>, document_body: Vec<u8>) -> Self {
        Self {
            document_id: document_id.into(),
            is_tombstone: false,
            document_body,
        }
    }

    /// A tombstone for a removed document.
    pub fn tombstone(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            is_tombstone: true,
            document_body: Vec::new(),
        }
    }

    /// Serialize to the framed on-disk representation.
    pub fn serialize(&self) -> Vec<u8> {
        let body_len = 4 + self.document_id.len() + 1 + 4 + self.document_body.len();
        let record_length = 4 + body_len + 4;

        let mut buf = Vec::with_capacity(record_length);
        buf.extend_from_slice(&(record_length as u32).to_le_bytes());

        buf.extend_from_slice(&(self.document_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.document_id.as_bytes());

        buf.push(u8::from(self.is_tombstone));

        buf.extend_from_slice(&(self.document_body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.document_body);

        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());

        buf
    }

    /// Deserialize one framed record, verifying its checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let mut stored = [0u8; 4];
        stored.copy_from_slice(&data[checksum_offset..record_length]);
        let stored_checksum = u32::from_le_bytes(stored);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);

        let id_bytes = read_prefixed(&mut cursor)?;
        let document_id = String::from_utf8(id_bytes).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
        })?;

        let mut flag = [0u8; 1];
        cursor.read_exact(&mut flag)?;

        let document_body = read_prefixed(&mut cursor)?;

        Ok((
            Self {
                document_id,
                is_tombstone: flag[0] != 0,
                document_body,
            },
            record_length,
        ))
    }
}

fn read_prefixed<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let mut buf = vec![0u8; u32::from_le_bytes(len_buf) as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// CRC32 (IEEE) over the given bytes.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
