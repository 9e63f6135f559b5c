//! Storage error types
//!
//! Error codes:
//! - DUDA_STORAGE_IO_ERROR (ERROR severity)
//! - DUDA_STORAGE_WRITE_FAILED (ERROR severity)
//! - DUDA_STORAGE_READ_FAILED (ERROR severity)
//! - DUDA_STORAGE_UNAVAILABLE (ERROR severity)
//! - DUDA_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// How bad a storage failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation fails, the server keeps running
    Error,
    /// The store cannot be trusted any more
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure outside of a read or write
    IoError,
    /// Appending or syncing a record failed
    WriteFailed,
    /// Opening or reading the store file failed
    ReadFailed,
    /// Checksum failure, truncated record or undecodable document
    DataCorruption,
    /// Store refuses mutations (failed load, lost worker)
    Unavailable,
}

impl StorageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::IoError => "DUDA_STORAGE_IO_ERROR",
            StorageErrorCode::WriteFailed => "DUDA_STORAGE_WRITE_FAILED",
            StorageErrorCode::ReadFailed => "DUDA_STORAGE_READ_FAILED",
            StorageErrorCode::DataCorruption => "DUDA_DATA_CORRUPTION",
            StorageErrorCode::Unavailable => "DUDA_STORAGE_UNAVAILABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::IoError, message)
        }
    }

    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::WriteFailed, message)
        }
    }

    /// Write failure that did not originate from the filesystem (e.g. encoding)
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::WriteFailed, message)
    }

    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::ReadFailed, message)
        }
    }

    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::DataCorruption, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::Unavailable, message)
    }

    /// Corruption located at a byte offset of the store file
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::data_corruption(reason)
        }
    }

    /// Corruption tied to a specific document
    pub fn corruption_for_document(document_id: &str, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("document_id: {}", document_id)),
            ..Self::data_corruption(reason)
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
