//! Storage result types
//!
//! Defines result structures returned by storage operations.

use crate::path::EncodedPath;
use crate::provider::EntryKind;

/// One child observed during a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size_bytes: u64,
    pub last_modified_millis: i64,
    /// Constructed, not resolved. `None` when the provider's display name
    /// contains the separator and cannot be addressed as a segment.
    pub path: Option<EncodedPath>,
}

/// Result of a stat operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub kind: EntryKind,
    pub mime_type: String,
    pub size_bytes: u64,
    pub last_modified_millis: i64,
    pub path: String,
}

/// File content read or to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Text(String),
    Bytes(Vec<u8>),
}
