//! Provider-side value types
//!
//! Handles, listing rows and stat columns as returned by a document provider.

use std::fmt;

/// MIME type providers report for directories
pub const MIME_TYPE_DIR: &str = "vnd.android.document/directory";

/// Fallback MIME type for files with no known extension
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Reference to one resolved document inside a granted tree.
///
/// Handles are recomputed from an encoded path on every call and are never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    authority: String,
    tree_id: String,
    document_id: String,
}

impl ResourceHandle {
    pub fn new(
        authority: impl Into<String>,
        tree_id: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        Self {
            authority: authority.into(),
            tree_id: tree_id.into(),
            document_id: document_id.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Handle for another document in the same tree
    pub fn with_document(&self, document_id: impl Into<String>) -> Self {
        Self {
            authority: self.authority.clone(),
            tree_id: self.tree_id.clone(),
            document_id: document_id.into(),
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "content://{}/tree/{}/document/{}",
            self.authority, self.tree_id, self.document_id
        )
    }
}

/// File or directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == MIME_TYPE_DIR {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a child listing
#[derive(Debug, Clone)]
pub struct ChildEntry {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub last_modified_millis: i64,
    pub handle: ResourceHandle,
}

impl ChildEntry {
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mime_type(&self.mime_type)
    }
}

/// Stat columns of a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStat {
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub last_modified_millis: i64,
}

impl DocumentStat {
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mime_type(&self.mime_type)
    }
}
