//! Error types
//!
//! Defines domain-specific error types for each module of the crate.

use std::fmt;
use std::io;

/// Path codec errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    InvalidAuthority(String),
    InvalidSegment(String),
    InvalidPath(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidAuthority(a) => write!(f, "Invalid authority: {:?}", a),
            PathError::InvalidSegment(s) => write!(f, "Invalid path segment: {:?}", s),
            PathError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
        }
    }
}

impl std::error::Error for PathError {}

/// Errors reported by a document provider
#[derive(Debug)]
pub enum ProviderError {
    NotFound(String),
    NotADirectory(String),
    AlreadyExists(String),
    PermissionDenied(String),
    Unreachable(String),
    InvalidDocumentId(String),
    Io(io::Error),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotFound(d) => write!(f, "Document not found: {}", d),
            ProviderError::NotADirectory(d) => write!(f, "Not a directory: {}", d),
            ProviderError::AlreadyExists(d) => write!(f, "Document already exists: {}", d),
            ProviderError::PermissionDenied(d) => write!(f, "Permission denied: {}", d),
            ProviderError::Unreachable(d) => write!(f, "Provider unreachable for: {}", d),
            ProviderError::InvalidDocumentId(d) => write!(f, "Invalid document id: {}", d),
            ProviderError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProviderError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => ProviderError::NotFound(error.to_string()),
            io::ErrorKind::PermissionDenied => ProviderError::PermissionDenied(error.to_string()),
            io::ErrorKind::AlreadyExists => ProviderError::AlreadyExists(error.to_string()),
            _ => ProviderError::Io(error),
        }
    }
}

/// Resolver errors, for callers that want more than "not found"
#[derive(Debug)]
pub enum ResolveError {
    InvalidPath(String),
    NotFound { segment: String, depth: usize },
    Provider { segment: String, source: ProviderError },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            ResolveError::NotFound { segment, depth } => {
                write!(f, "No child named {:?} at depth {}", segment, depth)
            }
            ResolveError::Provider { segment, source } => {
                write!(f, "Lookup of {:?} failed: {}", segment, source)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Provider { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Tree builder errors
#[derive(Debug)]
pub enum TreeError {
    InvalidPath(String),
    MissingIntermediate(String),
    CreateFailed { name: String, source: ProviderError },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            TreeError::MissingIntermediate(name) => {
                write!(f, "Intermediate directory missing: {}", name)
            }
            TreeError::CreateFailed { name, source } => {
                write!(f, "Failed to create {:?}: {}", name, source)
            }
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TreeError::CreateFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Caller-facing storage operation errors
#[derive(Debug)]
pub enum StorageError {
    InvalidPath(String),
    NotFound(String),
    MissingArgument(&'static str),
    UnsupportedEncoding(String),
    CrossDirectoryRename { from: String, to: String },
    SameSourceAndTarget(String),
    RootRename(String),
    Unsupported(&'static str),
    CreateFailed(String),
    Provider(ProviderError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::NotFound(p) => write!(f, "File does not exist: {}", p),
            StorageError::MissingArgument(arg) => write!(f, "Missing argument {}", arg),
            StorageError::UnsupportedEncoding(e) => {
                write!(f, "Unsupported encoding provided: {}", e)
            }
            StorageError::CrossDirectoryRename { from, to } => write!(
                f,
                "Only rename under the same folder is supported: {} -> {}",
                from, to
            ),
            StorageError::SameSourceAndTarget(p) => {
                write!(f, "Source and target are the same: {}", p)
            }
            StorageError::RootRename(p) => write!(f, "The tree root cannot be renamed: {}", p),
            StorageError::Unsupported(op) => write!(f, "{}: not implemented", op),
            StorageError::CreateFailed(p) => write!(f, "Failed to create: {}", p),
            StorageError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Provider(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProviderError> for StorageError {
    fn from(error: ProviderError) -> Self {
        StorageError::Provider(error)
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Provider(ProviderError::from(error))
    }
}

impl From<PathError> for StorageError {
    fn from(error: PathError) -> Self {
        StorageError::InvalidPath(error.to_string())
    }
}

/// Top-level error that encompasses all error types
#[derive(Debug)]
pub enum DocpathError {
    Path(PathError),
    Storage(StorageError),
    Config(config::ConfigError),
}

impl fmt::Display for DocpathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocpathError::Path(e) => write!(f, "Path error: {}", e),
            DocpathError::Storage(e) => write!(f, "Storage error: {}", e),
            DocpathError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for DocpathError {}

impl From<PathError> for DocpathError {
    fn from(error: PathError) -> Self {
        DocpathError::Path(error)
    }
}

impl From<StorageError> for DocpathError {
    fn from(error: StorageError) -> Self {
        DocpathError::Storage(error)
    }
}

impl From<config::ConfigError> for DocpathError {
    fn from(error: config::ConfigError) -> Self {
        DocpathError::Config(error)
    }
}
