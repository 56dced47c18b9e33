//! Error handlers
//!
//! Logging and exit-code mapping for top-level errors.

use crate::error::types::{DocpathError, StorageError};
use log::error;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_REJECTED: i32 = 2;

/// Log a top-level error
pub fn handle_error(err: &DocpathError) {
    error!("docpath error: {}", err);
}

/// Convert error to process exit code
///
/// Requests rejected before any provider call get [`EXIT_REJECTED`];
/// everything that reached the provider gets [`EXIT_FAILURE`].
pub fn exit_code(err: &DocpathError) -> i32 {
    match err {
        DocpathError::Path(_) => EXIT_REJECTED,
        DocpathError::Config(_) => EXIT_REJECTED,
        DocpathError::Storage(e) => match e {
            StorageError::InvalidPath(_)
            | StorageError::MissingArgument(_)
            | StorageError::UnsupportedEncoding(_)
            | StorageError::CrossDirectoryRename { .. }
            | StorageError::SameSourceAndTarget(_)
            | StorageError::RootRename(_)
            | StorageError::Unsupported(_) => EXIT_REJECTED,
            StorageError::NotFound(_)
            | StorageError::CreateFailed(_)
            | StorageError::Provider(_) => EXIT_FAILURE,
        },
    }
}
