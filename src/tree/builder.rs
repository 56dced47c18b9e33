//! Tree builder operations

use log::{debug, error, warn};

use crate::error::TreeError;
use crate::path::{relative_segments, validate_segment};
use crate::provider::{DocumentGateway, ResourceHandle, mime_type_for_name};
use crate::resolve::find_child;
use crate::tree::plan::plan_path;

/// Makes sure every directory along `path` exists, creating what is missing
pub fn build_path<G: DocumentGateway + ?Sized>(
    gateway: &G,
    path: &str,
    recursive: bool,
    exclude_last: bool,
) -> Result<ResourceHandle, TreeError> {
    let plan = plan_path(gateway, path, recursive, exclude_last)?;
    if !plan.is_noop() {
        debug!("{} directories to create for {}", plan.pending().len(), path);
    }
    plan.apply(gateway)
}

/// [`build_path`] with failures collapsed to `None`
pub fn ensure_path<G: DocumentGateway + ?Sized>(
    gateway: &G,
    path: &str,
    recursive: bool,
    exclude_last: bool,
) -> Option<ResourceHandle> {
    match build_path(gateway, path, recursive, exclude_last) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("ensure_path {} failed: {}", path, e);
            None
        }
    }
}

/// Materializes the parent chain of `path` and then the file it names.
///
/// An existing leaf is reused, so repeated calls return the same handle.
/// A path addressing the grant root itself yields the root handle.
pub fn build_leaf_file<G: DocumentGateway + ?Sized>(
    gateway: &G,
    path: &str,
    recursive: bool,
) -> Result<ResourceHandle, TreeError> {
    let parent = build_path(gateway, path, recursive, true)?;

    let segments = relative_segments(path);
    let Some(filename) = segments.last() else {
        return Ok(parent);
    };
    validate_segment(filename).map_err(|e| TreeError::InvalidPath(e.to_string()))?;

    if let Some(existing) = find_child(gateway, &parent, filename) {
        return Ok(existing);
    }

    let mime_type = mime_type_for_name(filename);
    match gateway.create_file(&parent, filename, mime_type) {
        Ok(handle) => {
            debug!("created document {} ({})", handle, mime_type);
            Ok(handle)
        }
        Err(source) => {
            error!("failed to create document {:?}: {}", filename, source);
            Err(TreeError::CreateFailed {
                name: filename.to_string(),
                source,
            })
        }
    }
}

/// [`build_leaf_file`] with failures collapsed to `None`
pub fn ensure_leaf_file<G: DocumentGateway + ?Sized>(
    gateway: &G,
    path: &str,
    recursive: bool,
) -> Option<ResourceHandle> {
    match build_leaf_file(gateway, path, recursive) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("ensure_leaf_file {} failed: {}", path, e);
            None
        }
    }
}
