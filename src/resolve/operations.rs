//! Resolution walk
//!
//! An encoded path is turned back into a provider handle by decoding its
//! prefix and then descending one single-level lookup per relative segment.
//! Nothing is cached: every call starts again from the grant root.

use log::{debug, warn};

use crate::error::{ProviderError, ResolveError};
use crate::path::{PathPrefix, relative_segments};
use crate::provider::{DocumentGateway, ResourceHandle};

/// Handle of the grant root named by `path`.
///
/// `None` means the path does not belong to this system.
pub fn resolve_root(path: &str) -> Option<ResourceHandle> {
    PathPrefix::parse(path).map(|prefix| prefix.root_handle())
}

/// Single-level lookup: the first child of `parent` whose display name is
/// exactly `name`.
///
/// `Ok(None)` when no child matches. Provider failures are passed through
/// untouched.
pub fn lookup_child<G: DocumentGateway + ?Sized>(
    gateway: &G,
    parent: &ResourceHandle,
    name: &str,
) -> Result<Option<ResourceHandle>, ProviderError> {
    let children = gateway.list_children(parent)?;
    Ok(children
        .into_iter()
        .find(|child| child.name == name)
        .map(|child| child.handle))
}

/// Like [`lookup_child`], with provider failures folded into "not found"
pub fn find_child<G: DocumentGateway + ?Sized>(
    gateway: &G,
    parent: &ResourceHandle,
    name: &str,
) -> Option<ResourceHandle> {
    match lookup_child(gateway, parent, name) {
        Ok(child) => child,
        Err(e) => {
            warn!("Unable to list {} looking for {:?}: {}", parent, name, e);
            None
        }
    }
}

/// Resolves `path`, keeping track of why and where resolution stopped
pub fn resolve_detailed<G: DocumentGateway + ?Sized>(
    gateway: &G,
    path: &str,
) -> Result<ResourceHandle, ResolveError> {
    let mut current =
        resolve_root(path).ok_or_else(|| ResolveError::InvalidPath(path.to_string()))?;

    for (depth, segment) in relative_segments(path).into_iter().enumerate() {
        debug!("check child {:?} under {}", segment, current);
        current = match lookup_child(gateway, &current, segment) {
            Ok(Some(child)) => child,
            Ok(None) => {
                debug!("child {:?} does not exist", segment);
                return Err(ResolveError::NotFound {
                    segment: segment.to_string(),
                    depth,
                });
            }
            Err(source) => {
                return Err(ResolveError::Provider {
                    segment: segment.to_string(),
                    source,
                });
            }
        };
    }

    Ok(current)
}

/// Resolves `path` to a handle; `None` when the path is invalid or any
/// segment cannot be found
pub fn resolve<G: DocumentGateway + ?Sized>(gateway: &G, path: &str) -> Option<ResourceHandle> {
    match resolve_detailed(gateway, path) {
        Ok(handle) => Some(handle),
        Err(ResolveError::Provider { segment, source }) => {
            warn!("Unable to resolve {:?} in {}: {}", segment, path, source);
            None
        }
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}
