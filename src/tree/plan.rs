//! Directory creation plans
//!
//! Ensuring a path exists is split in two: a read-only walk that finds the
//! deepest existing directory and lists what is missing, and the creation of
//! those directories. The plan is a plain value, so callers can inspect it
//! before anything is written.

use log::{debug, error};

use crate::error::TreeError;
use crate::path::{relative_segments, validate_segment};
use crate::provider::{DocumentGateway, ResourceHandle};
use crate::resolve::{find_child, resolve_root};

/// Ordered directory creations still needed to materialize a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationPlan {
    base: ResourceHandle,
    pending: Vec<String>,
}

impl CreationPlan {
    /// Deepest directory that already exists
    pub fn base(&self) -> &ResourceHandle {
        &self.base
    }

    /// Directory names to create below [`base`](Self::base), outermost first
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_noop(&self) -> bool {
        self.pending.is_empty()
    }

    /// Creates the pending directories in order and returns the innermost.
    ///
    /// Not transactional: when a creation fails, directories created
    /// earlier in the chain stay in place.
    pub fn apply<G: DocumentGateway + ?Sized>(
        self,
        gateway: &G,
    ) -> Result<ResourceHandle, TreeError> {
        let mut current = self.base;
        for name in self.pending {
            current = match gateway.create_directory(&current, &name) {
                Ok(child) => {
                    debug!("created directory {:?} as {}", name, child);
                    child
                }
                Err(source) => {
                    error!("failed to create directory {:?}: {}", name, source);
                    return Err(TreeError::CreateFailed { name, source });
                }
            };
        }
        Ok(current)
    }
}

/// Walks `path` without writing anything and plans the missing directories.
///
/// With `exclude_last` the final segment is left out, for when it names a
/// file the caller will create. A missing segment that is not the last one
/// processed fails with [`TreeError::MissingIntermediate`] unless
/// `recursive` is set.
pub fn plan_path<G: DocumentGateway + ?Sized>(
    gateway: &G,
    path: &str,
    recursive: bool,
    exclude_last: bool,
) -> Result<CreationPlan, TreeError> {
    let root = resolve_root(path).ok_or_else(|| TreeError::InvalidPath(path.to_string()))?;
    let mut segments = relative_segments(path);
    if exclude_last {
        segments.pop();
    }

    let mut current = root;
    for (idx, segment) in segments.iter().enumerate() {
        if let Some(child) = find_child(gateway, &current, segment) {
            current = child;
            continue;
        }

        let is_last = idx + 1 == segments.len();
        if !is_last && !recursive {
            // no -p: a missing intermediate directory is an error
            return Err(TreeError::MissingIntermediate(segment.to_string()));
        }

        let pending: Vec<String> = segments[idx..].iter().map(|s| s.to_string()).collect();
        for name in &pending {
            validate_segment(name).map_err(|e| TreeError::InvalidPath(e.to_string()))?;
        }
        return Ok(CreationPlan {
            base: current,
            pending,
        });
    }

    Ok(CreationPlan {
        base: current,
        pending: Vec::new(),
    })
}
