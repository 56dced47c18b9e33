//! Path relations
//!
//! String-level predicates and constructors. None of these touch a provider.

use crate::path::codec::EncodedPath;
use crate::path::prefix::{PREFIX_COMPONENTS, SEPARATOR_STR, split_components};

/// True iff both paths have the same number of components and all but the
/// last are pairwise equal, i.e. both name an entry in the same directory.
///
/// Identical paths are siblings of each other.
pub fn is_sibling(a: &str, b: &str) -> bool {
    let a = split_components(a);
    let b = split_components(b);
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    let last = a.len() - 1;
    a[..last] == b[..last]
}

/// Final component of a path, or `""` for an empty path
pub fn last_segment(path: &str) -> &str {
    split_components(path).last().copied().unwrap_or("")
}

/// Path of the containing directory; `None` at the grant root
pub fn parent_path(path: &str) -> Option<EncodedPath> {
    let components = split_components(path);
    if components.len() <= PREFIX_COMPONENTS {
        return None;
    }
    let parent = components[..components.len() - 1].join(SEPARATOR_STR);
    Some(EncodedPath::from_raw(parent))
}
