//! Encoded path prefix
//!
//! Every encoded path starts with the same six slash-delimited components:
//!
//! ```text
//! file: / "" / authority / enc(tree id) / enc(root id) / label
//! ```
//!
//! [`PathPrefix::parse`] is the one place that slices a path into prefix and
//! relative segments. Everything else goes through it or through
//! [`split_components`].

use crate::path::codec::decode_identity;
use crate::provider::ResourceHandle;

/// Number of components making up the fixed prefix
pub const PREFIX_COMPONENTS: usize = 6;

/// Scheme every encoded path starts with
pub const SCHEME_PREFIX: &str = "file://";

pub const SEPARATOR: char = '/';
pub const SEPARATOR_STR: &str = "/";

/// Splits a path on the separator, dropping trailing empty components so
/// that `a/b/` and `a/b` tokenize the same way.
pub fn split_components(path: &str) -> Vec<&str> {
    let mut components: Vec<&str> = path.split(SEPARATOR).collect();
    while components.last().is_some_and(|c| c.is_empty()) {
        components.pop();
    }
    components
}

/// The parsed fixed prefix of an encoded path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    pub authority: String,
    pub tree_id: String,
    pub root_id: String,
    pub label: String,
}

impl PathPrefix {
    /// Parses the prefix of `path`.
    ///
    /// Returns `None` for anything that is not an encoded path of this
    /// system: wrong scheme, fewer than six components, an empty authority
    /// or identities that do not decode. Malformed input is expected here
    /// and never panics.
    pub fn parse(path: &str) -> Option<PathPrefix> {
        if !path.starts_with(SCHEME_PREFIX) {
            return None;
        }
        let components = split_components(path);
        if components.len() < PREFIX_COMPONENTS {
            return None;
        }

        let authority = components[2];
        if authority.is_empty() {
            return None;
        }

        Some(PathPrefix {
            authority: authority.to_string(),
            tree_id: decode_identity(components[3])?,
            root_id: decode_identity(components[4])?,
            label: components[5].to_string(),
        })
    }

    /// Handle of the grant root this prefix points at
    pub fn root_handle(&self) -> ResourceHandle {
        ResourceHandle::new(&self.authority, &self.tree_id, &self.root_id)
    }
}

/// Components after the prefix, empty when `path` is exactly a prefix
pub fn relative_components(path: &str) -> Vec<&str> {
    let components = split_components(path);
    if components.len() <= PREFIX_COMPONENTS {
        return Vec::new();
    }
    components[PREFIX_COMPONENTS..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_trailing_empty() {
        assert_eq!(split_components("a/b/"), vec!["a", "b"]);
        assert_eq!(split_components("a//b"), vec!["a", "", "b"]);
        assert_eq!(split_components("file://A/T/R/L").len(), PREFIX_COMPONENTS);
    }

    #[test]
    fn test_parse_rejects_foreign_paths() {
        assert_eq!(PathPrefix::parse("/sdcard/notes"), None);
        assert_eq!(PathPrefix::parse("content://A/T/R/L"), None);
        assert_eq!(PathPrefix::parse("file://A/VA/Ug"), None);
        assert_eq!(PathPrefix::parse("file:///VA/Ug/L"), None);
        // "*" is outside the base64url alphabet
        assert_eq!(PathPrefix::parse("file://A/*/Ug/L"), None);
    }

    #[test]
    fn test_parse_prefix() {
        let prefix = PathPrefix::parse("file://prov/VGVzdA/Um9vdA/MyNotes/journal").unwrap();
        assert_eq!(prefix.authority, "prov");
        assert_eq!(prefix.tree_id, "Test");
        assert_eq!(prefix.root_id, "Root");
        assert_eq!(prefix.label, "MyNotes");
        assert_eq!(prefix.root_handle().document_id(), "Root");
    }

    #[test]
    fn test_relative_components() {
        assert!(relative_components("file://A/T/R/L").is_empty());
        assert!(relative_components("file://A/T/R/L/").is_empty());
        assert_eq!(relative_components("file://A/T/R/L/x/y"), vec!["x", "y"]);
    }
}
