//! Path codec
//!
//! Turns a tree grant into the root encoded path and back. The two opaque
//! provider identities are base64url-encoded without padding, so they can
//! never introduce a separator. The label goes in verbatim as the last
//! prefix component: it is only ever displayed, never decoded.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::path::prefix::{PathPrefix, SCHEME_PREFIX, SEPARATOR, relative_components};

/// A user-authorized grant on one provider tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeGrant {
    pub authority: String,
    pub tree_id: String,
    pub root_id: String,
    pub label: String,
}

impl TreeGrant {
    pub fn new(
        authority: impl Into<String>,
        tree_id: impl Into<String>,
        root_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            authority: authority.into(),
            tree_id: tree_id.into(),
            root_id: root_id.into(),
            label: label.into(),
        }
    }
}

/// Path string standing in for a provider URI.
///
/// Never mutated in place; deriving a child or parent yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPath(String);

impl EncodedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub(crate) fn from_raw(raw: String) -> Self {
        EncodedPath(raw)
    }

    pub fn relative_segments(&self) -> Vec<&str> {
        relative_segments(&self.0)
    }

    pub fn join(&self, name: &str) -> Result<EncodedPath, PathError> {
        append_child(&self.0, name)
    }
}

impl fmt::Display for EncodedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<EncodedPath> for String {
    fn from(path: EncodedPath) -> Self {
        path.0
    }
}

impl FromStr for EncodedPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if PathPrefix::parse(s).is_none() {
            return Err(PathError::InvalidPath(s.to_string()));
        }
        Ok(EncodedPath(s.to_string()))
    }
}

/// Encodes arbitrary bytes into a separator-free component
pub fn encode_component(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Inverse of [`encode_component`]
pub fn decode_component(component: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(component).ok()
}

/// Decodes a component holding a UTF-8 provider identity
pub fn decode_identity(component: &str) -> Option<String> {
    String::from_utf8(decode_component(component)?).ok()
}

/// Builds the root encoded path of a grant.
///
/// Fails only for an empty authority or one containing the separator. The
/// label is sanitised instead of rejected since nothing decodes it.
pub fn encode_root(grant: &TreeGrant) -> Result<EncodedPath, PathError> {
    if grant.authority.is_empty() || grant.authority.contains(SEPARATOR) {
        return Err(PathError::InvalidAuthority(grant.authority.clone()));
    }

    Ok(EncodedPath(format!(
        "{}{}/{}/{}/{}",
        SCHEME_PREFIX,
        grant.authority,
        encode_component(grant.tree_id.as_bytes()),
        encode_component(grant.root_id.as_bytes()),
        sanitize_label(&grant.label)
    )))
}

/// Recovers `(authority, tree id, root id)` from an encoded path
pub fn decode_root(path: &str) -> Option<(String, String, String)> {
    PathPrefix::parse(path).map(|prefix| (prefix.authority, prefix.tree_id, prefix.root_id))
}

/// Appends a child name to a path.
///
/// Names that are empty or contain the separator cannot be addressed as a
/// single segment and are rejected.
pub fn append_child(parent: &str, name: &str) -> Result<EncodedPath, PathError> {
    validate_segment(name)?;
    let parent = parent.strip_suffix(SEPARATOR).unwrap_or(parent);
    Ok(EncodedPath(format!("{}{}{}", parent, SEPARATOR, name)))
}

/// Names from the grant root down to the addressed resource
pub fn relative_segments(path: &str) -> Vec<&str> {
    relative_components(path)
}

pub fn validate_segment(name: &str) -> Result<(), PathError> {
    if name.is_empty() || name.contains(SEPARATOR) {
        return Err(PathError::InvalidSegment(name.to_string()));
    }
    Ok(())
}

fn sanitize_label(label: &str) -> String {
    if label.is_empty() {
        return "_".to_string();
    }
    label.replace(SEPARATOR, "_")
}
