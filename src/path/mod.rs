//! Encoded paths
//!
//! The codec between tree grants and `file://` path strings, and the pure
//! string relations built on top of it.

pub mod codec;
pub mod prefix;
pub mod relations;

pub use codec::{
    EncodedPath, TreeGrant, append_child, decode_component, decode_root, encode_component,
    encode_root, relative_segments, validate_segment,
};
pub use prefix::{PREFIX_COMPONENTS, PathPrefix, SCHEME_PREFIX};
pub use relations::{is_sibling, last_segment, parent_path};
