//! docpath - document trees addressed as paths
//!
//! A tree grant obtained once from a storage provider is exposed as an
//! ordinary hierarchy of `file://` path strings. Callers never see provider
//! URIs or document identities; every call re-resolves its path against the
//! provider one directory level at a time.

pub mod config;
pub mod error;
pub mod path;
pub mod provider;
pub mod resolve;
pub mod storage;
pub mod tree;

pub use error::DocpathError;
pub use path::{EncodedPath, PathPrefix, TreeGrant};
pub use provider::{DocumentGateway, ResourceHandle};
pub use storage::{FileData, TreeFs};
