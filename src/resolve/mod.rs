//! Resolve module
//!
//! Maps encoded paths back to provider handles.

mod operations;

pub use operations::{find_child, lookup_child, resolve, resolve_detailed, resolve_root};
