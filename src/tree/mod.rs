//! Tree builder
//!
//! Creates missing directories (and optionally a leaf file) along an encoded
//! path, on top of the resolver's single-level lookups.

mod builder;
mod plan;

pub use builder::{build_leaf_file, build_path, ensure_leaf_file, ensure_path};
pub use plan::{CreationPlan, plan_path};
