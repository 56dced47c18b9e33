//! Document providers
//!
//! The gateway trait the core is written against, the value types it
//! exchanges, and two implementations: an in-memory tree and a local
//! directory.

pub mod content_type;
pub mod gateway;
pub mod local;
pub mod memory;
pub mod types;

pub use content_type::mime_type_for_name;
pub use gateway::DocumentGateway;
pub use local::LocalProvider;
pub use memory::MemoryProvider;
pub use types::{
    ChildEntry, DEFAULT_MIME_TYPE, DocumentStat, EntryKind, MIME_TYPE_DIR, ResourceHandle,
};
