//! Tree storage
//!
//! File operations over a granted tree, addressed by encoded path.

pub mod encoding;
pub mod operations;
pub mod results;

pub use encoding::TextEncoding;
pub use operations::TreeFs;
pub use results::{DirEntry, FileData, FileStat};
