//! Provider directory gateway
//!
//! The only way the rest of the crate talks to a storage provider. Every
//! method is one provider round-trip and is assumed atomic.

use std::io::{Read, Write};
use std::sync::Arc;

use crate::error::ProviderError;
use crate::provider::types::{ChildEntry, DocumentStat, ResourceHandle};

pub trait DocumentGateway: Send + Sync {
    /// Lists the direct children of a directory.
    ///
    /// Fails if `dir` is not a directory or cannot be reached.
    fn list_children(&self, dir: &ResourceHandle) -> Result<Vec<ChildEntry>, ProviderError>;

    fn create_directory(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError>;

    fn create_file(
        &self,
        parent: &ResourceHandle,
        name: &str,
        mime_type: &str,
    ) -> Result<ResourceHandle, ProviderError>;

    fn open_read(&self, handle: &ResourceHandle) -> Result<Box<dyn Read + Send>, ProviderError>;

    /// Opens a file for writing, truncating existing content.
    fn open_overwrite(&self, handle: &ResourceHandle)
    -> Result<Box<dyn Write + Send>, ProviderError>;

    fn delete(&self, handle: &ResourceHandle) -> Result<(), ProviderError>;

    /// Renames a document in place. The returned handle may differ from the
    /// input when the provider derives document ids from names.
    fn rename(
        &self,
        handle: &ResourceHandle,
        new_name: &str,
    ) -> Result<ResourceHandle, ProviderError>;

    fn stat(&self, handle: &ResourceHandle) -> Result<DocumentStat, ProviderError>;
}

impl<G: DocumentGateway + ?Sized> DocumentGateway for Arc<G> {
    fn list_children(&self, dir: &ResourceHandle) -> Result<Vec<ChildEntry>, ProviderError> {
        (**self).list_children(dir)
    }

    fn create_directory(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        (**self).create_directory(parent, name)
    }

    fn create_file(
        &self,
        parent: &ResourceHandle,
        name: &str,
        mime_type: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        (**self).create_file(parent, name, mime_type)
    }

    fn open_read(&self, handle: &ResourceHandle) -> Result<Box<dyn Read + Send>, ProviderError> {
        (**self).open_read(handle)
    }

    fn open_overwrite(
        &self,
        handle: &ResourceHandle,
    ) -> Result<Box<dyn Write + Send>, ProviderError> {
        (**self).open_overwrite(handle)
    }

    fn delete(&self, handle: &ResourceHandle) -> Result<(), ProviderError> {
        (**self).delete(handle)
    }

    fn rename(
        &self,
        handle: &ResourceHandle,
        new_name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        (**self).rename(handle, new_name)
    }

    fn stat(&self, handle: &ResourceHandle) -> Result<DocumentStat, ProviderError> {
        (**self).stat(handle)
    }
}
