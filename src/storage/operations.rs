//! Storage operations
//!
//! Caller-facing file operations, all addressed by encoded path. Every call
//! resolves its path from the grant root; preconditions are checked before
//! the provider is touched.

use log::{debug, error, info, warn};
use std::io::{Read, Write};

use crate::error::{ResolveError, StorageError, TreeError};
use crate::path::prefix::{SEPARATOR_STR, split_components};
use crate::path::{
    EncodedPath, PathPrefix, append_child, is_sibling, last_segment, relative_segments,
    validate_segment,
};
use crate::provider::{DocumentGateway, MIME_TYPE_DIR, ResourceHandle};
use crate::resolve::{resolve, resolve_detailed};
use crate::storage::encoding::TextEncoding;
use crate::storage::results::{DirEntry, FileData, FileStat};
use crate::tree::{build_leaf_file, build_path};

/// A granted document tree seen as a filesystem
#[derive(Debug, Clone)]
pub struct TreeFs<G> {
    gateway: G,
}

impl<G: DocumentGateway> TreeFs<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// True iff `path` resolves to a directory. Invalid or unresolvable
    /// paths are simply reported as absent.
    pub fn dir_exists(&self, path: &str) -> bool {
        debug!("invoking dir_exists, path={}", path);
        let Some(handle) = resolve(&self.gateway, path) else {
            return false;
        };

        match self.gateway.stat(&handle) {
            Ok(stat) => stat.mime_type == MIME_TYPE_DIR,
            Err(e) => {
                warn!("Unable to query {}: {}", handle, e);
                false
            }
        }
    }

    pub fn stat(&self, path: &str) -> Result<FileStat, StorageError> {
        debug!("invoking stat, path={}", path);
        let handle = self.resolve_existing(path)?;
        let stat = self.gateway.stat(&handle)?;

        Ok(FileStat {
            kind: stat.kind(),
            name: stat.display_name,
            mime_type: stat.mime_type,
            size_bytes: stat.size_bytes,
            last_modified_millis: stat.last_modified_millis,
            path: path.to_string(),
        })
    }

    /// Lists a directory. An empty directory yields an empty vector.
    pub fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        debug!("invoking list_dir, path={}", path);
        let handle = self.resolve_existing(path)?;
        let children = self.gateway.list_children(&handle)?;

        let entries: Vec<DirEntry> = children
            .into_iter()
            .map(|child| {
                let child_path = match append_child(path, &child.name) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        warn!("Child of {} is not addressable: {}", path, e);
                        None
                    }
                };
                DirEntry {
                    kind: child.kind(),
                    name: child.name,
                    size_bytes: child.size_bytes,
                    last_modified_millis: child.last_modified_millis,
                    path: child_path,
                }
            })
            .collect();

        debug!("Listed {} - {} entries", path, entries.len());
        Ok(entries)
    }

    /// Reads a file as text in the declared encoding, or as raw bytes when
    /// no encoding is given
    pub fn read_file(&self, path: &str, encoding: Option<&str>) -> Result<FileData, StorageError> {
        debug!("invoking read_file, path={}", path);
        require(path, "path")?;
        let encoding = TextEncoding::from_name(encoding)?;
        let handle = self.resolve_existing(path)?;

        let mut reader = self.gateway.open_read(&handle)?;
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes) {
            error!("IO error while reading {}: {}", path, e);
            return Err(e.into());
        }

        Ok(match encoding {
            Some(encoding) => FileData::Text(encoding.decode(&bytes)),
            None => FileData::Bytes(bytes),
        })
    }

    /// Writes a file, creating it (and with `recursive`, any missing parent
    /// directories) first. An existing file is overwritten in place.
    ///
    /// Text is encoded with `encoding`, defaulting to UTF-8. Bytes are
    /// written as-is.
    pub fn write_file(
        &self,
        path: &str,
        data: &FileData,
        encoding: Option<&str>,
        recursive: bool,
    ) -> Result<EncodedPath, StorageError> {
        debug!("invoking write_file, path={}", path);
        require(path, "path")?;
        let encoding = TextEncoding::from_name(encoding)?;

        let handle = build_leaf_file(&self.gateway, path, recursive).map_err(|e| {
            error!("failed to create file {}: {}", path, e);
            tree_error(path, e)
        })?;

        let bytes = match data {
            FileData::Text(text) => encoding.unwrap_or(TextEncoding::Utf8).encode(text),
            FileData::Bytes(bytes) => bytes.clone(),
        };

        let mut writer = self.gateway.open_overwrite(&handle)?;
        writer.write_all(&bytes)?;
        writer.flush()?;

        info!("Wrote {} bytes to {}", bytes.len(), path);
        Ok(EncodedPath::from_raw(path.to_string()))
    }

    pub fn mkdir(&self, path: &str, recursive: bool) -> Result<(), StorageError> {
        debug!("invoking mkdir, path={}", path);
        require(path, "path")?;
        build_path(&self.gateway, path, recursive, false)
            .map(|_| ())
            .map_err(|e| tree_error(path, e))
    }

    pub fn delete(&self, path: &str) -> Result<(), StorageError> {
        debug!("invoking delete, path={}", path);
        require(path, "path")?;
        let handle = self.resolve_existing(path)?;
        self.gateway.delete(&handle)?;
        info!("Deleted {}", path);
        Ok(())
    }

    /// Renames an entry within its directory.
    ///
    /// `to` must be a sibling of `from`; moving across directories is
    /// rejected before anything is resolved. The grant root has no parent
    /// in the tree and cannot be renamed. The returned path has no
    /// trailing separator.
    pub fn rename(&self, from: &str, to: &str) -> Result<EncodedPath, StorageError> {
        if from.is_empty() || to.is_empty() {
            return Err(StorageError::MissingArgument("from or to"));
        }
        let from_components = split_components(from);
        let to_components = split_components(to);
        if from_components == to_components {
            return Err(StorageError::SameSourceAndTarget(from.to_string()));
        }
        if let Some(root) = [from, to].into_iter().find(|p| is_grant_root(p)) {
            return Err(StorageError::RootRename(root.to_string()));
        }
        if !is_sibling(from, to) {
            return Err(StorageError::CrossDirectoryRename {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let new_name = last_segment(to);
        validate_segment(new_name)?;

        debug!("invoking rename, from={} to={}", from, to);
        let handle = self.resolve_existing(from)?;
        let renamed = self.gateway.rename(&handle, new_name)?;
        debug!("renamed {} to {}", handle, renamed);
        Ok(EncodedPath::from_raw(to_components.join(SEPARATOR_STR)))
    }

    /// Copying is not supported by this backend
    pub fn copy(&self, from: &str, to: &str) -> Result<EncodedPath, StorageError> {
        if from.is_empty() || to.is_empty() {
            return Err(StorageError::MissingArgument("from or to"));
        }
        Err(StorageError::Unsupported("copy"))
    }

    fn resolve_existing(&self, path: &str) -> Result<ResourceHandle, StorageError> {
        match resolve_detailed(&self.gateway, path) {
            Ok(handle) => Ok(handle),
            Err(ResolveError::InvalidPath(p)) => Err(StorageError::InvalidPath(p)),
            Err(e) => {
                // absent and unreachable look the same to callers
                debug!("{}: {}", path, e);
                Err(StorageError::NotFound(path.to_string()))
            }
        }
    }
}

fn is_grant_root(path: &str) -> bool {
    PathPrefix::parse(path).is_some() && relative_segments(path).is_empty()
}

fn require(value: &str, name: &'static str) -> Result<(), StorageError> {
    if value.is_empty() {
        return Err(StorageError::MissingArgument(name));
    }
    Ok(())
}

fn tree_error(path: &str, error: TreeError) -> StorageError {
    match error {
        TreeError::InvalidPath(p) => StorageError::InvalidPath(p),
        TreeError::MissingIntermediate(name) => StorageError::CreateFailed(format!(
            "{}: intermediate directory {:?} does not exist",
            path, name
        )),
        TreeError::CreateFailed { source, .. } => StorageError::Provider(source),
    }
}
