//! Local directory provider
//!
//! Exposes one directory on disk as a granted tree. Document ids follow the
//! external-storage convention `volume:relative/path`, with the tree root
//! being `volume:` itself.

use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::ProviderError;
use crate::path::TreeGrant;
use crate::provider::content_type::mime_type_for_name;
use crate::provider::gateway::DocumentGateway;
use crate::provider::types::{ChildEntry, DocumentStat, MIME_TYPE_DIR, ResourceHandle};

/// Document provider backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalProvider {
    authority: String,
    volume: String,
    root: PathBuf,
}

impl LocalProvider {
    pub fn new(
        authority: impl Into<String>,
        volume: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            authority: authority.into(),
            volume: volume.into(),
            root: root.into(),
        }
    }

    /// Tree id, which is also the root document id
    pub fn tree_id(&self) -> String {
        format!("{}:", self.volume)
    }

    pub fn root_handle(&self) -> ResourceHandle {
        let tree_id = self.tree_id();
        ResourceHandle::new(&self.authority, &tree_id, &tree_id)
    }

    /// Grant for the whole tree.
    ///
    /// `label` overrides the display label; by default the root directory's
    /// own name is used.
    pub fn grant(&self, label: Option<&str>) -> TreeGrant {
        let label = match label {
            Some(label) => label.to_string(),
            None => display_name(&self.root),
        };
        let tree_id = self.tree_id();
        TreeGrant::new(&self.authority, &tree_id, &tree_id, label)
    }

    /// Maps a handle onto the filesystem, refusing anything that would
    /// leave the root.
    fn document_path(&self, handle: &ResourceHandle) -> Result<PathBuf, ProviderError> {
        if handle.authority() != self.authority || handle.tree_id() != self.tree_id() {
            return Err(ProviderError::NotFound(handle.to_string()));
        }
        let relative = self.relative_part(handle.document_id())?;

        let mut path = self.root.clone();
        if relative.is_empty() {
            return Ok(path);
        }
        for component in relative.split('/') {
            if !is_safe_name(component) {
                warn!("Rejected document id {}", handle.document_id());
                return Err(ProviderError::InvalidDocumentId(
                    handle.document_id().to_string(),
                ));
            }
            path.push(component);
        }
        Ok(path)
    }

    fn relative_part<'a>(&self, document_id: &'a str) -> Result<&'a str, ProviderError> {
        document_id
            .strip_prefix(self.volume.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| ProviderError::InvalidDocumentId(document_id.to_string()))
    }

    fn child_handle(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let relative = self.relative_part(parent.document_id())?;
        let document_id = if relative.is_empty() {
            format!("{}:{}", self.volume, name)
        } else {
            format!("{}:{}/{}", self.volume, relative, name)
        };
        Ok(parent.with_document(document_id))
    }

    fn checked_child(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<(PathBuf, ResourceHandle), ProviderError> {
        if !is_safe_name(name) {
            return Err(ProviderError::InvalidDocumentId(name.to_string()));
        }
        let dir = self.document_path(parent)?;
        if !dir.is_dir() {
            return Err(ProviderError::NotADirectory(parent.document_id().to_string()));
        }
        Ok((dir.join(name), self.child_handle(parent, name)?))
    }
}

/// Rejects empty names, `.`/`..` and anything carrying a separator
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn stat_path(path: &Path) -> Result<DocumentStat, ProviderError> {
    let metadata = fs::metadata(path)?;
    let display_name = display_name(path);
    let (mime_type, size_bytes) = if metadata.is_dir() {
        (MIME_TYPE_DIR.to_string(), 0)
    } else {
        (mime_type_for_name(&display_name).to_string(), metadata.len())
    };

    let last_modified_millis = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|dur| dur.as_millis() as i64)
        .unwrap_or(0);

    Ok(DocumentStat {
        display_name,
        mime_type,
        size_bytes,
        last_modified_millis,
    })
}

impl DocumentGateway for LocalProvider {
    fn list_children(&self, dir: &ResourceHandle) -> Result<Vec<ChildEntry>, ProviderError> {
        let path = self.document_path(dir)?;
        if !path.is_dir() {
            return Err(ProviderError::NotADirectory(dir.document_id().to_string()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let stat = match stat_path(&entry.path()) {
                Ok(stat) => stat,
                Err(e) => {
                    // Dangling symlinks and the like
                    debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            entries.push(ChildEntry {
                handle: self.child_handle(dir, &name)?,
                name,
                mime_type: stat.mime_type,
                size_bytes: stat.size_bytes,
                last_modified_millis: stat.last_modified_millis,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_directory(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let (path, handle) = self.checked_child(parent, name)?;
        fs::create_dir(&path)?;
        debug!("Created directory {}", path.display());
        Ok(handle)
    }

    fn create_file(
        &self,
        parent: &ResourceHandle,
        name: &str,
        mime_type: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let (path, handle) = self.checked_child(parent, name)?;
        OpenOptions::new().write(true).create_new(true).open(&path)?;
        debug!("Created file {} ({})", path.display(), mime_type);
        Ok(handle)
    }

    fn open_read(&self, handle: &ResourceHandle) -> Result<Box<dyn Read + Send>, ProviderError> {
        let path = self.document_path(handle)?;
        if path.is_dir() {
            return Err(ProviderError::NotFound(format!(
                "{} is a directory",
                handle.document_id()
            )));
        }
        Ok(Box::new(File::open(&path)?))
    }

    fn open_overwrite(
        &self,
        handle: &ResourceHandle,
    ) -> Result<Box<dyn Write + Send>, ProviderError> {
        let path = self.document_path(handle)?;
        if path.is_dir() {
            return Err(ProviderError::NotFound(format!(
                "{} is a directory",
                handle.document_id()
            )));
        }
        let file = OpenOptions::new().write(true).truncate(true).open(&path)?;
        Ok(Box::new(file))
    }

    fn delete(&self, handle: &ResourceHandle) -> Result<(), ProviderError> {
        let path = self.document_path(handle)?;
        if path == self.root {
            return Err(ProviderError::PermissionDenied(
                "the tree root cannot be deleted".into(),
            ));
        }
        if fs::symlink_metadata(&path)?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        debug!("Deleted {}", path.display());
        Ok(())
    }

    fn rename(
        &self,
        handle: &ResourceHandle,
        new_name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        if !is_safe_name(new_name) {
            return Err(ProviderError::InvalidDocumentId(new_name.to_string()));
        }
        let from = self.document_path(handle)?;
        if from == self.root {
            return Err(ProviderError::PermissionDenied(
                "the tree root cannot be renamed".into(),
            ));
        }
        if !from.exists() {
            return Err(ProviderError::NotFound(handle.document_id().to_string()));
        }
        let to = from.with_file_name(new_name);
        if to.exists() {
            return Err(ProviderError::AlreadyExists(new_name.to_string()));
        }
        fs::rename(&from, &to)?;

        let relative = self.relative_part(handle.document_id())?;
        let document_id = match relative.rsplit_once('/') {
            Some((parent, _)) => format!("{}:{}/{}", self.volume, parent, new_name),
            None => format!("{}:{}", self.volume, new_name),
        };
        Ok(handle.with_document(document_id))
    }

    fn stat(&self, handle: &ResourceHandle) -> Result<DocumentStat, ProviderError> {
        stat_path(&self.document_path(handle)?)
    }
}
