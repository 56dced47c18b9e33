//! In-memory document provider
//!
//! A complete [`DocumentGateway`] kept in a mutex-guarded map. Useful for
//! embedding and for exercising the resolver without a real provider. Two
//! hooks exist for tests: creation calls are counted, and any document can
//! be marked unreachable so that provider calls touching it fail.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ProviderError;
use crate::path::TreeGrant;
use crate::provider::gateway::DocumentGateway;
use crate::provider::types::{ChildEntry, DocumentStat, MIME_TYPE_DIR, ResourceHandle};

#[derive(Debug)]
enum NodeKind {
    Directory { children: Vec<String> },
    File { mime_type: String, content: Vec<u8> },
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<String>,
    kind: NodeKind,
    last_modified_millis: i64,
}

#[derive(Debug, Default)]
struct State {
    nodes: HashMap<String, Node>,
    unreachable: HashSet<String>,
    next_id: u64,
    clock: i64,
    creations: usize,
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn check_reachable(&self, document_id: &str) -> Result<(), ProviderError> {
        if self.unreachable.contains(document_id) {
            return Err(ProviderError::Unreachable(document_id.to_string()));
        }
        Ok(())
    }

    fn node(&self, document_id: &str) -> Result<&Node, ProviderError> {
        self.check_reachable(document_id)?;
        self.nodes
            .get(document_id)
            .ok_or_else(|| ProviderError::NotFound(document_id.to_string()))
    }

    fn children(&self, document_id: &str) -> Result<&[String], ProviderError> {
        match &self.node(document_id)?.kind {
            NodeKind::Directory { children } => Ok(children),
            NodeKind::File { .. } => Err(ProviderError::NotADirectory(document_id.to_string())),
        }
    }

    fn insert_child(&mut self, parent_id: &str, name: &str, kind: NodeKind) -> String {
        self.next_id += 1;
        let id = format!("doc-{}", self.next_id);
        let now = self.tick();
        self.nodes.insert(
            id.clone(),
            Node {
                name: name.to_string(),
                parent: Some(parent_id.to_string()),
                kind,
                last_modified_millis: now,
            },
        );
        if let Some(Node {
            kind: NodeKind::Directory { children },
            last_modified_millis,
            ..
        }) = self.nodes.get_mut(parent_id)
        {
            children.push(id.clone());
            *last_modified_millis = now;
        }
        id
    }

    /// Creates a child, rejecting a name already taken in the parent
    fn create_child(
        &mut self,
        parent_id: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<String, ProviderError> {
        let taken = self
            .children(parent_id)?
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .any(|child| child.name == name);
        if taken {
            return Err(ProviderError::AlreadyExists(name.to_string()));
        }
        self.creations += 1;
        Ok(self.insert_child(parent_id, name, kind))
    }

    fn remove_subtree(&mut self, document_id: &str) {
        if let Some(node) = self.nodes.remove(document_id) {
            if let NodeKind::Directory { children } = node.kind {
                for child in children {
                    self.remove_subtree(&child);
                }
            }
        }
    }

    fn stat_of(&self, node: &Node) -> DocumentStat {
        let (mime_type, size_bytes) = match &node.kind {
            NodeKind::Directory { .. } => (MIME_TYPE_DIR.to_string(), 0),
            NodeKind::File { mime_type, content } => (mime_type.clone(), content.len() as u64),
        };
        DocumentStat {
            display_name: node.name.clone(),
            mime_type,
            size_bytes,
            last_modified_millis: node.last_modified_millis,
        }
    }
}

/// Document provider living entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    authority: String,
    tree_id: String,
    state: Arc<Mutex<State>>,
}

impl MemoryProvider {
    /// Creates a provider holding one granted tree whose root directory is
    /// named `root_label`. The root's document id equals the tree id.
    pub fn new(
        authority: impl Into<String>,
        tree_id: impl Into<String>,
        root_label: impl Into<String>,
    ) -> Self {
        let tree_id = tree_id.into();
        let mut state = State::default();
        state.nodes.insert(
            tree_id.clone(),
            Node {
                name: root_label.into(),
                parent: None,
                kind: NodeKind::Directory {
                    children: Vec::new(),
                },
                last_modified_millis: 0,
            },
        );

        Self {
            authority: authority.into(),
            tree_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn root_handle(&self) -> ResourceHandle {
        ResourceHandle::new(&self.authority, &self.tree_id, &self.tree_id)
    }

    /// Grant for the tree, labelled with the root directory's name
    pub fn grant(&self) -> TreeGrant {
        let label = self
            .lock()
            .nodes
            .get(&self.tree_id)
            .map(|root| root.name.clone())
            .unwrap_or_default();
        TreeGrant::new(&self.authority, &self.tree_id, &self.tree_id, label)
    }

    /// Adds a directory without the duplicate-name check, so name
    /// collisions can be staged.
    pub fn add_directory(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let mut state = self.lock();
        let parent_id = self.document_id(parent)?;
        state.children(parent_id)?;
        let id = state.insert_child(
            parent_id,
            name,
            NodeKind::Directory {
                children: Vec::new(),
            },
        );
        Ok(parent.with_document(id))
    }

    /// Adds a file without the duplicate-name check.
    pub fn add_file(
        &self,
        parent: &ResourceHandle,
        name: &str,
        content: &[u8],
    ) -> Result<ResourceHandle, ProviderError> {
        let mut state = self.lock();
        let parent_id = self.document_id(parent)?;
        state.children(parent_id)?;
        let id = state.insert_child(
            parent_id,
            name,
            NodeKind::File {
                mime_type: crate::provider::content_type::mime_type_for_name(name).to_string(),
                content: content.to_vec(),
            },
        );
        Ok(parent.with_document(id))
    }

    /// Makes every provider call touching `handle` fail
    pub fn set_unreachable(&self, handle: &ResourceHandle, unreachable: bool) {
        let mut state = self.lock();
        let id = handle.document_id().to_string();
        if unreachable {
            state.unreachable.insert(id);
        } else {
            state.unreachable.remove(&id);
        }
    }

    /// Number of successful `create_directory`/`create_file` calls
    pub fn creation_count(&self) -> usize {
        self.lock().creations
    }

    /// Names of a directory's children, in insertion order
    pub fn child_names(&self, dir: &ResourceHandle) -> Vec<String> {
        let state = self.lock();
        match state.children(dir.document_id()) {
            Ok(children) => children
                .iter()
                .filter_map(|id| state.nodes.get(id))
                .map(|node| node.name.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Raw content of a file, bypassing reachability checks
    pub fn content(&self, handle: &ResourceHandle) -> Option<Vec<u8>> {
        match &self.lock().nodes.get(handle.document_id())?.kind {
            NodeKind::File { content, .. } => Some(content.clone()),
            NodeKind::Directory { .. } => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn document_id<'h>(&self, handle: &'h ResourceHandle) -> Result<&'h str, ProviderError> {
        if handle.authority() != self.authority || handle.tree_id() != self.tree_id {
            return Err(ProviderError::NotFound(handle.to_string()));
        }
        Ok(handle.document_id())
    }
}

impl DocumentGateway for MemoryProvider {
    fn list_children(&self, dir: &ResourceHandle) -> Result<Vec<ChildEntry>, ProviderError> {
        let state = self.lock();
        let dir_id = self.document_id(dir)?;
        let entries = state
            .children(dir_id)?
            .iter()
            .filter_map(|id| state.nodes.get(id).map(|node| (id, node)))
            .map(|(id, node)| {
                let stat = state.stat_of(node);
                ChildEntry {
                    name: stat.display_name,
                    mime_type: stat.mime_type,
                    size_bytes: stat.size_bytes,
                    last_modified_millis: stat.last_modified_millis,
                    handle: dir.with_document(id.clone()),
                }
            })
            .collect();
        Ok(entries)
    }

    fn create_directory(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let mut state = self.lock();
        let parent_id = self.document_id(parent)?;
        let id = state.create_child(
            parent_id,
            name,
            NodeKind::Directory {
                children: Vec::new(),
            },
        )?;
        debug!("memory provider: created directory {} as {}", name, id);
        Ok(parent.with_document(id))
    }

    fn create_file(
        &self,
        parent: &ResourceHandle,
        name: &str,
        mime_type: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let mut state = self.lock();
        let parent_id = self.document_id(parent)?;
        let id = state.create_child(
            parent_id,
            name,
            NodeKind::File {
                mime_type: mime_type.to_string(),
                content: Vec::new(),
            },
        )?;
        debug!("memory provider: created file {} ({}) as {}", name, mime_type, id);
        Ok(parent.with_document(id))
    }

    fn open_read(&self, handle: &ResourceHandle) -> Result<Box<dyn Read + Send>, ProviderError> {
        let state = self.lock();
        let id = self.document_id(handle)?;
        match &state.node(id)?.kind {
            NodeKind::File { content, .. } => Ok(Box::new(Cursor::new(content.clone()))),
            NodeKind::Directory { .. } => Err(ProviderError::NotFound(format!(
                "{} is a directory",
                id
            ))),
        }
    }

    fn open_overwrite(
        &self,
        handle: &ResourceHandle,
    ) -> Result<Box<dyn Write + Send>, ProviderError> {
        let mut state = self.lock();
        let id = self.document_id(handle)?;
        state.check_reachable(id)?;
        let now = state.tick();
        match state.nodes.get_mut(id) {
            Some(Node {
                kind: NodeKind::File { content, .. },
                last_modified_millis,
                ..
            }) => {
                content.clear();
                *last_modified_millis = now;
            }
            Some(_) => return Err(ProviderError::NotFound(format!("{} is a directory", id))),
            None => return Err(ProviderError::NotFound(id.to_string())),
        }

        Ok(Box::new(MemoryWriter {
            state: Arc::clone(&self.state),
            document_id: id.to_string(),
        }))
    }

    fn delete(&self, handle: &ResourceHandle) -> Result<(), ProviderError> {
        let mut state = self.lock();
        let id = self.document_id(handle)?;
        let parent = state.node(id)?.parent.clone();
        let Some(parent_id) = parent else {
            return Err(ProviderError::PermissionDenied(
                "the tree root cannot be deleted".into(),
            ));
        };

        state.remove_subtree(id);
        let now = state.tick();
        if let Some(Node {
            kind: NodeKind::Directory { children },
            last_modified_millis,
            ..
        }) = state.nodes.get_mut(&parent_id)
        {
            children.retain(|child| child != id);
            *last_modified_millis = now;
        }
        Ok(())
    }

    fn rename(
        &self,
        handle: &ResourceHandle,
        new_name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        let mut state = self.lock();
        let id = self.document_id(handle)?;
        if let Some(parent_id) = state.node(id)?.parent.clone() {
            let taken = state
                .children(&parent_id)?
                .iter()
                .filter(|child| child.as_str() != id)
                .filter_map(|child| state.nodes.get(child))
                .any(|child| child.name == new_name);
            if taken {
                return Err(ProviderError::AlreadyExists(new_name.to_string()));
            }
        }

        let now = state.tick();
        if let Some(node) = state.nodes.get_mut(id) {
            node.name = new_name.to_string();
            node.last_modified_millis = now;
        }
        Ok(handle.clone())
    }

    fn stat(&self, handle: &ResourceHandle) -> Result<DocumentStat, ProviderError> {
        let state = self.lock();
        let id = self.document_id(handle)?;
        let node = state.node(id)?;
        Ok(state.stat_of(node))
    }
}

/// Appends into a file node on every write
struct MemoryWriter {
    state: Arc<Mutex<State>>,
    document_id: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.nodes.get_mut(&self.document_id) {
            Some(Node {
                kind: NodeKind::File { content, .. },
                ..
            }) => {
                content.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("document {} vanished while writing", self.document_id),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
