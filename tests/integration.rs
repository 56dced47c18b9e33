use std::io::{Read, Write};
use std::sync::Arc;

use docpath::error::{ProviderError, StorageError, TreeError};
use docpath::path::{
    EncodedPath, TreeGrant, append_child, decode_component, decode_root, encode_component,
    encode_root, is_sibling, relative_segments,
};
use docpath::provider::{
    ChildEntry, DocumentGateway, DocumentStat, EntryKind, LocalProvider, MemoryProvider,
    ResourceHandle,
};
use docpath::resolve::resolve;
use docpath::storage::{FileData, TreeFs};
use docpath::tree::{build_path, ensure_leaf_file, ensure_path};
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (Arc<MemoryProvider>, String) {
    init_logging();
    let provider = Arc::new(MemoryProvider::new("prov", "Test", "MyNotes"));
    let root = provider_root(&provider);
    (provider, root)
}

fn provider_root(provider: &MemoryProvider) -> String {
    encode_root(&provider.grant()).unwrap().into_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_component_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let encoded = encode_component(&bytes);
        prop_assert!(!encoded.contains('/'));
        prop_assert_eq!(decode_component(&encoded), Some(bytes));
    }

    #[test]
    fn test_root_roundtrip(
        authority in "[a-z][a-z0-9.]{0,40}",
        tree_id in any::<String>(),
        root_id in any::<String>(),
        label in any::<String>(),
    ) {
        let grant = TreeGrant::new(authority.clone(), tree_id.clone(), root_id.clone(), label);
        let root = encode_root(&grant).unwrap();
        prop_assert_eq!(decode_root(root.as_str()), Some((authority, tree_id, root_id)));
        prop_assert!(relative_segments(root.as_str()).is_empty());
    }

    #[test]
    fn test_appended_children_keep_order(a in "[^/]{1,20}", b in "[^/]{1,20}") {
        let grant = TreeGrant::new("prov", "Test", "Root", "MyNotes");
        let root = encode_root(&grant).unwrap();
        let path = append_child(root.as_str(), &a).unwrap();
        let path = append_child(path.as_str(), &b).unwrap();
        prop_assert_eq!(relative_segments(path.as_str()), vec![a.as_str(), b.as_str()]);
    }

    #[test]
    fn test_garbage_never_panics(input in any::<String>()) {
        let _ = decode_root(&input);
        let _ = relative_segments(&input);
    }
}

#[test]
fn test_sibling_corner_cases() {
    assert!(is_sibling("file://A/T/R/L/x", "file://A/T/R/L/y"));
    assert!(!is_sibling("file://A/T/R/L/x", "file://A/T/R/L/d/y"));
    assert!(is_sibling("file://A/T/R/L/x", "file://A/T/R/L/x"));
}

#[test]
fn test_root_path_matches_documented_form() {
    let grant = TreeGrant::new("prov", "Test", "Root", "MyNotes");
    assert_eq!(encode_root(&grant).unwrap().as_str(), "file://prov/VGVzdA/Um9vdA/MyNotes");
}

// Scenario 1: a leaf file and its parent directory are created once, and a
// second call reuses them.
#[test]
fn test_ensure_leaf_file_is_idempotent() {
    let (provider, root) = setup();
    let path = format!("{root}/journal/2024.md");

    let first = ensure_leaf_file(&*provider, &path, true).unwrap();
    assert_eq!(provider.creation_count(), 2);
    assert_eq!(provider.child_names(&provider.root_handle()), vec!["journal"]);

    let second = ensure_leaf_file(&*provider, &path, true).unwrap();
    assert_eq!(first, second);
    assert_eq!(provider.creation_count(), 2);
    assert_eq!(resolve(&*provider, &path), Some(first));
}

// Scenario 2: a missing intermediate without recursion creates nothing.
#[test]
fn test_missing_intermediate_creates_nothing() {
    let (provider, root) = setup();
    let a = provider.add_directory(&provider.root_handle(), "a").unwrap();

    assert_eq!(ensure_path(&*provider, &format!("{root}/a/b/c"), false, false), None);
    assert!(provider.child_names(&a).is_empty());
    assert_eq!(provider.creation_count(), 0);
}

// Scenario 3: renames across directories are rejected up front.
#[test]
fn test_cross_directory_rename_rejected() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));

    let err = fs
        .rename(&format!("{root}/dir/old.md"), &format!("{root}/dir2/new.md"))
        .unwrap_err();
    assert!(matches!(err, StorageError::CrossDirectoryRename { .. }));
}

// Scenario 4: an empty directory lists as an empty vector.
#[test]
fn test_empty_directory_lists_empty() {
    let (provider, root) = setup();
    provider.add_directory(&provider.root_handle(), "empty").unwrap();
    let fs = TreeFs::new(Arc::clone(&provider));

    assert!(fs.list_dir(&format!("{root}/empty")).unwrap().is_empty());
    assert!(fs.list_dir(&root).unwrap().len() == 1);
}

#[test]
fn test_resolving_beyond_existing_chain() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    fs.mkdir(&format!("{root}/a/b"), true).unwrap();

    assert!(resolve(&*provider, &format!("{root}/a/b")).is_some());
    assert!(resolve(&*provider, &format!("{root}/a/b/c")).is_none());
    assert!(matches!(
        fs.stat(&format!("{root}/a/b/c")),
        Err(StorageError::NotFound(_))
    ));
}

#[test]
fn test_write_then_read_text_and_bytes() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    let page = format!("{root}/pages/today.md");

    let written = fs
        .write_file(&page, &FileData::Text("- hello".into()), Some("utf8"), true)
        .unwrap();
    assert_eq!(written.as_str(), page);
    assert_eq!(fs.read_file(&page, Some("utf8")).unwrap(), FileData::Text("- hello".into()));

    // overwrite truncates
    fs.write_file(&page, &FileData::Bytes(vec![1, 2]), None, false).unwrap();
    assert_eq!(fs.read_file(&page, None).unwrap(), FileData::Bytes(vec![1, 2]));

    let stat = fs.stat(&page).unwrap();
    assert_eq!(stat.kind, EntryKind::File);
    assert_eq!(stat.size_bytes, 2);
    assert_eq!(stat.mime_type, "text/markdown");
}

#[test]
fn test_write_without_recursive_needs_parent() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));

    let err = fs
        .write_file(
            &format!("{root}/missing/deeper/x.md"),
            &FileData::Text("x".into()),
            None,
            false,
        )
        .unwrap_err();
    assert!(matches!(err, StorageError::CreateFailed(_)));
    assert_eq!(provider.creation_count(), 0);

    // a single missing parent is the last directory segment, so it is created
    fs.write_file(
        &format!("{root}/missing/x.md"),
        &FileData::Text("x".into()),
        None,
        false,
    )
    .unwrap();
    assert_eq!(provider.creation_count(), 2);
}

#[test]
fn test_preconditions_checked_before_provider() {
    let (provider, root) = setup();
    provider.set_unreachable(&provider.root_handle(), true);
    let fs = TreeFs::new(Arc::clone(&provider));
    let page = format!("{root}/a.md");

    assert!(matches!(
        fs.read_file(&page, Some("latin1")),
        Err(StorageError::UnsupportedEncoding(_))
    ));
    assert!(matches!(
        fs.write_file(&page, &FileData::Text("x".into()), Some("ebcdic"), true),
        Err(StorageError::UnsupportedEncoding(_))
    ));
    assert!(matches!(fs.rename(&page, &page), Err(StorageError::SameSourceAndTarget(_))));
    assert!(matches!(fs.rename("", &page), Err(StorageError::MissingArgument(_))));
    assert!(matches!(fs.rename("/notes/a.md", "/notes/b.md"), Err(StorageError::InvalidPath(_))));
    assert!(matches!(fs.mkdir("", false), Err(StorageError::MissingArgument(_))));
    assert!(matches!(fs.copy(&page, &format!("{root}/b.md")), Err(StorageError::Unsupported(_))));
}

#[test]
fn test_invalid_paths_are_rejections() {
    let (provider, _) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));

    assert!(!fs.dir_exists("/sdcard/notes"));
    assert!(!fs.dir_exists("file://prov/VGVzdA"));
    assert!(matches!(fs.stat("file://prov/VGVzdA"), Err(StorageError::InvalidPath(_))));
    assert!(matches!(fs.list_dir("content://x"), Err(StorageError::InvalidPath(_))));
    assert!(matches!(fs.delete("relative/path"), Err(StorageError::InvalidPath(_))));
}

#[test]
fn test_dir_exists() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    fs.write_file(&format!("{root}/d/f.md"), &FileData::Text(String::new()), None, true).unwrap();

    assert!(fs.dir_exists(&root));
    assert!(fs.dir_exists(&format!("{root}/d")));
    assert!(!fs.dir_exists(&format!("{root}/d/f.md")));
    assert!(!fs.dir_exists(&format!("{root}/nope")));
}

#[test]
fn test_rename_within_directory() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    let old = format!("{root}/dir/old.md");
    let new = format!("{root}/dir/new.md");
    fs.write_file(&old, &FileData::Text("body".into()), None, true).unwrap();

    let renamed = fs.rename(&old, &new).unwrap();
    assert_eq!(renamed.as_str(), new);
    assert!(matches!(fs.stat(&old), Err(StorageError::NotFound(_))));
    assert_eq!(fs.read_file(&new, Some("utf8")).unwrap(), FileData::Text("body".into()));

    // source vanished
    assert!(matches!(fs.rename(&old, &new), Err(StorageError::NotFound(_))));
}

#[test]
fn test_grant_root_cannot_be_renamed() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    let relabelled = root.replace("MyNotes", "Hijacked");

    assert!(matches!(fs.rename(&root, &relabelled), Err(StorageError::RootRename(_))));
    assert!(matches!(
        fs.rename(&format!("{root}/"), &relabelled),
        Err(StorageError::RootRename(_))
    ));
    assert_eq!(fs.stat(&root).unwrap().name, "MyNotes");

    // a file one level down is not a sibling of the root
    fs.write_file(&format!("{root}/a.md"), &FileData::Text(String::new()), None, false).unwrap();
    assert!(matches!(
        fs.rename(&format!("{root}/a.md"), &relabelled),
        Err(StorageError::RootRename(_))
    ));
    assert_eq!(provider.child_names(&provider.root_handle()), vec!["a.md"]);
}

#[test]
fn test_rename_ignores_trailing_separator() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    let page = format!("{root}/dir/x.md");
    fs.write_file(&page, &FileData::Text("x".into()), None, true).unwrap();

    // the provider is never consulted for an identical target
    provider.set_unreachable(&provider.root_handle(), true);
    assert!(matches!(
        fs.rename(&page, &format!("{page}/")),
        Err(StorageError::SameSourceAndTarget(_))
    ));
    provider.set_unreachable(&provider.root_handle(), false);

    let renamed = fs.rename(&page, &format!("{root}/dir/y.md/")).unwrap();
    assert_eq!(renamed.as_str(), format!("{root}/dir/y.md"));
    assert!(fs.stat(&format!("{root}/dir/y.md")).is_ok());
}

#[test]
fn test_delete_directory() {
    let (provider, root) = setup();
    let fs = TreeFs::new(Arc::clone(&provider));
    fs.mkdir(&format!("{root}/a/b"), true).unwrap();

    fs.delete(&format!("{root}/a")).unwrap();
    assert!(!fs.dir_exists(&format!("{root}/a")));
    assert!(fs.list_dir(&root).unwrap().is_empty());
}

#[test]
fn test_listing_entries_carry_child_paths() {
    let (provider, root) = setup();
    let dir = provider.add_directory(&provider.root_handle(), "dir").unwrap();
    provider.add_file(&dir, "a.md", b"abc").unwrap();
    provider.add_file(&dir, "odd/name", b"").unwrap();
    let fs = TreeFs::new(Arc::clone(&provider));

    let entries = fs.list_dir(&format!("{root}/dir/")).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.md");
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[0].size_bytes, 3);
    assert_eq!(
        entries[0].path.as_ref().map(EncodedPath::as_str),
        Some(format!("{root}/dir/a.md").as_str())
    );
    // a name carrying the separator cannot be addressed
    assert_eq!(entries[1].path, None);
}

/// Delegates to a memory provider but refuses to create directories with a
/// given name
struct RejectingProvider {
    inner: MemoryProvider,
    reject: &'static str,
}

impl DocumentGateway for RejectingProvider {
    fn list_children(&self, dir: &ResourceHandle) -> Result<Vec<ChildEntry>, ProviderError> {
        self.inner.list_children(dir)
    }

    fn create_directory(
        &self,
        parent: &ResourceHandle,
        name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        if name == self.reject {
            return Err(ProviderError::PermissionDenied(name.to_string()));
        }
        self.inner.create_directory(parent, name)
    }

    fn create_file(
        &self,
        parent: &ResourceHandle,
        name: &str,
        mime_type: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        self.inner.create_file(parent, name, mime_type)
    }

    fn open_read(&self, handle: &ResourceHandle) -> Result<Box<dyn Read + Send>, ProviderError> {
        self.inner.open_read(handle)
    }

    fn open_overwrite(
        &self,
        handle: &ResourceHandle,
    ) -> Result<Box<dyn Write + Send>, ProviderError> {
        self.inner.open_overwrite(handle)
    }

    fn delete(&self, handle: &ResourceHandle) -> Result<(), ProviderError> {
        self.inner.delete(handle)
    }

    fn rename(
        &self,
        handle: &ResourceHandle,
        new_name: &str,
    ) -> Result<ResourceHandle, ProviderError> {
        self.inner.rename(handle, new_name)
    }

    fn stat(&self, handle: &ResourceHandle) -> Result<DocumentStat, ProviderError> {
        self.inner.stat(handle)
    }
}

#[test]
fn test_failed_chain_keeps_earlier_directories() {
    init_logging();
    let inner = MemoryProvider::new("prov", "Test", "MyNotes");
    let root = provider_root(&inner);
    let provider = RejectingProvider {
        inner: inner.clone(),
        reject: "boom",
    };

    let err = build_path(&provider, &format!("{root}/a/b/boom/c"), true, false).unwrap_err();
    assert!(matches!(
        err,
        TreeError::CreateFailed {
            ref name,
            source: ProviderError::PermissionDenied(_),
        } if name == "boom"
    ));
    // no rollback
    assert!(resolve(&inner, &format!("{root}/a/b")).is_some());
    assert_eq!(inner.creation_count(), 2);
}

#[test]
fn test_concurrent_creators_are_arbitrated_by_provider() {
    let (provider, root) = setup();
    let fs = Arc::new(TreeFs::new(Arc::clone(&provider)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fs = Arc::clone(&fs);
            let path = format!("{root}/shared");
            std::thread::spawn(move || fs.mkdir(&path, false).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert!(successes >= 1);
    assert_eq!(provider.child_names(&provider.root_handle()), vec!["shared"]);
}

#[test]
fn test_local_provider_end_to_end() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let provider =
        LocalProvider::new("com.android.externalstorage.documents", "primary", dir.path());
    let root = encode_root(&provider.grant(Some("Notes"))).unwrap();
    let fs = TreeFs::new(provider);

    let page = root.join("journal").unwrap().join("2024.md").unwrap();
    fs.write_file(page.as_str(), &FileData::Text("héllo".into()), Some("utf16"), true).unwrap();

    let on_disk = std::fs::read(dir.path().join("journal/2024.md")).unwrap();
    assert_eq!(&on_disk[..2], &[0xFE, 0xFF]);
    assert_eq!(fs.read_file(page.as_str(), Some("utf16")).unwrap(), FileData::Text("héllo".into()));

    let entries = fs.list_dir(root.as_str()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Directory);

    let renamed = root.join("journal").unwrap().join("2025.md").unwrap();
    fs.rename(page.as_str(), renamed.as_str()).unwrap();
    assert!(dir.path().join("journal/2025.md").exists());

    fs.delete(root.join("journal").unwrap().as_str()).unwrap();
    assert!(!dir.path().join("journal").exists());
}
