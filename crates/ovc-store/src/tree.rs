//! Tree snapshots: one commit's path → blob mapping.
//!
//! A tree is built from a flat list of uploaded files, serialized as a
//! self-describing JSON mapping, and stored as a single blob. The commit
//! record references that blob's id.

use std::collections::BTreeMap;

use ovc_types::{BlobId, FileEntry};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// One uploaded file, ready to be placed in a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeFile {
    pub path: String,
    pub blob_id: BlobId,
    pub size: u64,
}

impl TreeFile {
    pub fn new(path: impl Into<String>, blob_id: BlobId, size: u64) -> Self {
        Self {
            path: path.into(),
            blob_id,
            size,
        }
    }
}

/// A directory-tree snapshot: relative path → file entry.
///
/// Paths are unique by construction (BTreeMap keys) and iteration order is
/// deterministic, so serialization is stable for identical contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: BTreeMap<String, FileEntry>,
}

impl Tree {
    /// The empty tree, used by the root commit.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tree from uploaded files.
    ///
    /// Entry names are derived from the last path segment. Duplicate paths
    /// are rejected; a tree with two bindings for one path has no coherent
    /// meaning.
    pub fn build(files: Vec<TreeFile>) -> StoreResult<Self> {
        let mut entries = BTreeMap::new();
        for file in files {
            let entry = FileEntry::file(file.path, file.blob_id, file.size)?;
            if entries.contains_key(&entry.path) {
                return Err(StoreError::DuplicatePath(entry.path));
            }
            entries.insert(entry.path.clone(), entry);
        }
        Ok(Self { entries })
    }

    /// Serialize to the self-describing byte form.
    pub fn serialize(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Codec(e.to_string()))
    }

    /// Parse bytes produced by [`serialize`](Tree::serialize).
    ///
    /// Tree blobs come from the remote store and may not have been built by
    /// this code, so every entry path is re-validated; a path with `..`,
    /// `.`, or absolute segments fails the parse.
    pub fn parse(bytes: &[u8]) -> StoreResult<Self> {
        let tree: Self =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))?;
        for entry in tree.entries.values() {
            entry.validate()?;
        }
        Ok(tree)
    }

    /// Look up an entry by path.
    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    /// Entries in path order.
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for the empty tree.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn files() -> Vec<TreeFile> {
        vec![
            TreeFile::new("a.txt", BlobId::new("blob-a"), 2),
            TreeFile::new("src/lib.rs", BlobId::new("blob-lib"), 120),
        ]
    }

    #[test]
    fn build_derives_names() {
        let tree = Tree::build(files()).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("src/lib.rs").unwrap().name, "lib.rs");
        assert_eq!(tree.get("a.txt").unwrap().size, 2);
    }

    #[test]
    fn duplicate_paths_rejected() {
        let dup = vec![
            TreeFile::new("a.txt", BlobId::new("b1"), 1),
            TreeFile::new("a.txt", BlobId::new("b2"), 2),
        ];
        assert!(matches!(
            Tree::build(dup).unwrap_err(),
            StoreError::DuplicatePath(_)
        ));
    }

    #[test]
    fn serialize_parse_roundtrip() {
        let tree = Tree::build(files()).unwrap();
        let bytes = tree.serialize().unwrap();
        assert_eq!(Tree::parse(&bytes).unwrap(), tree);
    }

    #[test]
    fn empty_tree_roundtrip() {
        let tree = Tree::empty();
        assert!(tree.is_empty());
        let bytes = tree.serialize().unwrap();
        assert_eq!(Tree::parse(&bytes).unwrap(), tree);
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut reversed = files();
        reversed.reverse();
        let a = Tree::build(files()).unwrap().serialize().unwrap();
        let b = Tree::build(reversed).unwrap().serialize().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(matches!(
            Tree::parse(b"not a tree").unwrap_err(),
            StoreError::Codec(_)
        ));
    }

    #[test]
    fn escaping_paths_rejected_at_build_and_parse() {
        let err = Tree::build(vec![TreeFile::new("../evil", BlobId::new("b"), 1)]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEntry(_)));

        // A well-formed JSON tree whose entry path climbs out of the
        // checkout destination must fail to parse.
        let hostile = r#"{"entries":{"../evil":{"path":"../evil","name":"evil","kind":"file","blob_id":"b-1","size":1}}}"#;
        assert!(matches!(
            Tree::parse(hostile.as_bytes()).unwrap_err(),
            StoreError::InvalidEntry(_)
        ));
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_trees(
            paths in proptest::collection::btree_set("[a-z]{1,8}(/[a-z]{1,8}){0,2}", 1..16),
            sizes in proptest::collection::vec(0u64..1_000_000, 16),
        ) {
            let files: Vec<TreeFile> = paths
                .iter()
                .zip(&sizes)
                .map(|(p, s)| TreeFile::new(p.clone(), BlobId::new(format!("b-{p}")), *s))
                .collect();
            let tree = Tree::build(files).unwrap();
            let parsed = Tree::parse(&tree.serialize().unwrap()).unwrap();
            prop_assert_eq!(parsed, tree);
        }
    }
}
