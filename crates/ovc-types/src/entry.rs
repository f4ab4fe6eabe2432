use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::BlobId;

/// The kind of a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Regular file whose content lives in the blob store.
    File,
    /// Directory marker. Carries no blob content of its own.
    Directory,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// One path → blob binding inside a tree snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Relative path within the snapshot, unique per tree.
    pub path: String,
    /// Last path segment.
    pub name: String,
    /// File or directory.
    pub kind: FileKind,
    /// Blob holding the content (meaningless for directories).
    pub blob_id: BlobId,
    /// Content size in bytes.
    pub size: u64,
}

impl FileEntry {
    /// Build a file entry, deriving `name` from the last path segment.
    ///
    /// Fails on empty paths and on paths ending in a separator (no final
    /// segment to take the name from).
    pub fn file(path: impl Into<String>, blob_id: BlobId, size: u64) -> Result<Self, TypeError> {
        let path = path.into();
        let name = last_segment(&path)?;
        Ok(Self {
            path,
            name,
            kind: FileKind::File,
            blob_id,
            size,
        })
    }

    /// Returns `true` for regular file entries.
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Re-check the path invariants on an entry not built through
    /// [`file`](Self::file), e.g. one deserialized from an untrusted tree
    /// blob.
    pub fn validate(&self) -> Result<(), TypeError> {
        last_segment(&self.path).map(|_| ())
    }
}

fn last_segment(path: &str) -> Result<String, TypeError> {
    if path.is_empty() || path.starts_with('/') {
        return Err(TypeError::InvalidPath(path.to_string()));
    }
    let mut last = "";
    for segment in path.split('/') {
        // Empty, `.`, and `..` segments would let a materialized tree
        // escape its checkout destination.
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(TypeError::InvalidPath(path.to_string()));
        }
        last = segment;
    }
    Ok(last.to_string())
}
