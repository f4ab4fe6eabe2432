use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of one path when comparing two tree snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only in the newer tree.
    Added,
    /// Present only in the older tree.
    Removed,
    /// Present in both with different blob ids.
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// One entry in a diff result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Path within the tree.
    pub path: String,
    /// How the path changed between the two trees.
    pub kind: ChangeKind,
}

impl Change {
    /// Convenience constructor.
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(ChangeKind::Added.to_string(), "added");
        assert_eq!(ChangeKind::Removed.to_string(), "removed");
        assert_eq!(ChangeKind::Modified.to_string(), "modified");
    }
}
