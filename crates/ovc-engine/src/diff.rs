//! Tree comparison: classify every path in the union of two snapshots.

use std::collections::BTreeSet;

use ovc_store::Tree;
use ovc_types::{Change, ChangeKind};

/// Compare two trees and classify each changed path.
///
/// Paths present in both trees with equal blob ids are omitted. The result
/// is ordered by path.
pub fn diff_trees(old: &Tree, new: &Tree) -> Vec<Change> {
    let paths: BTreeSet<&str> = old.paths().chain(new.paths()).collect();
    let mut changes = Vec::new();
    for path in paths {
        let kind = match (old.get(path), new.get(path)) {
            (None, Some(_)) => Some(ChangeKind::Added),
            (Some(_), None) => Some(ChangeKind::Removed),
            (Some(a), Some(b)) if a.blob_id != b.blob_id => Some(ChangeKind::Modified),
            _ => None,
        };
        if let Some(kind) = kind {
            changes.push(Change::new(path, kind));
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovc_store::TreeFile;
    use ovc_types::BlobId;

    fn tree(files: &[(&str, &str)]) -> Tree {
        Tree::build(
            files
                .iter()
                .map(|(p, b)| TreeFile::new(*p, BlobId::new(*b), 1))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn identical_trees_have_no_changes() {
        let t = tree(&[("a", "b1"), ("b", "b2")]);
        assert!(diff_trees(&t, &t).is_empty());
    }

    #[test]
    fn empty_to_populated_is_all_added() {
        let new = tree(&[("a", "b1"), ("z", "b2")]);
        let changes = diff_trees(&Tree::empty(), &new);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Added));
    }

    #[test]
    fn classification_covers_all_kinds() {
        let old = tree(&[("kept", "same"), ("gone", "b1"), ("edited", "v1")]);
        let new = tree(&[("kept", "same"), ("fresh", "b2"), ("edited", "v2")]);
        let changes = diff_trees(&old, &new);
        assert_eq!(
            changes,
            vec![
                Change::new("edited", ChangeKind::Modified),
                Change::new("fresh", ChangeKind::Added),
                Change::new("gone", ChangeKind::Removed),
            ]
        );
    }

    #[test]
    fn result_is_ordered_by_path() {
        let old = tree(&[("z", "1")]);
        let new = tree(&[("a", "2")]);
        let changes = diff_trees(&old, &new);
        assert_eq!(changes[0].path, "a");
        assert_eq!(changes[1].path, "z");
    }
}
