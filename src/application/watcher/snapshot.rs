//! Directory snapshots and their diffs.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{model_name_for_entry, ModelName};

/// One observed directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub model: ModelName,
}

/// Set of directory-entry names observed in one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

/// Entries that appeared or disappeared between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<SnapshotEntry>,
    pub removed: Vec<SnapshotEntry>,
}

impl SnapshotDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl DirectorySnapshot {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the non-hidden entries of `dir`.
    pub fn capture(dir: &Path) -> io::Result<Self> {
        let mut entries = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let is_dir = entry.file_type()?.is_dir();
            if let Some(model) = model_name_for_entry(&path, is_dir) {
                entries.insert(file_name, SnapshotEntry { path, model });
            }
        }
        Ok(Self { entries })
    }

    /// Build a snapshot from `(entry name, path, is_dir)` triples.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, PathBuf, bool)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(name, path, is_dir)| {
                let model = model_name_for_entry(&path, is_dir)?;
                Some((name.into(), SnapshotEntry { path, model }))
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, entry_name: &str) -> bool {
        self.entries.contains_key(entry_name)
    }

    /// Entries in `next` but not in `self` are added; the reverse are removed.
    #[must_use]
    pub fn diff(&self, next: &DirectorySnapshot) -> SnapshotDiff {
        let added = next
            .entries
            .iter()
            .filter(|(name, _)| !self.entries.contains_key(*name))
            .map(|(_, entry)| entry.clone())
            .collect();
        let removed = self
            .entries
            .iter()
            .filter(|(name, _)| !next.entries.contains_key(*name))
            .map(|(_, entry)| entry.clone())
            .collect();
        SnapshotDiff { added, removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(names: &[&str]) -> DirectorySnapshot {
        DirectorySnapshot::from_entries(
            names
                .iter()
                .map(|name| (*name, PathBuf::from("/models").join(name), true)),
        )
    }

    #[test]
    fn diff_reports_only_changes() {
        let diff = snapshot(&["a", "b"]).diff(&snapshot(&["a", "c"]));

        let added: Vec<_> = diff.added.iter().map(|e| e.model.to_string()).collect();
        let removed: Vec<_> = diff.removed.iter().map(|e| e.model.to_string()).collect();
        assert_eq!(added, vec!["c"]);
        assert_eq!(removed, vec!["b"]);
    }

    #[test]
    fn identical_snapshots_have_empty_diff() {
        assert!(snapshot(&["a"]).diff(&snapshot(&["a"])).is_empty());
    }

    #[test]
    fn capture_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("m1")).unwrap();
        std::fs::write(dir.path().join("fire.h5"), b"x").unwrap();
        std::fs::write(dir.path().join(".partial"), b"x").unwrap();

        let snapshot = DirectorySnapshot::capture(dir.path()).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("m1"));
        assert!(snapshot.contains("fire.h5"));
        assert!(!snapshot.contains(".partial"));
    }
}
