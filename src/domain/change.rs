//! Discovery change sets.
//!
//! Sources report changes at different granularities: the filesystem watcher
//! sees whole directory entries, a repository push reports individual file
//! paths. Both are reduced to model-level events and applied as a
//! [`SyncBatch`].

use std::collections::BTreeSet;
use std::path::{Component, Path};

use super::id::ModelName;
use super::model::ModelDescriptor;

/// A single model-level discovery event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    Added(ModelDescriptor),
    Removed(ModelName),
    Modified(ModelDescriptor),
}

/// File paths touched by one or more repository commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub modified: BTreeSet<String>,
}

impl FileChanges {
    /// Reduce file paths to the models they belong to.
    #[must_use]
    pub fn to_model_changes(&self) -> ModelChanges {
        let names = |paths: &BTreeSet<String>| -> BTreeSet<ModelName> {
            paths.iter().filter_map(|p| model_name_for_path(p)).collect()
        };
        ModelChanges {
            added: names(&self.added),
            removed: names(&self.removed),
            modified: names(&self.modified),
        }
    }
}

/// Model names affected by a change, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelChanges {
    pub added: BTreeSet<ModelName>,
    pub removed: BTreeSet<ModelName>,
    pub modified: BTreeSet<ModelName>,
}

impl ModelChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Names whose metadata must be re-fetched: added or modified, and not
    /// removed in the same change.
    #[must_use]
    pub fn pending_updates(&self) -> BTreeSet<ModelName> {
        self.added
            .union(&self.modified)
            .filter(|name| !self.removed.contains(*name))
            .cloned()
            .collect()
    }
}

/// Map a repository-relative path to the model it belongs to.
///
/// The first path component is the model: `m1/variables/data` belongs to
/// `m1`, a root-level `fire.h5` is its own model. Hidden entries
/// (`.github/...`, `.gitignore`) belong to no model.
#[must_use]
pub fn model_name_for_path(path: &str) -> Option<ModelName> {
    let first = Path::new(path.trim_start_matches('/'))
        .components()
        .find_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })?;
    if first.is_empty() || first.starts_with('.') {
        return None;
    }
    Some(ModelName::new(first))
}

/// Map a directory entry to the model it holds: a directory's name, or a
/// file's stem (`fire.h5` holds `fire`). Hidden entries hold no model.
#[must_use]
pub fn model_name_for_entry(path: &Path, is_dir: bool) -> Option<ModelName> {
    let name = if is_dir {
        path.file_name()
    } else {
        path.file_stem()
    }?;
    let name = name.to_string_lossy();
    if name.is_empty() || name.starts_with('.') {
        return None;
    }
    Some(ModelName::new(name.into_owned()))
}

/// A set of discovery events to apply together.
///
/// Removals are always applied before additions and modifications so a
/// rename never has two models claiming the same storage slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncBatch {
    pub removed: Vec<ModelName>,
    pub added: Vec<ModelDescriptor>,
    pub modified: Vec<ModelDescriptor>,
}

impl SyncBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.modified.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len() + self.modified.len()
    }
}

impl FromIterator<ModelEvent> for SyncBatch {
    fn from_iter<I: IntoIterator<Item = ModelEvent>>(iter: I) -> Self {
        let mut batch = SyncBatch::default();
        for event in iter {
            match event {
                ModelEvent::Added(descriptor) => batch.added.push(descriptor),
                ModelEvent::Removed(name) => batch.removed.push(name),
                ModelEvent::Modified(descriptor) => batch.modified.push(descriptor),
            }
        }
        batch
    }
}
