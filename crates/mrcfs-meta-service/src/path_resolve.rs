//! Path resolution inside one volume's namespace.
//!
//! Walks the child index from the volume root. A missing intermediate
//! component is an error; a missing final component is a successful
//! resolution with no target, which is what create-style operations need.

use mrcfs_kv::ReadOnlyTransaction;
use mrcfs_types::result::{make_error, make_error_msg};
use mrcfs_types::status_code::MetaCode;
use mrcfs_types::Result;

use crate::entry::{ChildEntry, EntryId, NamespaceEntry, ROOT_ENTRY_ID, ROOT_PARENT_ID};
use crate::path::Path;

/// Result of resolving a path.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// The entry at the full path, if it exists.
    pub target: Option<NamespaceEntry>,
    /// The directory containing the final component; `None` when the path
    /// names the volume root itself.
    pub parent: Option<NamespaceEntry>,
    /// Id of `parent`, or [`ROOT_PARENT_ID`] for the volume root.
    pub parent_id: EntryId,
    /// Id of `parent`'s own parent.
    pub parents_parent_id: EntryId,
    /// The final path component; `""` for the volume root.
    pub final_component: String,
    /// Every directory traversed to reach the final component, root first.
    /// The target itself is not included.
    pub ancestors: Vec<NamespaceEntry>,
}

/// Path resolver over a snapshot of one volume's store.
pub struct PathResolver<'a, T: ReadOnlyTransaction + ?Sized> {
    txn: &'a T,
}

impl<'a, T: ReadOnlyTransaction + ?Sized> PathResolver<'a, T> {
    pub fn new(txn: &'a T) -> Self {
        Self { txn }
    }

    /// Resolve `path` (volume already stripped by the caller's lookup).
    pub async fn resolve(&self, path: &Path) -> Result<ResolutionResult> {
        let root = NamespaceEntry::snapshot_load(self.txn, ROOT_ENTRY_ID)
            .await?
            .ok_or_else(|| {
                mrcfs_types::Status::with_message(
                    MetaCode::INCONSISTENT,
                    format!("volume {} has no root entry", path.volume),
                )
            })?;

        if path.is_volume_root() {
            return Ok(ResolutionResult {
                target: Some(root),
                parent: None,
                parent_id: ROOT_PARENT_ID,
                parents_parent_id: ROOT_PARENT_ID,
                final_component: String::new(),
                ancestors: Vec::new(),
            });
        }

        let mut ancestors = vec![root];

        // Walk the intermediate components; each must be an existing directory.
        for component in &path.components[..path.components.len() - 1] {
            let current = ancestors.last().unwrap();
            let child = match ChildEntry::snapshot_load(self.txn, current.id, component).await? {
                Some(child) => child,
                None => {
                    return make_error_msg(
                        MetaCode::NOT_FOUND,
                        format!("ancestor {component:?} missing in {}", path.render()),
                    )
                }
            };
            if !child.is_directory() {
                return make_error_msg(
                    MetaCode::NOT_DIRECTORY,
                    format!("{component:?} in {} is not a directory", path.render()),
                );
            }
            ancestors.push(child.snapshot_load_entry(self.txn).await?);
        }

        let parent = ancestors.last().unwrap().clone();
        let final_component = path.final_component().to_string();

        let target = match ChildEntry::snapshot_load(self.txn, parent.id, &final_component).await? {
            Some(child) => Some(child.snapshot_load_entry(self.txn).await?),
            None => None,
        };

        Ok(ResolutionResult {
            target,
            parent_id: parent.id,
            parents_parent_id: parent.parent_id,
            parent: Some(parent),
            final_component,
            ancestors,
        })
    }

    /// Resolve and require the target to exist.
    pub async fn resolve_existing(&self, path: &Path) -> Result<ResolutionResult> {
        let resolution = self.resolve(path).await?;
        if resolution.target.is_none() {
            return make_error(MetaCode::NOT_FOUND);
        }
        Ok(resolution)
    }
}
