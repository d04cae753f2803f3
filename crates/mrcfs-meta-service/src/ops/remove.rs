//! Entry removal.

use mrcfs_kv::{prefix_list_end_key, KeySelector, KvEngine, ReadOnlyTransaction};
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::{MetaCode, StatusCode};
use mrcfs_types::Result;

use mrcfs_proto::meta::{RemoveReq, TimestampRsp};

use crate::access::{AccessController, AccessMode};
use crate::entry::{ChildEntry, EntryId};
use crate::path::Path;
use crate::path_resolve::PathResolver;
use crate::volume::Volume;

pub async fn remove<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    path: &Path,
    req: &RemoveReq,
) -> Result<TimestampRsp> {
    if path.is_volume_root() {
        return make_error_msg(StatusCode::INVALID_ARG, "cannot remove a volume root");
    }

    let mut update = volume.store().begin_update(now).await;
    let resolution = PathResolver::new(update.txn()).resolve_existing(path).await?;
    AccessController::check_search_permission(&resolution, &req.base.user, &path.render())?;

    let target = resolution.target.unwrap();
    let mut parent = resolution
        .parent
        .ok_or_else(|| mrcfs_types::Status::new(MetaCode::INCONSISTENT))?;
    AccessController::check_permission(&parent, AccessMode::Write, &req.base.user, &path.render())?;

    if target.is_directory() && has_children(update.txn(), target.id).await? {
        return make_error_msg(
            MetaCode::NOT_EMPTY,
            format!("{} is not empty", path.render()),
        );
    }

    update.remove_entry(target.id).await?;
    update.remove_child(parent.id, &target.name).await?;
    update.update_times(&mut parent, false, true, true).await?;
    let timestamp = update.execute().await?;
    tracing::debug!(path = %path.render(), id = target.id, "entry removed");
    Ok(TimestampRsp { timestamp })
}

/// Whether a directory has at least one child record.
async fn has_children<T: ReadOnlyTransaction + ?Sized>(txn: &T, id: EntryId) -> Result<bool> {
    let prefix = ChildEntry::pack_prefix(id);
    let begin = KeySelector::new(prefix.clone(), true);
    let end = KeySelector::new(prefix_list_end_key(&prefix), false);
    let range = txn.snapshot_get_range(&begin, &end, 1).await?;
    Ok(!range.kvs.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{NamespaceEntry, ROOT_ENTRY_ID};
    use crate::ops::{create_dir, create_file};
    use crate::test_util::{alice, bob, dir_req, file_req, test_volume};
    use mrcfs_proto::meta::ReqBase;

    fn remove_req(user: &mrcfs_proto::meta::UserInfo) -> RemoveReq {
        RemoveReq {
            base: ReqBase { user: user.clone() },
            path: String::new(),
        }
    }

    #[tokio::test]
    async fn test_remove_file() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/f.txt").unwrap();
        create_file(&volume, 0, &path, &file_req(&alice(), 0o644)).await.unwrap();

        let rsp = remove(&volume, 40, &path, &remove_req(&alice())).await.unwrap();
        assert_eq!(rsp.timestamp, 40);

        let ro = volume.store().read_txn();
        assert!(ChildEntry::snapshot_load(&ro, ROOT_ENTRY_ID, "f.txt")
            .await
            .unwrap()
            .is_none());
        let root = NamespaceEntry::snapshot_load(&ro, ROOT_ENTRY_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.mtime, 40);
    }

    #[tokio::test]
    async fn test_remove_empty_directory() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/d").unwrap();
        create_dir(&volume, 0, &path, &dir_req(&alice(), 0o755)).await.unwrap();
        remove(&volume, 1, &path, &remove_req(&alice())).await.unwrap();

        let ro = volume.store().read_txn();
        assert!(ChildEntry::snapshot_load(&ro, ROOT_ENTRY_ID, "d")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_remove_non_empty_directory_fails() {
        let volume = test_volume().await;
        let dir = Path::parse("/vol/d").unwrap();
        create_dir(&volume, 0, &dir, &dir_req(&alice(), 0o755)).await.unwrap();
        let inner = Path::parse("/vol/d/f").unwrap();
        create_file(&volume, 0, &inner, &file_req(&alice(), 0o644)).await.unwrap();

        let err = remove(&volume, 1, &dir, &remove_req(&alice())).await.unwrap_err();
        assert_eq!(err.code(), MetaCode::NOT_EMPTY);

        // Removing the child first unblocks the directory.
        remove(&volume, 2, &inner, &remove_req(&alice())).await.unwrap();
        remove(&volume, 3, &dir, &remove_req(&alice())).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_volume_root_rejected() {
        let volume = test_volume().await;
        let root = Path::parse("/vol").unwrap();
        let err = remove(&volume, 0, &root, &remove_req(&alice())).await.unwrap_err();
        assert_eq!(err.code(), StatusCode::INVALID_ARG);
    }

    #[tokio::test]
    async fn test_remove_missing_and_denied() {
        let volume = test_volume().await;
        let missing = Path::parse("/vol/nope").unwrap();
        let err = remove(&volume, 0, &missing, &remove_req(&alice())).await.unwrap_err();
        assert_eq!(err.code(), MetaCode::NOT_FOUND);

        let path = Path::parse("/vol/keep").unwrap();
        create_file(&volume, 0, &path, &file_req(&alice(), 0o644)).await.unwrap();
        // bob lacks write on the root directory.
        let err = remove(&volume, 0, &path, &remove_req(&bob())).await.unwrap_err();
        assert_eq!(err.code(), MetaCode::NO_PERMISSION);
    }
}
