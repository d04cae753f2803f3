//! Entry creation: directories, files and symlinks.

use mrcfs_kv::KvEngine;
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::MetaCode;
use mrcfs_types::Result;

use mrcfs_proto::meta::{CreateDirReq, CreateFileReq, SymlinkReq, TimestampRsp, UserInfo};

use crate::access::{AccessController, AccessMode};
use crate::atomic_update::AtomicUpdate;
use crate::entry::{ChildEntry, NamespaceEntry};
use crate::path::Path;
use crate::path_resolve::PathResolver;
use crate::volume::Volume;

pub async fn create_dir<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    path: &Path,
    req: &CreateDirReq,
) -> Result<TimestampRsp> {
    let (mut update, parent) = prepare_create(volume, now, path, &req.base.user).await?;
    let id = update.next_id().await?;
    let entry = NamespaceEntry::new_directory(
        id,
        parent.id,
        path.final_component(),
        req.base.user.user_id.clone(),
        owning_group(&req.base.user),
        req.mode,
        now,
    );
    let timestamp = finish_create(update, parent, &entry).await?;
    tracing::debug!(path = %path.render(), id, "directory created");
    Ok(TimestampRsp { timestamp })
}

pub async fn create_file<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    path: &Path,
    req: &CreateFileReq,
) -> Result<TimestampRsp> {
    let (mut update, parent) = prepare_create(volume, now, path, &req.base.user).await?;
    let id = update.next_id().await?;
    let entry = NamespaceEntry::new_file(
        id,
        parent.id,
        path.final_component(),
        req.base.user.user_id.clone(),
        owning_group(&req.base.user),
        req.mode,
        now,
    );
    let timestamp = finish_create(update, parent, &entry).await?;
    tracing::debug!(path = %path.render(), id, "file created");
    Ok(TimestampRsp { timestamp })
}

pub async fn symlink<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    path: &Path,
    req: &SymlinkReq,
) -> Result<TimestampRsp> {
    if req.target.is_empty() {
        return make_error_msg(
            mrcfs_types::status_code::StatusCode::INVALID_ARG,
            "symlink target is empty",
        );
    }
    let (mut update, parent) = prepare_create(volume, now, path, &req.base.user).await?;
    let id = update.next_id().await?;
    let entry = NamespaceEntry::new_symlink(
        id,
        parent.id,
        path.final_component(),
        req.base.user.user_id.clone(),
        owning_group(&req.base.user),
        req.target.clone(),
        now,
    );
    let timestamp = finish_create(update, parent, &entry).await?;
    tracing::debug!(path = %path.render(), id, target = %req.target, "symlink created");
    Ok(TimestampRsp { timestamp })
}

/// Begin an update, resolve the path and run every pre-create check.
///
/// Returns the open update and the parent directory entry.
async fn prepare_create<'a, E: KvEngine>(
    volume: &'a Volume<E>,
    now: i64,
    path: &Path,
    user: &UserInfo,
) -> Result<(AtomicUpdate<'a, E>, NamespaceEntry)> {
    if path.is_volume_root() {
        return already_exists(path);
    }

    let update = volume.store().begin_update(now).await;
    let resolution = PathResolver::new(update.txn()).resolve(path).await?;
    AccessController::check_search_permission(&resolution, user, &path.render())?;

    // Not the volume root, so a parent is always present. The write check
    // on it comes before the collision check: a caller who may not create
    // here learns nothing about what the directory contains.
    let parent = resolution
        .parent
        .ok_or_else(|| mrcfs_types::Status::new(MetaCode::INCONSISTENT))?;
    AccessController::check_permission(&parent, AccessMode::Write, user, &path.render())?;
    if resolution.target.is_some() {
        return already_exists(path);
    }
    Ok((update, parent))
}

/// Stage the new entry, its child record and the parent timestamp bump,
/// then commit.
async fn finish_create<E: KvEngine>(
    mut update: AtomicUpdate<'_, E>,
    mut parent: NamespaceEntry,
    entry: &NamespaceEntry,
) -> Result<i64> {
    update.put_entry(entry).await?;
    update.put_child(&ChildEntry::for_entry(entry)).await?;
    update.update_times(&mut parent, false, true, true).await?;
    update.execute().await
}

fn owning_group(user: &UserInfo) -> String {
    user.group_ids
        .first()
        .cloned()
        .unwrap_or_else(|| user.user_id.clone())
}

fn already_exists<T>(path: &Path) -> Result<T> {
    make_error_msg(MetaCode::EXISTS, format!("{} already exists", path.render()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{alice, bob, dir_req, test_volume};
    use crate::entry::ROOT_ENTRY_ID;
    use mrcfs_proto::meta::ReqBase;

    #[tokio::test]
    async fn test_create_dir() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/docs").unwrap();
        create_dir(&volume, 50, &path, &dir_req(&alice(), 0o750)).await.unwrap();

        let ro = volume.store().read_txn();
        let child = ChildEntry::snapshot_load(&ro, ROOT_ENTRY_ID, "docs")
            .await
            .unwrap()
            .unwrap();
        assert!(child.is_directory());
        let entry = child.snapshot_load_entry(&ro).await.unwrap();
        assert_eq!(entry.mode, 0o750);
        assert_eq!(entry.owner_id, "alice");
        assert_eq!(entry.ctime, 50);

        // The parent's mtime moved, its atime did not.
        let root = NamespaceEntry::snapshot_load(&ro, ROOT_ENTRY_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.mtime, 50);
        assert_eq!(root.atime, 0);
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/docs").unwrap();
        create_dir(&volume, 0, &path, &dir_req(&alice(), 0o755)).await.unwrap();

        let err = create_dir(&volume, 1, &path, &dir_req(&alice(), 0o755))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MetaCode::EXISTS);

        // The volume root itself also counts as existing.
        let root = Path::parse("/vol").unwrap();
        let err = create_dir(&volume, 1, &root, &dir_req(&alice(), 0o755))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MetaCode::EXISTS);
    }

    #[tokio::test]
    async fn test_create_in_missing_parent_fails() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/missing/child").unwrap();
        let err = create_dir(&volume, 0, &path, &dir_req(&alice(), 0o755))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MetaCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_needs_write_on_parent() {
        let volume = test_volume().await;
        // Root is 0o755 owned by alice; bob can search but not write.
        let path = Path::parse("/vol/intruder").unwrap();
        let err = create_dir(&volume, 0, &path, &dir_req(&bob(), 0o755))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MetaCode::NO_PERMISSION);
    }

    #[tokio::test]
    async fn test_write_denial_wins_over_name_collision() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/docs").unwrap();
        create_dir(&volume, 0, &path, &dir_req(&alice(), 0o755)).await.unwrap();

        // bob cannot write the root, so the collision is never reported.
        let err = create_dir(&volume, 1, &path, &dir_req(&bob(), 0o755))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MetaCode::NO_PERMISSION);
    }

    #[tokio::test]
    async fn test_create_file_and_symlink() {
        let volume = test_volume().await;

        let file_path = Path::parse("/vol/data.bin").unwrap();
        create_file(
            &volume,
            10,
            &file_path,
            &CreateFileReq {
                base: ReqBase { user: alice() },
                path: file_path.render(),
                mode: 0o640,
            },
        )
        .await
        .unwrap();

        let link_path = Path::parse("/vol/link").unwrap();
        symlink(
            &volume,
            11,
            &link_path,
            &SymlinkReq {
                base: ReqBase { user: alice() },
                path: link_path.render(),
                target: "/vol/data.bin".into(),
            },
        )
        .await
        .unwrap();

        let ro = volume.store().read_txn();
        let file = ChildEntry::snapshot_load(&ro, ROOT_ENTRY_ID, "data.bin")
            .await
            .unwrap()
            .unwrap()
            .snapshot_load_entry(&ro)
            .await
            .unwrap();
        assert!(file.is_file());
        assert_eq!(file.mode, 0o640);

        let link = ChildEntry::snapshot_load(&ro, ROOT_ENTRY_ID, "link")
            .await
            .unwrap()
            .unwrap()
            .snapshot_load_entry(&ro)
            .await
            .unwrap();
        assert!(link.is_symlink());
        assert_eq!(link.to_stat().link_target.as_deref(), Some("/vol/data.bin"));
        // Distinct entries got distinct ids.
        assert_ne!(file.id, link.id);
    }

    #[tokio::test]
    async fn test_symlink_empty_target_rejected() {
        let volume = test_volume().await;
        let path = Path::parse("/vol/link").unwrap();
        let err = symlink(
            &volume,
            0,
            &path,
            &SymlinkReq {
                base: ReqBase { user: alice() },
                path: path.render(),
                target: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), mrcfs_types::status_code::StatusCode::INVALID_ARG);
    }
}
