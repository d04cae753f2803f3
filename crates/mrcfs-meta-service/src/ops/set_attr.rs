//! Attribute and extended-attribute updates.

use mrcfs_kv::KvEngine;
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::{MetaCode, StatusCode};
use mrcfs_types::Result;

use mrcfs_proto::meta::{SetAttrReq, SetXAttrReq, TimestampRsp, UserInfo};

use crate::access::{AccessController, AccessMode};
use crate::entry::{EntryKind, NamespaceEntry};
use crate::path::Path;
use crate::path_resolve::PathResolver;
use crate::volume::Volume;

pub async fn set_attr<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    path: &Path,
    req: &SetAttrReq,
) -> Result<TimestampRsp> {
    let user = &req.base.user;
    let attrs = &req.attrs;

    let mut update = volume.store().begin_update(now).await;
    let resolution = PathResolver::new(update.txn()).resolve_existing(path).await?;
    AccessController::check_search_permission(&resolution, user, &path.render())?;
    let mut entry = resolution.target.unwrap();

    if let Some(mode) = attrs.mode {
        require_owner(&entry, user, path, "mode")?;
        entry.mode = mode & 0o7777;
    }
    if let Some(owner_id) = &attrs.owner_id {
        // Ownership transfer is reserved for superusers.
        if !user.superuser {
            return make_error_msg(
                MetaCode::NO_PERMISSION,
                format!("changing the owner of {} requires a superuser", path.render()),
            );
        }
        entry.owner_id = owner_id.clone();
    }
    if let Some(group) = &attrs.owning_group_id {
        require_owner(&entry, user, path, "owning group")?;
        entry.owning_group_id = group.clone();
    }
    if attrs.atime.is_some() || attrs.mtime.is_some() {
        // Explicit timestamps need ownership or write access.
        if require_owner(&entry, user, path, "timestamps").is_err() {
            AccessController::check_permission(&entry, AccessMode::Write, user, &path.render())?;
        }
        if let Some(atime) = attrs.atime {
            entry.atime = atime;
        }
        if let Some(mtime) = attrs.mtime {
            entry.mtime = mtime;
        }
    }

    entry.ctime = now;
    update.put_entry(&entry).await?;
    let timestamp = update.execute().await?;
    tracing::debug!(path = %path.render(), id = entry.id, "attributes updated");
    Ok(TimestampRsp { timestamp })
}

pub async fn set_xattr<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    path: &Path,
    req: &SetXAttrReq,
) -> Result<TimestampRsp> {
    if req.key.is_empty() {
        return make_error_msg(StatusCode::INVALID_ARG, "xattr key is empty");
    }
    let user = &req.base.user;

    let mut update = volume.store().begin_update(now).await;
    let resolution = PathResolver::new(update.txn()).resolve_existing(path).await?;
    AccessController::check_search_permission(&resolution, user, &path.render())?;
    let mut entry = resolution.target.unwrap();
    AccessController::check_permission(&entry, AccessMode::Write, user, &path.render())?;

    match &mut entry.kind {
        EntryKind::Directory { xattrs, .. } => match &req.value {
            Some(value) => {
                xattrs.insert(req.key.clone(), value.clone());
            }
            None => {
                xattrs.remove(&req.key);
            }
        },
        _ => {
            return make_error_msg(
                MetaCode::NOT_DIRECTORY,
                format!("{} does not hold extended attributes", path.render()),
            )
        }
    }

    entry.ctime = now;
    update.put_entry(&entry).await?;
    let timestamp = update.execute().await?;
    tracing::debug!(path = %path.render(), key = %req.key, "xattr updated");
    Ok(TimestampRsp { timestamp })
}

fn require_owner(entry: &NamespaceEntry, user: &UserInfo, path: &Path, what: &str) -> Result<()> {
    if user.superuser || user.user_id == entry.owner_id {
        return Ok(());
    }
    make_error_msg(
        MetaCode::NO_PERMISSION,
        format!(
            "changing the {what} of {} requires its owner",
            path.render()
        ),
    )
}
