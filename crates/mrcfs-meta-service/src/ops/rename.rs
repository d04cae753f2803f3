//! Rename and move.
//!
//! Source and destination must be in the same volume; the whole move is
//! one atomic update, so a reader never sees the entry under both names.

use mrcfs_kv::KvEngine;
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::{MetaCode, StatusCode};
use mrcfs_types::Result;

use mrcfs_proto::meta::{RenameReq, TimestampRsp};

use crate::access::{AccessController, AccessMode};
use crate::entry::ChildEntry;
use crate::path::Path;
use crate::path_resolve::PathResolver;
use crate::volume::Volume;

pub async fn rename<E: KvEngine>(
    volume: &Volume<E>,
    now: i64,
    from: &Path,
    to: &Path,
    req: &RenameReq,
) -> Result<TimestampRsp> {
    if from.volume != to.volume {
        return make_error_msg(StatusCode::INVALID_ARG, "rename across volumes");
    }
    if from.is_volume_root() || to.is_volume_root() {
        return make_error_msg(StatusCode::INVALID_ARG, "cannot rename a volume root");
    }

    let mut update = volume.store().begin_update(now).await;
    let user = &req.base.user;

    let src = PathResolver::new(update.txn()).resolve_existing(from).await?;
    AccessController::check_search_permission(&src, user, &from.render())?;
    let dst = PathResolver::new(update.txn()).resolve(to).await?;
    AccessController::check_search_permission(&dst, user, &to.render())?;

    let mut source = src.target.unwrap();
    let mut src_parent = src
        .parent
        .ok_or_else(|| mrcfs_types::Status::new(MetaCode::INCONSISTENT))?;
    let mut dst_parent = dst
        .parent
        .ok_or_else(|| mrcfs_types::Status::new(MetaCode::INCONSISTENT))?;

    AccessController::check_permission(&src_parent, AccessMode::Write, user, &from.render())?;
    AccessController::check_permission(&dst_parent, AccessMode::Write, user, &to.render())?;

    if source.is_directory() && dst.ancestors.iter().any(|a| a.id == source.id) {
        return make_error_msg(
            StatusCode::INVALID_ARG,
            format!("cannot move {} into its own subtree", from.render()),
        );
    }

    if let Some(existing) = &dst.target {
        if existing.id == source.id {
            // Renaming an entry onto itself is a no-op.
            let timestamp = update.execute().await?;
            return Ok(TimestampRsp { timestamp });
        }
        if existing.is_directory() {
            return make_error_msg(
                MetaCode::EXISTS,
                format!("{} already exists", to.render()),
            );
        }
        // Files and symlinks are replaced; the child record is
        // overwritten below.
        update.remove_entry(existing.id).await?;
    }

    update.remove_child(src_parent.id, &source.name).await?;
    source.parent_id = dst_parent.id;
    source.name = to.final_component().to_string();
    source.ctime = now;
    update.put_entry(&source).await?;
    update.put_child(&ChildEntry::for_entry(&source)).await?;

    if src_parent.id == dst_parent.id {
        update.update_times(&mut src_parent, false, true, true).await?;
    } else {
        update.update_times(&mut src_parent, false, true, true).await?;
        update.update_times(&mut dst_parent, false, true, true).await?;
    }

    let timestamp = update.execute().await?;
    tracing::debug!(from = %from.render(), to = %to.render(), id = source.id, "entry renamed");
    Ok(TimestampRsp { timestamp })
}
