//! Directory listing with pagination.

use mrcfs_kv::{key_after, prefix_list_end_key, KeySelector, KvEngine, ReadOnlyTransaction};
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::MetaCode;
use mrcfs_types::Result;

use mrcfs_proto::meta::{DirEntry, ListReq, ListRsp};

use crate::access::{AccessController, AccessMode};
use crate::config::MetaServiceConfig;
use crate::entry::ChildEntry;
use crate::path::Path;
use crate::path_resolve::PathResolver;
use crate::volume::Volume;

pub async fn list<E: KvEngine>(
    volume: &Volume<E>,
    config: &MetaServiceConfig,
    path: &Path,
    req: &ListReq,
) -> Result<ListRsp> {
    let ro = volume.store().read_txn();
    let resolution = PathResolver::new(&ro).resolve_existing(path).await?;
    AccessController::check_search_permission(&resolution, &req.base.user, &path.render())?;

    let dir = resolution.target.unwrap();
    if !dir.is_directory() {
        return make_error_msg(
            MetaCode::NOT_DIRECTORY,
            format!("{} is not a directory", path.render()),
        );
    }
    AccessController::check_permission(&dir, AccessMode::Read, &req.base.user, &path.render())?;

    let prefix = ChildEntry::pack_prefix(dir.id);
    let begin = if req.start_after.is_empty() {
        KeySelector::new(prefix.clone(), true)
    } else {
        // Resume strictly after the given name.
        KeySelector::new(
            key_after(&ChildEntry::pack_key_for(dir.id, &req.start_after)),
            true,
        )
    };
    let end = KeySelector::new(prefix_list_end_key(&prefix), false);

    let limit = if req.limit == 0 {
        config.list_default_limit
    } else {
        req.limit.min(i32::MAX as u32) as i32
    };

    let range = ro.snapshot_get_range(&begin, &end, limit).await?;
    let mut entries = Vec::with_capacity(range.kvs.len());
    for kv in &range.kvs {
        let child = ChildEntry::unpack(&kv.key, &kv.value)?;
        entries.push(DirEntry {
            name: child.name,
            id: child.id,
            kind: child.kind,
        });
    }

    Ok(ListRsp {
        entries,
        has_more: range.has_more,
    })
}
