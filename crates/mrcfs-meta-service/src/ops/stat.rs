//! Entry metadata lookup.

use mrcfs_kv::KvEngine;
use mrcfs_types::Result;

use mrcfs_proto::meta::{StatReq, StatRsp};

use crate::access::AccessController;
use crate::path::Path;
use crate::path_resolve::PathResolver;
use crate::volume::Volume;

pub async fn stat<E: KvEngine>(
    volume: &Volume<E>,
    path: &Path,
    req: &StatReq,
) -> Result<StatRsp> {
    let ro = volume.store().read_txn();
    let resolution = PathResolver::new(&ro).resolve_existing(path).await?;
    AccessController::check_search_permission(&resolution, &req.base.user, &path.render())?;
    // resolve_existing guarantees a target.
    let target = resolution.target.unwrap();
    Ok(StatRsp {
        stat: target.to_stat(),
    })
}
