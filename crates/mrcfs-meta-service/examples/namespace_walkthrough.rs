//! Embeds the metadata service in-process: create a volume, populate it,
//! take a write lease on a file and walk a directory.
//!
//! Run with `cargo run -p mrcfs-meta-service --example namespace_walkthrough`.

use std::sync::Arc;

use mrcfs_kv_backends::MemDbEngine;
use mrcfs_lease::{EXCLUSIVE_LEASE, TO_EOF};
use mrcfs_logging::{info, init_logging, LogConfig};
use mrcfs_meta_service::{MetaService, MetaServiceConfig, MetaServiceImpl};
use mrcfs_proto::lease::AcquireLeaseReq;
use mrcfs_proto::meta::{
    CreateDirReq, CreateFileReq, CreateVolumeReq, ListReq, ReqBase, StatReq, UserInfo,
};
use mrcfs_types::time::SystemClock;
use mrcfs_types::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging(&LogConfig::default())?;

    let service: MetaServiceImpl<MemDbEngine> =
        MetaServiceImpl::new(MetaServiceConfig::default(), Arc::new(SystemClock));
    let base = ReqBase::new(UserInfo::new("alice", vec!["staff".into()]));

    service
        .create_volume(CreateVolumeReq {
            base: base.clone(),
            name: "vol".into(),
            mode: 0o755,
        })
        .await?;

    service
        .create_dir(CreateDirReq {
            base: base.clone(),
            path: "/vol/projects".into(),
            mode: 0o750,
        })
        .await?;

    service
        .create_file(CreateFileReq {
            base: base.clone(),
            path: "/vol/projects/report.txt".into(),
            mode: 0o640,
        })
        .await?;

    let rsp = service
        .stat(StatReq {
            base: base.clone(),
            path: "/vol/projects/report.txt".into(),
        })
        .await?;
    info!(id = rsp.stat.id, mode = rsp.stat.mode, "created file");

    let lease = service
        .acquire_lease(AcquireLeaseReq {
            file_id: format!("vol/{}", rsp.stat.id),
            client_id: "walkthrough".into(),
            first_object: 0,
            last_object: TO_EOF,
            operation: EXCLUSIVE_LEASE.into(),
        })
        .await?;
    info!(
        sequence_no = lease.sequence_no,
        expires = lease.expires,
        "write lease granted"
    );

    let listing = service
        .list(ListReq {
            base,
            path: "/vol/projects".into(),
            start_after: String::new(),
            limit: 0,
        })
        .await?;
    for entry in &listing.entries {
        info!(name = %entry.name, id = entry.id, kind = ?entry.kind, "entry");
    }

    Ok(())
}
