//! Shared fixtures for the crate's tests.

use std::sync::Arc;

use mrcfs_kv_backends::MemDbEngine;
use mrcfs_proto::meta::{CreateDirReq, CreateFileReq, ReqBase, UserInfo};

use crate::volume::{Volume, VolumeManager};

pub(crate) fn alice() -> UserInfo {
    UserInfo::new("alice", vec!["staff".into()])
}

pub(crate) fn bob() -> UserInfo {
    UserInfo::new("bob", vec!["guests".into()])
}

pub(crate) fn dir_req(user: &UserInfo, mode: u32) -> CreateDirReq {
    CreateDirReq {
        base: ReqBase { user: user.clone() },
        path: String::new(),
        mode,
    }
}

pub(crate) fn file_req(user: &UserInfo, mode: u32) -> CreateFileReq {
    CreateFileReq {
        base: ReqBase { user: user.clone() },
        path: String::new(),
        mode,
    }
}

/// A fresh volume named "vol", root owned by alice with mode 0o755.
pub(crate) async fn test_volume() -> Arc<Volume<MemDbEngine>> {
    let mgr: VolumeManager<MemDbEngine> = VolumeManager::new();
    mgr.create_volume("vol", &alice(), 0o755, 0).await.unwrap();
    mgr.get("vol").unwrap()
}
