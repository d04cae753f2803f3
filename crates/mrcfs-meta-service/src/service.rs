//! MetaService trait and implementation.
//!
//! `MetaService` is the public async interface for every metadata and
//! lease operation. `MetaServiceImpl` validates the request envelope
//! (identity, read-only mode, path limits), locates the volume and
//! delegates to the operation functions in [`crate::ops`].

use std::sync::Arc;

use async_trait::async_trait;

use mrcfs_kv::KvEngine;
use mrcfs_lease::{LeaseManager, EXCLUSIVE_LEASE};
use mrcfs_proto::lease::{AcquireLeaseReq, AcquireLeaseRsp, ReleaseLeaseReq, ReleaseLeaseRsp};
use mrcfs_proto::meta;
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::StatusCode;
use mrcfs_types::time::GlobalClock;
use mrcfs_types::Result;

use crate::config::MetaServiceConfig;
use crate::ops;
use crate::volume::VolumeManager;

/// The metadata service: volumes, namespace operations and leases.
#[async_trait]
pub trait MetaService: Send + Sync {
    async fn create_volume(&self, req: meta::CreateVolumeReq) -> Result<meta::CreateVolumeRsp>;

    async fn create_dir(&self, req: meta::CreateDirReq) -> Result<meta::TimestampRsp>;

    async fn create_file(&self, req: meta::CreateFileReq) -> Result<meta::TimestampRsp>;

    async fn symlink(&self, req: meta::SymlinkReq) -> Result<meta::TimestampRsp>;

    async fn stat(&self, req: meta::StatReq) -> Result<meta::StatRsp>;

    async fn list(&self, req: meta::ListReq) -> Result<meta::ListRsp>;

    async fn remove(&self, req: meta::RemoveReq) -> Result<meta::TimestampRsp>;

    async fn rename(&self, req: meta::RenameReq) -> Result<meta::TimestampRsp>;

    async fn set_attr(&self, req: meta::SetAttrReq) -> Result<meta::TimestampRsp>;

    async fn set_xattr(&self, req: meta::SetXAttrReq) -> Result<meta::TimestampRsp>;

    async fn acquire_lease(&self, req: AcquireLeaseReq) -> Result<AcquireLeaseRsp>;

    async fn release_lease(&self, req: ReleaseLeaseReq) -> Result<ReleaseLeaseRsp>;
}

/// Concrete [`MetaService`] over one KV engine type.
///
/// Each volume gets its own engine instance, so engines must be
/// constructible via `Default`.
pub struct MetaServiceImpl<E: KvEngine + Default> {
    config: MetaServiceConfig,
    volumes: VolumeManager<E>,
    leases: LeaseManager,
    clock: Arc<dyn GlobalClock>,
}

impl<E: KvEngine + Default> MetaServiceImpl<E> {
    pub fn new(config: MetaServiceConfig, clock: Arc<dyn GlobalClock>) -> Self {
        Self {
            config,
            volumes: VolumeManager::new(),
            leases: LeaseManager::with_defaults(clock.clone()),
            clock,
        }
    }

    pub fn config(&self) -> &MetaServiceConfig {
        &self.config
    }

    pub fn volumes(&self) -> &VolumeManager<E> {
        &self.volumes
    }

    pub fn leases(&self) -> &LeaseManager {
        &self.leases
    }

    fn check_readonly(&self) -> Result<()> {
        if self.config.readonly {
            return make_error_msg(StatusCode::READ_ONLY_MODE, "service is in read-only mode");
        }
        Ok(())
    }

    fn validate_user(&self, user: &meta::UserInfo) -> Result<()> {
        if self.config.authenticate && user.user_id.is_empty() {
            return make_error_msg(
                StatusCode::AUTHENTICATION_FAIL,
                "request carries no caller identity",
            );
        }
        Ok(())
    }

    fn now(&self) -> i64 {
        self.clock.now_secs()
    }
}

#[async_trait]
impl<E: KvEngine + Default + 'static> MetaService for MetaServiceImpl<E> {
    async fn create_volume(&self, req: meta::CreateVolumeReq) -> Result<meta::CreateVolumeRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let timestamp = self
            .volumes
            .create_volume(&req.name, &req.base.user, req.mode, self.now())
            .await?;
        Ok(meta::CreateVolumeRsp { timestamp })
    }

    async fn create_dir(&self, req: meta::CreateDirReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::create_dir(&volume, self.now(), &path, &req).await
    }

    async fn create_file(&self, req: meta::CreateFileReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::create_file(&volume, self.now(), &path, &req).await
    }

    async fn symlink(&self, req: meta::SymlinkReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::symlink(&volume, self.now(), &path, &req).await
    }

    async fn stat(&self, req: meta::StatReq) -> Result<meta::StatRsp> {
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::stat(&volume, &path, &req).await
    }

    async fn list(&self, req: meta::ListReq) -> Result<meta::ListRsp> {
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::list(&volume, &self.config, &path, &req).await
    }

    async fn remove(&self, req: meta::RemoveReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::remove(&volume, self.now(), &path, &req).await
    }

    async fn rename(&self, req: meta::RenameReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let from = ops::parse_path(&self.config, &req.from)?;
        let to = ops::parse_path(&self.config, &req.to)?;
        let volume = self.volumes.get(&from.volume)?;
        ops::rename(&volume, self.now(), &from, &to, &req).await
    }

    async fn set_attr(&self, req: meta::SetAttrReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::set_attr(&volume, self.now(), &path, &req).await
    }

    async fn set_xattr(&self, req: meta::SetXAttrReq) -> Result<meta::TimestampRsp> {
        self.check_readonly()?;
        self.validate_user(&req.base.user)?;
        let path = ops::parse_path(&self.config, &req.path)?;
        let volume = self.volumes.get(&path.volume)?;
        ops::set_xattr(&volume, self.now(), &path, &req).await
    }

    async fn acquire_lease(&self, req: AcquireLeaseReq) -> Result<AcquireLeaseRsp> {
        // Exclusive leases grant write capability, so they honor
        // read-only mode; shared leases do not.
        if req.operation == EXCLUSIVE_LEASE {
            self.check_readonly()?;
        }
        let granted = self.leases.try_acquire(&req)?;
        Ok(AcquireLeaseRsp {
            sequence_no: granted.sequence_no,
            expires: granted.expires,
        })
    }

    async fn release_lease(&self, req: ReleaseLeaseReq) -> Result<ReleaseLeaseRsp> {
        let released = self.leases.release(&req);
        Ok(ReleaseLeaseRsp { released })
    }
}
