//! Volume registry.
//!
//! Each volume owns an independent KV key space (one engine instance) and
//! its own entry id counter, so ids are unique within a volume but not
//! across volumes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use mrcfs_kv::KvEngine;
use mrcfs_proto::meta::UserInfo;
use mrcfs_types::result::{make_error_msg, Result};
use mrcfs_types::status_code::{MetaCode, StatusCode};

use crate::entry::NamespaceEntry;
use crate::meta_store::MetaStore;
use crate::path::NAME_MAX;

/// One volume: a name and the metadata store behind it.
pub struct Volume<E: KvEngine> {
    name: String,
    store: MetaStore<E>,
}

impl<E: KvEngine> Volume<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &MetaStore<E> {
        &self.store
    }
}

/// Registry of volumes by name.
pub struct VolumeManager<E: KvEngine + Default> {
    volumes: RwLock<HashMap<String, Arc<Volume<E>>>>,
}

impl<E: KvEngine + Default> VolumeManager<E> {
    pub fn new() -> Self {
        Self {
            volumes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a volume, its root directory owned by `owner` with `mode`.
    ///
    /// Returns the timestamp of the root entry.
    pub async fn create_volume(&self, name: &str, owner: &UserInfo, mode: u32, now: i64) -> Result<i64> {
        validate_volume_name(name)?;
        if self.volumes.read().contains_key(name) {
            return volume_exists(name);
        }

        let volume = Arc::new(Volume {
            name: name.to_string(),
            store: MetaStore::new(E::default()),
        });

        let owning_group = owner
            .group_ids
            .first()
            .cloned()
            .unwrap_or_else(|| owner.user_id.clone());

        // The update borrows the store; close it out before the volume
        // moves into the registry.
        let timestamp = {
            let mut update = volume.store.begin_update(now).await;
            let root_id = update.next_id().await?;
            let root = NamespaceEntry::new_directory(
                root_id,
                crate::entry::ROOT_PARENT_ID,
                "",
                owner.user_id.clone(),
                owning_group,
                mode,
                now,
            );
            update.put_entry(&root).await?;
            update.execute().await?
        };

        // Another creator may have raced us while the root was being written.
        let mut volumes = self.volumes.write();
        if volumes.contains_key(name) {
            return volume_exists(name);
        }
        volumes.insert(name.to_string(), volume);
        tracing::info!(volume = %name, owner = %owner.user_id, "volume created");
        Ok(timestamp)
    }

    /// Look up a volume by name.
    pub fn get(&self, name: &str) -> Result<Arc<Volume<E>>> {
        match self.volumes.read().get(name) {
            Some(volume) => Ok(volume.clone()),
            None => make_error_msg(
                MetaCode::VOLUME_NOT_FOUND,
                format!("volume {name:?} does not exist"),
            ),
        }
    }

    pub fn volume_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.volumes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl<E: KvEngine + Default> Default for VolumeManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_volume_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return make_error_msg(StatusCode::INVALID_ARG, "volume name is empty");
    }
    if name.contains('/') {
        return make_error_msg(StatusCode::INVALID_ARG, "volume name contains '/'");
    }
    if name.len() > NAME_MAX {
        return make_error_msg(
            MetaCode::NAME_TOO_LONG,
            format!("volume name exceeds {NAME_MAX} bytes"),
        );
    }
    Ok(())
}

fn volume_exists<T>(name: &str) -> Result<T> {
    make_error_msg(
        MetaCode::VOLUME_EXISTS,
        format!("volume {name:?} already exists"),
    )
}
