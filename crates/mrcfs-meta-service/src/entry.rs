//! Namespace entry and child index records with KV store operations.
//!
//! Each entry is stored under `[ENTRY_PREFIX][id LE8]`; the `(parent, name)`
//! index lives in separate child records under `[CHILD_PREFIX][parent LE8][name]`
//! so directory contents can be listed with a prefix scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mrcfs_kv::ReadOnlyTransaction;
use mrcfs_proto::meta::{EntryKindTag, EntryStat};
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::StatusCode;
use mrcfs_types::{Result, Status};

use crate::key_prefix;

/// Entry id type. Ids are 63-bit: allocated from `1..=i64::MAX`, never reused.
pub type EntryId = u64;

/// The id of every volume's root directory.
pub const ROOT_ENTRY_ID: EntryId = 1;

/// Sentinel parent id of the root directory.
pub const ROOT_PARENT_ID: EntryId = 0;

/// An access control entry granting `rights` (POSIX rwx bits) to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub entity: AclEntity,
    pub rights: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclEntity {
    User(String),
    Group(String),
    Other,
}

/// Kind-specific payload of a namespace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory {
        striping_policy: Option<String>,
        xattrs: BTreeMap<String, String>,
    },
    Symlink {
        target: String,
    },
}

/// A namespace entry: one file, directory or symlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub id: EntryId,
    pub parent_id: EntryId,
    pub name: String,
    /// Timestamps in whole seconds of the global clock.
    pub atime: i64,
    pub ctime: i64,
    pub mtime: i64,
    pub owner_id: String,
    pub owning_group_id: String,
    /// POSIX mode bits.
    pub mode: u32,
    pub acl: Option<Vec<AclEntry>>,
    pub kind: EntryKind,
}

impl NamespaceEntry {
    pub fn new_directory(
        id: EntryId,
        parent_id: EntryId,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        owning_group_id: impl Into<String>,
        mode: u32,
        now: i64,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            atime: now,
            ctime: now,
            mtime: now,
            owner_id: owner_id.into(),
            owning_group_id: owning_group_id.into(),
            mode: mode & 0o7777,
            acl: None,
            kind: EntryKind::Directory {
                striping_policy: None,
                xattrs: BTreeMap::new(),
            },
        }
    }

    pub fn new_file(
        id: EntryId,
        parent_id: EntryId,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        owning_group_id: impl Into<String>,
        mode: u32,
        now: i64,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            atime: now,
            ctime: now,
            mtime: now,
            owner_id: owner_id.into(),
            owning_group_id: owning_group_id.into(),
            mode: mode & 0o7777,
            acl: None,
            kind: EntryKind::File,
        }
    }

    pub fn new_symlink(
        id: EntryId,
        parent_id: EntryId,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        owning_group_id: impl Into<String>,
        target: impl Into<String>,
        now: i64,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            atime: now,
            ctime: now,
            mtime: now,
            owner_id: owner_id.into(),
            owning_group_id: owning_group_id.into(),
            mode: 0o777,
            acl: None,
            kind: EntryKind::Symlink {
                target: target.into(),
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ENTRY_ID
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }

    pub fn kind_tag(&self) -> EntryKindTag {
        match self.kind {
            EntryKind::File => EntryKindTag::File,
            EntryKind::Directory { .. } => EntryKindTag::Directory,
            EntryKind::Symlink { .. } => EntryKindTag::Symlink,
        }
    }

    /// The public stat view of this entry.
    pub fn to_stat(&self) -> EntryStat {
        let (link_target, striping_policy, xattrs) = match &self.kind {
            EntryKind::File => (None, None, None),
            EntryKind::Directory {
                striping_policy,
                xattrs,
            } => (None, striping_policy.clone(), Some(xattrs.clone())),
            EntryKind::Symlink { target } => (Some(target.clone()), None, None),
        };
        EntryStat {
            id: self.id,
            kind: self.kind_tag(),
            mode: self.mode,
            owner_id: self.owner_id.clone(),
            owning_group_id: self.owning_group_id.clone(),
            atime: self.atime,
            ctime: self.ctime,
            mtime: self.mtime,
            link_target,
            striping_policy,
            xattrs,
        }
    }

    /// Pack the KV key for this entry.
    pub fn pack_key(&self) -> Vec<u8> {
        Self::pack_key_for(self.id)
    }

    /// Pack the KV key for a given entry id.
    ///
    /// Key format: `[ENTRY_PREFIX] + [EntryId as little-endian 8 bytes]`
    pub fn pack_key_for(id: EntryId) -> Vec<u8> {
        let mut key = Vec::with_capacity(9);
        key.push(key_prefix::ENTRY_PREFIX);
        key.extend_from_slice(&id.to_le_bytes());
        key
    }

    /// Serialize the entry for KV value storage.
    pub fn pack_value(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            Status::with_message(
                StatusCode::DATA_CORRUPTION,
                format!("failed to serialize entry {}: {}", self.id, e),
            )
        })
    }

    /// Deserialize an entry from KV key and value bytes.
    pub fn unpack(key: &[u8], value: &[u8]) -> Result<Self> {
        if key.len() != 9 || key[0] != key_prefix::ENTRY_PREFIX {
            return make_error_msg(StatusCode::DATA_CORRUPTION, "invalid entry key format");
        }
        let id = u64::from_le_bytes(
            key[1..9]
                .try_into()
                .map_err(|_| Status::new(StatusCode::DATA_CORRUPTION))?,
        );
        let entry: Self = serde_json::from_slice(value).map_err(|e| {
            Status::with_message(
                StatusCode::DATA_CORRUPTION,
                format!("failed to deserialize entry {}: {}", id, e),
            )
        })?;
        if entry.id != id {
            return make_error_msg(
                StatusCode::DATA_CORRUPTION,
                format!("entry {} stored under key {}", entry.id, id),
            );
        }
        Ok(entry)
    }

    /// Load an entry from the KV store (snapshot read).
    pub async fn snapshot_load<T: ReadOnlyTransaction + ?Sized>(
        txn: &T,
        id: EntryId,
    ) -> Result<Option<Self>> {
        let key = Self::pack_key_for(id);
        match txn.snapshot_get(&key).await? {
            Some(v) => Ok(Some(Self::unpack(&key, &v)?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Child index
// ---------------------------------------------------------------------------

/// Value of a child index record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChildEntryData {
    id: EntryId,
    kind: EntryKindTag,
}

/// A `(parent, name) -> child id` index record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub parent: EntryId,
    pub name: String,
    pub id: EntryId,
    pub kind: EntryKindTag,
}

impl ChildEntry {
    pub fn new(parent: EntryId, name: impl Into<String>, id: EntryId, kind: EntryKindTag) -> Self {
        Self {
            parent,
            name: name.into(),
            id,
            kind,
        }
    }

    /// Index record pointing at an entry.
    pub fn for_entry(entry: &NamespaceEntry) -> Self {
        Self::new(entry.parent_id, entry.name.clone(), entry.id, entry.kind_tag())
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKindTag::Directory
    }

    /// Pack the KV key for this child record.
    pub fn pack_key(&self) -> Vec<u8> {
        Self::pack_key_for(self.parent, &self.name)
    }

    /// Pack the KV key for a given (parent, name) pair.
    ///
    /// Key format: `[CHILD_PREFIX] + [parent EntryId LE 8 bytes] + [name bytes]`
    pub fn pack_key_for(parent: EntryId, name: &str) -> Vec<u8> {
        let name_bytes = name.as_bytes();
        let mut key = Vec::with_capacity(1 + 8 + name_bytes.len());
        key.push(key_prefix::CHILD_PREFIX);
        key.extend_from_slice(&parent.to_le_bytes());
        key.extend_from_slice(name_bytes);
        key
    }

    /// Pack the prefix key for listing children of a directory.
    pub fn pack_prefix(parent: EntryId) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(9);
        prefix.push(key_prefix::CHILD_PREFIX);
        prefix.extend_from_slice(&parent.to_le_bytes());
        prefix
    }

    pub fn pack_value(&self) -> Result<Vec<u8>> {
        let data = ChildEntryData {
            id: self.id,
            kind: self.kind,
        };
        serde_json::to_vec(&data).map_err(|e| {
            Status::with_message(
                StatusCode::DATA_CORRUPTION,
                format!("failed to serialize child record: {}", e),
            )
        })
    }

    pub fn unpack(key: &[u8], value: &[u8]) -> Result<Self> {
        if key.len() < 9 || key[0] != key_prefix::CHILD_PREFIX {
            return make_error_msg(StatusCode::DATA_CORRUPTION, "invalid child key format");
        }
        let parent = u64::from_le_bytes(
            key[1..9]
                .try_into()
                .map_err(|_| Status::new(StatusCode::DATA_CORRUPTION))?,
        );
        let name = std::str::from_utf8(&key[9..])
            .map_err(|_| {
                Status::with_message(
                    StatusCode::DATA_CORRUPTION,
                    "child name is not valid UTF-8",
                )
            })?
            .to_string();
        let data: ChildEntryData = serde_json::from_slice(value).map_err(|e| {
            Status::with_message(
                StatusCode::DATA_CORRUPTION,
                format!("failed to deserialize child ({}, {}): {}", parent, name, e),
            )
        })?;
        Ok(Self {
            parent,
            name,
            id: data.id,
            kind: data.kind,
        })
    }

    /// Load a child record from the KV store (snapshot read).
    pub async fn snapshot_load<T: ReadOnlyTransaction + ?Sized>(
        txn: &T,
        parent: EntryId,
        name: &str,
    ) -> Result<Option<Self>> {
        let key = Self::pack_key_for(parent, name);
        match txn.snapshot_get(&key).await? {
            Some(v) => Ok(Some(Self::unpack(&key, &v)?)),
            None => Ok(None),
        }
    }

    /// Load the entry this child record points at; a dangling record is
    /// an inconsistency.
    pub async fn snapshot_load_entry<T: ReadOnlyTransaction + ?Sized>(
        &self,
        txn: &T,
    ) -> Result<NamespaceEntry> {
        NamespaceEntry::snapshot_load(txn, self.id)
            .await?
            .ok_or_else(|| {
                Status::with_message(
                    mrcfs_types::status_code::MetaCode::INCONSISTENT,
                    format!("child ({}, {}) points at missing entry {}", self.parent, self.name, self.id),
                )
            })
    }
}
