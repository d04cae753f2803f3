//! Shared types used by metadata request/response messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Caller identity attached to every metadata request.
///
/// `superuser` callers bypass permission checks entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub group_ids: Vec<String>,
    pub superuser: bool,
}

impl UserInfo {
    pub fn new(user_id: impl Into<String>, group_ids: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            group_ids,
            superuser: false,
        }
    }

    pub fn superuser() -> Self {
        Self {
            user_id: "root".into(),
            group_ids: vec!["root".into()],
            superuser: true,
        }
    }
}

/// Request base fields common to all metadata requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReqBase {
    pub user: UserInfo,
}

impl ReqBase {
    pub fn new(user: UserInfo) -> Self {
        Self { user }
    }
}

/// Entry kind discriminant carried in stat and listing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKindTag {
    File,
    Directory,
    Symlink,
}

impl Default for EntryKindTag {
    fn default() -> Self {
        Self::File
    }
}

/// Public view of a namespace entry, returned by stat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryStat {
    pub id: u64,
    pub kind: EntryKindTag,
    pub mode: u32,
    pub owner_id: String,
    pub owning_group_id: String,
    /// Timestamps in whole seconds of the global clock.
    pub atime: i64,
    pub ctime: i64,
    pub mtime: i64,
    /// Symlink target, present only for symlinks.
    pub link_target: Option<String>,
    /// Striping policy name, present only for directories that set one.
    pub striping_policy: Option<String>,
    /// Extended attributes, present only for directories.
    pub xattrs: Option<BTreeMap<String, String>>,
}

/// A single listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub id: u64,
    pub kind: EntryKindTag,
}
