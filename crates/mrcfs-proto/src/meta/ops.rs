//! Metadata operation request/response types.

use serde::{Deserialize, Serialize};

use super::types::*;

// ---- CreateVolume ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateVolumeReq {
    pub base: ReqBase,
    pub name: String,
    /// Mode bits for the volume root directory.
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateVolumeRsp {
    pub timestamp: i64,
}

// ---- CreateDir ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateDirReq {
    pub base: ReqBase,
    /// Slash-separated path whose first component is the volume name.
    pub path: String,
    pub mode: u32,
}

// ---- CreateFile ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateFileReq {
    pub base: ReqBase,
    pub path: String,
    pub mode: u32,
}

// ---- Symlink ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymlinkReq {
    pub base: ReqBase,
    pub path: String,
    pub target: String,
}

// ---- Remove ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoveReq {
    pub base: ReqBase,
    pub path: String,
}

// ---- Rename ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenameReq {
    pub base: ReqBase,
    pub from: String,
    pub to: String,
}

// ---- SetAttr ----

/// Attribute changes to apply; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetAttrs {
    pub mode: Option<u32>,
    pub owner_id: Option<String>,
    pub owning_group_id: Option<String>,
    pub atime: Option<i64>,
    pub mtime: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetAttrReq {
    pub base: ReqBase,
    pub path: String,
    pub attrs: SetAttrs,
}

// ---- SetXAttr ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetXAttrReq {
    pub base: ReqBase,
    pub path: String,
    pub key: String,
    /// None removes the attribute.
    pub value: Option<String>,
}

// ---- Stat ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatReq {
    pub base: ReqBase,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatRsp {
    pub stat: EntryStat,
}

// ---- List ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListReq {
    pub base: ReqBase,
    pub path: String,
    /// Resume after this child name; empty string starts from the beginning.
    pub start_after: String,
    /// Maximum number of entries to return; 0 asks for the service's
    /// configured default page size.
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListRsp {
    pub entries: Vec<DirEntry>,
    pub has_more: bool,
}

// ---- Common mutation response ----

/// Response for mutations that only need to report the applied timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimestampRsp {
    /// Seconds of the global clock at which the mutation was applied.
    pub timestamp: i64,
}
