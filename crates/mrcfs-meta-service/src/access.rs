//! POSIX-like access control.
//!
//! Every capability check walks the same grant order: owner bits, group
//! bits (primary or supplementary group matching the owning group, or an
//! ACL group entry), an explicit ACL user entry, then other bits or an ACL
//! other entry. Superusers bypass all checks.

use mrcfs_proto::meta::UserInfo;
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::MetaCode;
use mrcfs_types::Result;

use crate::entry::{AclEntity, NamespaceEntry};
use crate::path_resolve::ResolutionResult;

/// The capability a caller needs on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    Search,
}

impl AccessMode {
    fn bit(self) -> u32 {
        match self {
            AccessMode::Read => 0o4,
            AccessMode::Write => 0o2,
            AccessMode::Search => 0o1,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Search => "search",
        }
    }
}

pub struct AccessController;

impl AccessController {
    /// Check that `caller` holds `mode` on `entry`.
    pub fn check_permission(
        entry: &NamespaceEntry,
        mode: AccessMode,
        caller: &UserInfo,
        path: &str,
    ) -> Result<()> {
        if Self::grants(entry, mode, caller) {
            return Ok(());
        }
        make_error_msg(
            MetaCode::NO_PERMISSION,
            format!("{} access to {} denied for {}", mode.describe(), path, caller.user_id),
        )
    }

    /// Check search permission on every directory traversed by a resolution.
    pub fn check_search_permission(
        resolution: &ResolutionResult,
        caller: &UserInfo,
        path: &str,
    ) -> Result<()> {
        for ancestor in &resolution.ancestors {
            Self::check_permission(ancestor, AccessMode::Search, caller, path)?;
        }
        Ok(())
    }

    fn grants(entry: &NamespaceEntry, mode: AccessMode, caller: &UserInfo) -> bool {
        if caller.superuser {
            return true;
        }
        let bit = mode.bit();

        // Owner bits.
        if caller.user_id == entry.owner_id && (entry.mode >> 6) & bit != 0 {
            return true;
        }

        // Group bits.
        let in_owning_group = caller.group_ids.iter().any(|g| *g == entry.owning_group_id);
        if in_owning_group && (entry.mode >> 3) & bit != 0 {
            return true;
        }

        if let Some(acl) = &entry.acl {
            // ACL group entries.
            for ace in acl {
                if let AclEntity::Group(g) = &ace.entity {
                    if caller.group_ids.iter().any(|cg| cg == g) && ace.rights & bit != 0 {
                        return true;
                    }
                }
            }
            // Explicit ACL user entry.
            for ace in acl {
                if let AclEntity::User(u) = &ace.entity {
                    if *u == caller.user_id && ace.rights & bit != 0 {
                        return true;
                    }
                }
            }
        }

        // Other bits.
        if entry.mode & bit != 0 {
            return true;
        }

        // ACL other entry.
        if let Some(acl) = &entry.acl {
            for ace in acl {
                if ace.entity == AclEntity::Other && ace.rights & bit != 0 {
                    return true;
                }
            }
        }

        false
    }
}
