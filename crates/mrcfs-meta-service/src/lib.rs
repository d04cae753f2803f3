//! Metadata service: volumes, a POSIX-like namespace with access control,
//! and atomic metadata updates over a per-volume KV store.

pub mod access;
pub mod atomic_update;
pub mod config;
pub mod entry;
pub mod key_prefix;
pub mod meta_store;
pub mod ops;
pub mod path;
pub mod path_resolve;
pub mod service;
pub mod volume;

#[cfg(test)]
pub(crate) mod test_util;

pub use access::{AccessController, AccessMode};
pub use atomic_update::AtomicUpdate;
pub use config::MetaServiceConfig;
pub use entry::{ChildEntry, EntryId, EntryKind, NamespaceEntry, ROOT_ENTRY_ID};
pub use meta_store::MetaStore;
pub use path::Path;
pub use path_resolve::{PathResolver, ResolutionResult};
pub use service::{MetaService, MetaServiceImpl};
pub use volume::{Volume, VolumeManager};
