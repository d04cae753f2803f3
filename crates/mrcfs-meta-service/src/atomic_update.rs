//! All-or-nothing mutation batches.
//!
//! An [`AtomicUpdate`] stages entry, child-index and id-counter writes
//! against one volume and applies them in a single transaction commit.
//! Dropping an update without executing it discards every staged mutation.

use tokio::sync::MutexGuard;

use mrcfs_kv::{KvEngine, ReadOnlyTransaction, ReadWriteTransaction};
use mrcfs_types::result::{make_error, make_error_msg};
use mrcfs_types::status_code::{MetaCode, StoreCode};
use mrcfs_types::{Result, Status};

use crate::entry::{ChildEntry, EntryId, NamespaceEntry};
use crate::key_prefix;

/// A staged mutation batch against one volume.
///
/// Holds the volume write token, so at most one update is open per volume.
/// `execute` transitions to the executed state exactly once; staging or
/// executing after that is an error.
pub struct AtomicUpdate<'a, E: KvEngine> {
    txn: E::RwTxn,
    /// Released on execute (or drop) to let the next writer in.
    token: Option<MutexGuard<'a, ()>>,
    timestamp: i64,
    /// Last allocated id, cached after the first `next_id` and persisted
    /// on execute in the same batch as the entries that use it.
    last_id: Option<EntryId>,
    executed: bool,
}

impl<'a, E: KvEngine> AtomicUpdate<'a, E> {
    pub(crate) fn new(txn: E::RwTxn, token: MutexGuard<'a, ()>, timestamp: i64) -> Self {
        Self {
            txn,
            token: Some(token),
            timestamp,
            last_id: None,
            executed: false,
        }
    }

    /// The global-clock seconds this update was begun at; every timestamp
    /// written by the update uses this value.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The transaction, for reads within the update.
    pub fn txn(&self) -> &E::RwTxn {
        &self.txn
    }

    fn check_open(&self) -> Result<()> {
        if self.executed {
            return make_error_msg(StoreCode::UPDATE_EXECUTED, "atomic update already executed");
        }
        Ok(())
    }

    /// Allocate the next entry id.
    ///
    /// Ids are strictly increasing and never reused: the persisted counter
    /// is read once per update and the new value is committed together with
    /// the entries that consume it, so a crash between allocation and
    /// creation can neither leak nor double-allocate an id.
    pub async fn next_id(&mut self) -> Result<EntryId> {
        self.check_open()?;
        let last = match self.last_id {
            Some(last) => last,
            None => match self.txn.snapshot_get(key_prefix::LAST_ID_KEY).await? {
                Some(raw) => EntryId::from_le_bytes(raw.as_slice().try_into().map_err(|_| {
                    Status::with_message(
                        mrcfs_types::status_code::StatusCode::DATA_CORRUPTION,
                        "last id record has invalid length",
                    )
                })?),
                None => 0,
            },
        };
        if last >= i64::MAX as u64 {
            return make_error(MetaCode::ID_ALLOC_FAILED);
        }
        let id = last + 1;
        self.last_id = Some(id);
        Ok(id)
    }

    pub async fn put_entry(&mut self, entry: &NamespaceEntry) -> Result<()> {
        self.check_open()?;
        let key = entry.pack_key();
        let value = entry.pack_value()?;
        self.txn.set(&key, &value).await
    }

    pub async fn remove_entry(&mut self, id: EntryId) -> Result<()> {
        self.check_open()?;
        self.txn.clear(&NamespaceEntry::pack_key_for(id)).await
    }

    pub async fn put_child(&mut self, child: &ChildEntry) -> Result<()> {
        self.check_open()?;
        let key = child.pack_key();
        let value = child.pack_value()?;
        self.txn.set(&key, &value).await
    }

    pub async fn remove_child(&mut self, parent: EntryId, name: &str) -> Result<()> {
        self.check_open()?;
        self.txn.clear(&ChildEntry::pack_key_for(parent, name)).await
    }

    /// Set the chosen timestamps on `entry` to this update's timestamp and
    /// stage the entry.
    pub async fn update_times(
        &mut self,
        entry: &mut NamespaceEntry,
        atime: bool,
        ctime: bool,
        mtime: bool,
    ) -> Result<()> {
        if atime {
            entry.atime = self.timestamp;
        }
        if ctime {
            entry.ctime = self.timestamp;
        }
        if mtime {
            entry.mtime = self.timestamp;
        }
        self.put_entry(entry).await
    }

    /// Apply every staged mutation atomically.
    ///
    /// Returns the update timestamp. A commit failure leaves the store
    /// unchanged and surfaces as `Store::Unavailable`.
    pub async fn execute(&mut self) -> Result<i64> {
        self.check_open()?;
        if let Some(last) = self.last_id {
            self.txn
                .set(key_prefix::LAST_ID_KEY, &last.to_le_bytes())
                .await?;
        }
        self.txn.commit().await.map_err(|e| {
            Status::with_message(StoreCode::UNAVAILABLE, format!("commit failed: {e}"))
        })?;
        self.executed = true;
        self.token.take();
        Ok(self.timestamp)
    }
}
