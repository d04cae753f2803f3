//! Per-volume metadata store.
//!
//! Wraps one volume's KV engine. Reads run on snapshot transactions and
//! may proceed concurrently; every mutation goes through an
//! [`AtomicUpdate`](crate::atomic_update::AtomicUpdate), which holds the
//! volume's write token for its lifetime so writers execute one at a time.

use tokio::sync::Mutex;

use mrcfs_kv::KvEngine;

use crate::atomic_update::AtomicUpdate;

pub struct MetaStore<E: KvEngine> {
    engine: E,
    write_token: Mutex<()>,
}

impl<E: KvEngine> MetaStore<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            write_token: Mutex::new(()),
        }
    }

    /// Snapshot transaction for read-only operations.
    pub fn read_txn(&self) -> E::RoTxn {
        self.engine.create_readonly_transaction()
    }

    /// Begin an atomic update at the given timestamp (global-clock seconds).
    ///
    /// Waits for the volume write token; the returned update holds it until
    /// dropped.
    pub async fn begin_update(&self, now: i64) -> AtomicUpdate<'_, E> {
        let token = self.write_token.lock().await;
        AtomicUpdate::new(self.engine.create_readwrite_transaction(), token, now)
    }
}
