use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use mrcfs_proto::lease::{AcquireLeaseReq, ReleaseLeaseReq};
use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::StatusCode;
use mrcfs_types::time::{Duration, GlobalClock};
use mrcfs_types::Result;

use crate::lease::{Lease, TO_EOF};
use crate::policy::{DefaultLeasePolicy, LeasePolicy};
use crate::table::LeaseTable;

/// How long a grant stays valid unless renewed.
pub const DEFAULT_LEASE_VALIDITY: Duration = Duration::from_millis(15_000);

/// Arbitrates byte-range leases across all files.
///
/// Holds one [`LeaseTable`] per file id; tables are created on first
/// acquisition and dropped again once their last lease is gone.
pub struct LeaseManager {
    clock: Arc<dyn GlobalClock>,
    policy: Arc<dyn LeasePolicy>,
    validity: Duration,
    tables: Mutex<HashMap<String, LeaseTable>>,
}

impl LeaseManager {
    pub fn new(
        clock: Arc<dyn GlobalClock>,
        policy: Arc<dyn LeasePolicy>,
        validity: Duration,
    ) -> Self {
        Self {
            clock,
            policy,
            validity,
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Manager with the default policy and validity.
    pub fn with_defaults(clock: Arc<dyn GlobalClock>) -> Self {
        Self::new(clock, Arc::new(DefaultLeasePolicy), DEFAULT_LEASE_VALIDITY)
    }

    /// Try to acquire a lease; returns the granted lease with its assigned
    /// sequence number and expiry.
    pub fn try_acquire(&self, req: &AcquireLeaseReq) -> Result<Lease> {
        validate_acquire(req)?;

        let candidate = Lease {
            file_id: req.file_id.clone(),
            client_id: req.client_id.clone(),
            first_object: req.first_object,
            last_object: req.last_object,
            sequence_no: 0,
            expires: 0,
            operation: req.operation.clone(),
        };

        let now = self.clock.now_millis();
        let mut tables = self.tables.lock();
        let table = tables.entry(req.file_id.clone()).or_insert_with(LeaseTable::new);
        let granted = table.try_acquire(
            candidate,
            now,
            self.validity.as_millis() as i64,
            self.policy.as_ref(),
        )?;

        tracing::debug!(
            lease_id = %granted.lease_id(),
            client = %granted.client_id,
            operation = %granted.operation,
            "lease granted"
        );
        Ok(granted)
    }

    /// Release a lease. Stale releases (wrong client, unknown or already
    /// expired sequence number) are a no-op and return false.
    pub fn release(&self, req: &ReleaseLeaseReq) -> bool {
        let now = self.clock.now_millis();
        let mut tables = self.tables.lock();
        let released = match tables.get_mut(&req.file_id) {
            Some(table) => {
                let released = table.release(&req.client_id, req.sequence_no, now);
                if table.is_empty() {
                    tables.remove(&req.file_id);
                }
                released
            }
            None => false,
        };
        if released {
            tracing::debug!(
                file_id = %req.file_id,
                sequence_no = req.sequence_no,
                "lease released"
            );
        }
        released
    }

    /// The live leases on a file, expired ones purged.
    pub fn active_leases(&self, file_id: &str) -> Vec<Lease> {
        let now = self.clock.now_millis();
        let mut tables = self.tables.lock();
        match tables.get_mut(file_id) {
            Some(table) => {
                table.purge_expired(now);
                if table.is_empty() {
                    tables.remove(file_id);
                    Vec::new()
                } else {
                    table.active(now)
                }
            }
            None => Vec::new(),
        }
    }
}

fn validate_acquire(req: &AcquireLeaseReq) -> Result<()> {
    if req.file_id.is_empty() {
        return make_error_msg(StatusCode::INVALID_ARG, "file_id is empty");
    }
    if req.client_id.is_empty() {
        return make_error_msg(StatusCode::INVALID_ARG, "client_id is empty");
    }
    if req.operation.is_empty() {
        return make_error_msg(StatusCode::INVALID_ARG, "operation is empty");
    }
    if req.first_object < 0 {
        return make_error_msg(StatusCode::INVALID_ARG, "first_object is negative");
    }
    if req.last_object != TO_EOF && req.last_object < req.first_object {
        return make_error_msg(
            StatusCode::INVALID_ARG,
            "last_object precedes first_object",
        );
    }
    Ok(())
}
