use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::LeaseCode;
use mrcfs_types::Result;

use crate::lease::Lease;
use crate::policy::LeasePolicy;

/// All leases on a single file.
///
/// The table bumps `next_sequence` past every sequence number it has ever
/// granted, so lease ids are never reused within a file even after
/// releases and expiries.
#[derive(Debug, Default)]
pub struct LeaseTable {
    leases: Vec<Lease>,
    next_sequence: u64,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self {
            leases: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Drop every lease whose expiry has been reached.
    pub fn purge_expired(&mut self, now_millis: i64) {
        self.leases.retain(|l| !l.is_expired(now_millis));
    }

    /// Try to grant `candidate` at `now_millis`.
    ///
    /// Expired leases are purged first. A lease held by the same client on
    /// the same range counts as a renewal and is replaced rather than
    /// conflicted against. The candidate's `sequence_no` and `expires` are
    /// assigned by the table; caller-provided values are ignored.
    pub fn try_acquire(
        &mut self,
        mut candidate: Lease,
        now_millis: i64,
        validity_millis: i64,
        policy: &dyn LeasePolicy,
    ) -> Result<Lease> {
        self.purge_expired(now_millis);

        for held in &self.leases {
            if held.renews(&candidate) {
                continue;
            }
            if held.overlaps(&candidate) && !policy.compatible(&held.operation, &candidate.operation)
            {
                return make_error_msg(
                    LeaseCode::CONFLICT,
                    format!(
                        "conflicting lease {} held by {} on objects {}..{}",
                        held.lease_id(),
                        held.client_id,
                        held.first_object,
                        held.last_object
                    ),
                );
            }
        }

        // A renewal replaces the previous grant.
        let renewed = candidate.clone();
        self.leases.retain(|l| !l.renews(&renewed));

        candidate.sequence_no = self.next_sequence;
        self.next_sequence += 1;
        candidate.expires = now_millis + validity_millis;
        self.leases.push(candidate.clone());
        Ok(candidate)
    }

    /// Release the lease matching `(client_id, sequence_no)`.
    ///
    /// Returns false if no live lease matches; releasing an already
    /// expired or unknown lease is a no-op.
    pub fn release(&mut self, client_id: &str, sequence_no: u64, now_millis: i64) -> bool {
        self.purge_expired(now_millis);
        let before = self.leases.len();
        self.leases
            .retain(|l| !(l.client_id == client_id && l.sequence_no == sequence_no));
        self.leases.len() < before
    }

    /// The live leases at `now_millis`, expired ones excluded.
    pub fn active(&self, now_millis: i64) -> Vec<Lease> {
        self.leases
            .iter()
            .filter(|l| !l.is_expired(now_millis))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}
