use serde::{Deserialize, Serialize};

use mrcfs_proto::lease::LeaseRecord;

/// Sentinel for an open-ended range: the lease covers every object from
/// `first_object` to the end of the file, wherever that currently is.
pub const TO_EOF: i64 = -1;

/// The exclusive-write operation. Conflicts with every other operation
/// under the default policy.
pub const EXCLUSIVE_LEASE: &str = "w";

/// A granted byte-range lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub file_id: String,
    pub client_id: String,
    pub first_object: i64,
    /// Last covered object, or [`TO_EOF`] for an open-ended range.
    pub last_object: i64,
    pub sequence_no: u64,
    /// Absolute expiry in milliseconds of the global clock.
    pub expires: i64,
    pub operation: String,
}

impl Lease {
    /// The lease identifier rendered for clients: `"{file_id}/{sequence_no}"`.
    pub fn lease_id(&self) -> String {
        format!("{}/{}", self.file_id, self.sequence_no)
    }

    /// Whether this lease has expired at `now_millis`.
    ///
    /// A lease is no longer valid at the instant its expiry is reached.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires <= now_millis
    }

    /// Whether the object ranges of two leases overlap.
    ///
    /// Ranges are disjoint only if one ends strictly before the other
    /// begins; an open-ended range never ends, so [`TO_EOF`] can only be
    /// disjoint from ranges lying entirely before its start.
    pub fn overlaps(&self, other: &Lease) -> bool {
        let self_ends_first = self.last_object != TO_EOF && other.first_object > self.last_object;
        let other_ends_first =
            other.last_object != TO_EOF && self.first_object > other.last_object;
        !(self_ends_first || other_ends_first)
    }

    /// Whether `other` is a renewal of this lease: same client asking for
    /// the same range again.
    pub fn renews(&self, other: &Lease) -> bool {
        self.client_id == other.client_id
            && self.first_object == other.first_object
            && self.last_object == other.last_object
    }

    pub fn to_record(&self) -> LeaseRecord {
        LeaseRecord {
            file_id: self.file_id.clone(),
            client_id: self.client_id.clone(),
            first_object: self.first_object,
            last_object: self.last_object,
            sequence_no: self.sequence_no,
            expires: self.expires,
            operation: self.operation.clone(),
        }
    }

    pub fn from_record(record: LeaseRecord) -> Self {
        Self {
            file_id: record.file_id,
            client_id: record.client_id,
            first_object: record.first_object,
            last_object: record.last_object,
            sequence_no: record.sequence_no,
            expires: record.expires,
            operation: record.operation,
        }
    }
}
