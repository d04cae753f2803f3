//! Byte-range lease arbitration.
//!
//! Files are divided into objects; a lease grants one client access to an
//! object range of one file for a bounded time. The [`LeaseManager`] keeps
//! one [`LeaseTable`] per file and arbitrates acquisition against the
//! configured compatibility policy. Expiry is lazy: expired leases are
//! purged whenever their table is next touched.

mod lease;
mod manager;
mod policy;
mod table;

pub use lease::{Lease, EXCLUSIVE_LEASE, TO_EOF};
pub use manager::{LeaseManager, DEFAULT_LEASE_VALIDITY};
pub use policy::{DefaultLeasePolicy, LeasePolicy};
pub use table::LeaseTable;
