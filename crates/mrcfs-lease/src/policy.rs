use crate::lease::EXCLUSIVE_LEASE;

/// Decides whether two lease operations may coexist on overlapping ranges.
pub trait LeasePolicy: Send + Sync {
    fn compatible(&self, held: &str, requested: &str) -> bool;
}

/// The default policy: the exclusive-write operation conflicts with
/// everything, all other operations are mutually compatible.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLeasePolicy;

impl LeasePolicy for DefaultLeasePolicy {
    fn compatible(&self, held: &str, requested: &str) -> bool {
        held != EXCLUSIVE_LEASE && requested != EXCLUSIVE_LEASE
    }
}
