//! KV engine backends for mrcfs.

mod memdb;

pub use memdb::{MemDbEngine, MemDbReadOnlyTxn, MemDbReadWriteTxn};
