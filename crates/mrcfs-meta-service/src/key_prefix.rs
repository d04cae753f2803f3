//! KV key prefixes for the per-volume metadata key space.

/// Namespace entry records: `[ENTRY_PREFIX][id LE8]`.
pub const ENTRY_PREFIX: u8 = 0x01;

/// Child index records: `[CHILD_PREFIX][parent LE8][name]`.
pub const CHILD_PREFIX: u8 = 0x02;

/// The last allocated entry id, stored as 8 little-endian bytes.
pub const LAST_ID_KEY: &[u8] = b"\xff/lastEntryId";
