mod engine;
mod transaction;

pub use engine::KvEngine;
pub use transaction::*;

/// Return the key immediately after the given key (for range queries).
///
/// This appends a zero byte, making the result strictly greater than the input
/// in lexicographic order.
pub fn key_after(key: &[u8]) -> Vec<u8> {
    let mut result = key.to_vec();
    result.push(0);
    result
}

/// Return the end key for a prefix range scan.
///
/// Increments the last non-0xFF byte of the prefix. If the prefix is all 0xFF
/// bytes (or empty), returns an empty vec to indicate "no upper bound".
pub fn prefix_list_end_key(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return end;
        }
        end.pop();
    }
    // Empty means the prefix was all 0xFF bytes - return empty to mean "no upper bound"
    end
}
