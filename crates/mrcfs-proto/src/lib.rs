//! Service messages for mrcfs.
//!
//! The `meta` module carries the namespace request/response types, the
//! `lease` module the flat key/value lease record exchanged with clients.

pub mod lease;
pub mod meta;
