//! mrcfs-types: common types shared by every mrcfs crate.
//!
//! Provides the [`Status`] error value and numeric status-code taxonomy,
//! the crate-wide [`Result`] alias, and the [`time::GlobalClock`] abstraction
//! that all timestamps in the metadata and lease layers derive from.

pub mod result;
pub mod status;
pub mod status_code;
pub mod time;

pub use result::Result;
pub use status::Status;
