//! Metadata service request/response messages and shared types.

pub mod ops;
pub mod types;

pub use ops::*;
pub use types::*;
