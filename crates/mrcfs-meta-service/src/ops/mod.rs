//! Metadata operations.
//!
//! Each operation is a free async function over one volume's store. Reads
//! run on a snapshot transaction; mutations run inside an atomic update and
//! commit with a single `execute`.

mod create;
mod list;
mod remove;
mod rename;
mod set_attr;
mod stat;

pub use create::{create_dir, create_file, symlink};
pub use list::list;
pub use remove::remove;
pub use rename::rename;
pub use set_attr::{set_attr, set_xattr};
pub use stat::stat;

use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::StatusCode;
use mrcfs_types::Result;

use crate::config::MetaServiceConfig;
use crate::path::Path;

/// Parse a request path and apply the configured limits.
pub fn parse_path(config: &MetaServiceConfig, raw: &str) -> Result<Path> {
    let path = Path::parse(raw)?;
    if path.components.len() > config.max_path_depth {
        return make_error_msg(
            StatusCode::INVALID_ARG,
            format!("path depth exceeds {}", config.max_path_depth),
        );
    }
    for component in &path.components {
        if component.len() > config.max_name_len {
            return make_error_msg(
                mrcfs_types::status_code::MetaCode::NAME_TOO_LONG,
                format!("path component exceeds {} bytes", config.max_name_len),
            );
        }
    }
    Ok(path)
}
