//! Request path parsing.
//!
//! Paths arrive as slash-separated strings whose first component names the
//! volume; everything after it is resolved inside that volume's namespace.

use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::{MetaCode, StatusCode};
use mrcfs_types::Result;

/// Maximum length of a single path component, in bytes.
pub const NAME_MAX: usize = 255;

/// A parsed request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub volume: String,
    pub components: Vec<String>,
}

impl Path {
    /// Parse a raw path string.
    ///
    /// Leading, trailing and repeated slashes are ignored. The first
    /// component is the volume name. `.` and `..` components are rejected,
    /// as are components longer than [`NAME_MAX`].
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('/').filter(|s| !s.is_empty());

        let volume = match parts.next() {
            Some(v) => v.to_string(),
            None => return make_error_msg(StatusCode::INVALID_ARG, "path names no volume"),
        };

        let mut components = Vec::new();
        for part in parts {
            if part == "." || part == ".." {
                return make_error_msg(
                    StatusCode::INVALID_ARG,
                    format!("path component {part:?} is not allowed"),
                );
            }
            if part.len() > NAME_MAX {
                return make_error_msg(
                    MetaCode::NAME_TOO_LONG,
                    format!("path component exceeds {NAME_MAX} bytes"),
                );
            }
            components.push(part.to_string());
        }

        Ok(Self { volume, components })
    }

    /// Whether this path names the volume root itself.
    pub fn is_volume_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The final component, or `""` for the volume root.
    pub fn final_component(&self) -> &str {
        self.components.last().map(String::as_str).unwrap_or("")
    }

    /// Render back to the canonical string form.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(1 + self.volume.len());
        out.push('/');
        out.push_str(&self.volume);
        for c in &self.components {
            out.push('/');
            out.push_str(c);
        }
        out
    }
}
