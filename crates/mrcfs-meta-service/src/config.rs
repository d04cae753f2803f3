//! Configuration for the metadata service.

/// Configuration for the metadata service.
#[derive(Debug, Clone)]
pub struct MetaServiceConfig {
    /// Whether the service is in read-only mode.
    pub readonly: bool,

    /// Whether requests must carry a caller identity.
    pub authenticate: bool,

    /// Maximum length of a single path component, in bytes.
    pub max_name_len: usize,

    /// Maximum path depth below a volume root.
    pub max_path_depth: usize,

    /// Default limit for list (readdir) operations.
    pub list_default_limit: i32,
}

impl Default for MetaServiceConfig {
    fn default() -> Self {
        Self {
            readonly: false,
            authenticate: true,
            max_name_len: 255,
            max_path_depth: 64,
            list_default_limit: 128,
        }
    }
}
