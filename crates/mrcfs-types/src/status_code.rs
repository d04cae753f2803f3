/// Status code type alias (u16, grouped by service in numeric ranges).
#[allow(non_camel_case_types)]
pub type status_code_t = u16;

/// Common status codes (0-999).
#[allow(non_snake_case)]
pub mod StatusCode {
    use super::status_code_t;

    pub const OK: status_code_t = 0;
    pub const NOT_IMPLEMENTED: status_code_t = 1;
    pub const DATA_CORRUPTION: status_code_t = 2;
    pub const INVALID_ARG: status_code_t = 3;
    pub const INVALID_CONFIG: status_code_t = 4;
    pub const AUTHENTICATION_FAIL: status_code_t = 25;
    pub const INVALID_FORMAT: status_code_t = 33;
    pub const READ_ONLY_MODE: status_code_t = 34;
    pub const FOUND_BUG: status_code_t = 998;
    pub const UNKNOWN: status_code_t = 999;
}

/// Store (persistence collaborator) status codes (1xxx).
#[allow(non_snake_case)]
pub mod StoreCode {
    use super::status_code_t;

    pub const UNAVAILABLE: status_code_t = 1000;
    pub const CONFLICT: status_code_t = 1001;
    pub const UPDATE_EXECUTED: status_code_t = 1002;
}

/// Metadata service status codes (3xxx).
#[allow(non_snake_case)]
pub mod MetaCode {
    use super::status_code_t;

    pub const NOT_FOUND: status_code_t = 3000;
    pub const NOT_EMPTY: status_code_t = 3001;
    pub const NOT_DIRECTORY: status_code_t = 3003;
    pub const IS_DIRECTORY: status_code_t = 3006;
    pub const EXISTS: status_code_t = 3007;
    pub const NO_PERMISSION: status_code_t = 3008;
    pub const INCONSISTENT: status_code_t = 3009;
    pub const NOT_FILE: status_code_t = 3010;
    pub const ID_ALLOC_FAILED: status_code_t = 3012;
    pub const NAME_TOO_LONG: status_code_t = 3017;
    pub const VOLUME_NOT_FOUND: status_code_t = 3020;
    pub const VOLUME_EXISTS: status_code_t = 3021;
    pub const FOUND_BUG: status_code_t = 3999;
}

/// Lease arbitration status codes (4xxx).
#[allow(non_snake_case)]
pub mod LeaseCode {
    use super::status_code_t;

    pub const CONFLICT: status_code_t = 4000;
    pub const NOT_FOUND: status_code_t = 4001;
}

/// Classification of status code ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum StatusCodeType {
    Invalid = -1,
    Common = 0,
    Store = 1,
    Meta = 3,
    Lease = 4,
}

/// Determine the type/category of a status code.
pub fn type_of(code: status_code_t) -> StatusCodeType {
    match code {
        0..=999 => StatusCodeType::Common,
        1000..=1999 => StatusCodeType::Store,
        3000..=3999 => StatusCodeType::Meta,
        4000..=4999 => StatusCodeType::Lease,
        _ => StatusCodeType::Invalid,
    }
}

/// Convert a status code to its human-readable name.
pub fn to_string(code: status_code_t) -> &'static str {
    match code {
        StatusCode::OK => "OK",
        StatusCode::NOT_IMPLEMENTED => "NotImplemented",
        StatusCode::DATA_CORRUPTION => "DataCorruption",
        StatusCode::INVALID_ARG => "InvalidArg",
        StatusCode::INVALID_CONFIG => "InvalidConfig",
        StatusCode::AUTHENTICATION_FAIL => "AuthenticationFail",
        StatusCode::INVALID_FORMAT => "InvalidFormat",
        StatusCode::READ_ONLY_MODE => "ReadOnlyMode",
        StatusCode::FOUND_BUG => "FoundBug",
        StatusCode::UNKNOWN => "Unknown",

        StoreCode::UNAVAILABLE => "Store::Unavailable",
        StoreCode::CONFLICT => "Store::Conflict",
        StoreCode::UPDATE_EXECUTED => "Store::UpdateExecuted",

        MetaCode::NOT_FOUND => "Meta::NotFound",
        MetaCode::NOT_EMPTY => "Meta::NotEmpty",
        MetaCode::NOT_DIRECTORY => "Meta::NotDirectory",
        MetaCode::IS_DIRECTORY => "Meta::IsDirectory",
        MetaCode::EXISTS => "Meta::Exists",
        MetaCode::NO_PERMISSION => "Meta::NoPermission",
        MetaCode::INCONSISTENT => "Meta::Inconsistent",
        MetaCode::NOT_FILE => "Meta::NotFile",
        MetaCode::ID_ALLOC_FAILED => "Meta::IdAllocFailed",
        MetaCode::NAME_TOO_LONG => "Meta::NameTooLong",
        MetaCode::VOLUME_NOT_FOUND => "Meta::VolumeNotFound",
        MetaCode::VOLUME_EXISTS => "Meta::VolumeExists",
        MetaCode::FOUND_BUG => "Meta::FoundBug",

        LeaseCode::CONFLICT => "Lease::Conflict",
        LeaseCode::NOT_FOUND => "Lease::NotFound",

        _ => "UnknownStatusCode",
    }
}

/// Convert a status code to the corresponding POSIX errno value.
///
/// Metadata failures map onto the errno a POSIX client expects;
/// everything else degrades to EIO.
pub fn to_errno(code: status_code_t) -> i32 {
    match code {
        c if c == StatusCode::INVALID_ARG => libc::EINVAL,
        c if c == StatusCode::NOT_IMPLEMENTED => libc::ENOSYS,
        c if c == StatusCode::AUTHENTICATION_FAIL => libc::EPERM,
        c if c == StatusCode::READ_ONLY_MODE => libc::EROFS,

        c if c == MetaCode::NOT_FOUND => libc::ENOENT,
        c if c == MetaCode::NOT_EMPTY => libc::ENOTEMPTY,
        c if c == MetaCode::NOT_DIRECTORY => libc::ENOTDIR,
        c if c == MetaCode::IS_DIRECTORY => libc::EISDIR,
        c if c == MetaCode::EXISTS => libc::EEXIST,
        c if c == MetaCode::VOLUME_EXISTS => libc::EEXIST,
        c if c == MetaCode::VOLUME_NOT_FOUND => libc::ENOENT,
        c if c == MetaCode::NO_PERMISSION => libc::EACCES,
        c if c == MetaCode::INCONSISTENT => libc::EIO,
        c if c == MetaCode::NOT_FILE => libc::EBADF,
        c if c == MetaCode::NAME_TOO_LONG => libc::ENAMETOOLONG,

        c if c == LeaseCode::CONFLICT => libc::EAGAIN,

        _ => libc::EIO,
    }
}
