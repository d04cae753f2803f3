//! Lease messages and the flat key/value lease record codec.
//!
//! Lease records cross the client boundary as flat JSON objects whose
//! field names are fixed by the protocol (`fileId`, `clientId`,
//! `firstObject`, `lastObject`, `leaseId`, `expires`, `operation`).
//! Decoding validates each field individually so a malformed record
//! reports exactly which field is missing or mistyped.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use mrcfs_types::result::make_error_msg;
use mrcfs_types::status_code::StatusCode;
use mrcfs_types::Result;

// ---- Acquire / Release ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AcquireLeaseReq {
    pub file_id: String,
    pub client_id: String,
    pub first_object: i64,
    pub last_object: i64,
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AcquireLeaseRsp {
    pub sequence_no: u64,
    /// Absolute expiry in milliseconds of the global clock.
    pub expires: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseLeaseReq {
    pub file_id: String,
    pub client_id: String,
    pub sequence_no: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseLeaseRsp {
    pub released: bool,
}

// ---- Wire record ----

/// A lease as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub file_id: String,
    pub client_id: String,
    pub first_object: i64,
    pub last_object: i64,
    pub sequence_no: u64,
    pub expires: i64,
    pub operation: String,
}

impl LeaseRecord {
    /// Encode as the flat key/value object clients exchange.
    ///
    /// The sequence number travels as a string under `leaseId`.
    pub fn encode(&self) -> Value {
        json!({
            "fileId": self.file_id,
            "clientId": self.client_id,
            "firstObject": self.first_object,
            "lastObject": self.last_object,
            "leaseId": self.sequence_no.to_string(),
            "expires": self.expires,
            "operation": self.operation,
        })
    }

    /// Decode a flat key/value object.
    ///
    /// `fileId`, `clientId`, `firstObject`, `lastObject` and `operation`
    /// are required; `leaseId` and `expires` default to 0 when absent.
    pub fn decode(value: &Value) -> Result<Self> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                return make_error_msg(
                    StatusCode::INVALID_FORMAT,
                    "lease record is not a key/value object",
                )
            }
        };

        Ok(Self {
            file_id: required_str(obj, "fileId")?,
            client_id: required_str(obj, "clientId")?,
            first_object: required_i64(obj, "firstObject")?,
            last_object: required_i64(obj, "lastObject")?,
            sequence_no: optional_sequence_no(obj)?,
            expires: optional_i64(obj, "expires")?,
            operation: required_str(obj, "operation")?,
        })
    }
}

fn required_str(obj: &Map<String, Value>, field: &str) -> Result<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => make_error_msg(
            StatusCode::INVALID_FORMAT,
            format!("lease field {field} is not a string"),
        ),
        None => make_error_msg(
            StatusCode::INVALID_FORMAT,
            format!("lease field {field} is missing"),
        ),
    }
}

fn required_i64(obj: &Map<String, Value>, field: &str) -> Result<i64> {
    match obj.get(field) {
        Some(v) => match v.as_i64() {
            Some(n) => Ok(n),
            None => make_error_msg(
                StatusCode::INVALID_FORMAT,
                format!("lease field {field} is not an integer"),
            ),
        },
        None => make_error_msg(
            StatusCode::INVALID_FORMAT,
            format!("lease field {field} is missing"),
        ),
    }
}

fn optional_i64(obj: &Map<String, Value>, field: &str) -> Result<i64> {
    match obj.get(field) {
        Some(v) => match v.as_i64() {
            Some(n) => Ok(n),
            None => make_error_msg(
                StatusCode::INVALID_FORMAT,
                format!("lease field {field} is not an integer"),
            ),
        },
        None => Ok(0),
    }
}

/// `leaseId` is string-encoded on the wire and defaults to 0.
fn optional_sequence_no(obj: &Map<String, Value>) -> Result<u64> {
    match obj.get("leaseId") {
        Some(Value::String(s)) => match s.parse::<u64>() {
            Ok(n) => Ok(n),
            Err(_) => make_error_msg(
                StatusCode::INVALID_FORMAT,
                "lease field leaseId is not a decimal integer",
            ),
        },
        Some(_) => make_error_msg(
            StatusCode::INVALID_FORMAT,
            "lease field leaseId is not a string",
        ),
        None => Ok(0),
    }
}
