//! Data model shared by every resource.
//!
//! # Design
//! Records stay untyped (`serde_json::Map`) so a single client serves every
//! dashboard entity; the per-entity knowledge lives in `ResourceConfig`.
//! Request bodies mirror record field names exactly.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// A flat record as returned by the backend: field name to scalar value.
pub type Record = serde_json::Map<String, Value>;

/// Identifier of a record, rendered into resource paths.
///
/// Numeric ids are the common case; some resources use string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    Number(u64),
    Key(String),
}

impl RecordId {
    /// Read the id from `field` of `record`.
    ///
    /// Non-negative JSON integers become `Number`; non-blank strings become
    /// `Key` exactly as stored, so `"007"` keeps its zeros. Anything else is
    /// a `MissingId` error.
    pub fn from_record(record: &Record, field: &str) -> Result<Self, ApiError> {
        let missing = || ApiError::MissingId {
            field: field.to_string(),
        };
        match record.get(field) {
            Some(Value::Number(n)) => n.as_u64().map(RecordId::Number).ok_or_else(missing),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(RecordId::Key(s.clone())),
            _ => Err(missing()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Key(k) => f.write_str(&urlencoding::encode(k)),
        }
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Key(s.to_string())
    }
}

/// One page of a list response.
///
/// The backend answers either with a bare array or with a pagination
/// envelope; both normalize to this shape. `total` is only known for the
/// envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub total: Option<u64>,
    pub next: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<Record>),
    Envelope {
        results: Vec<Record>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl Page {
    pub(crate) fn from_json(body: &[u8]) -> Result<Self, ApiError> {
        let parsed: ListBody = serde_json::from_slice(body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(match parsed {
            ListBody::Bare(records) => Page {
                records,
                total: None,
                next: None,
            },
            ListBody::Envelope {
                results,
                count,
                next,
            } => Page {
                records: results,
                total: count,
                next,
            },
        })
    }
}

/// Binary payload returned by an export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
