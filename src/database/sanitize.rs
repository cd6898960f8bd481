use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::validation::date::is_zero_instant;

/// Errors from turning an update record into statement parameters
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("update parameters must be a record, got {0}")]
    NotARecord(&'static str),

    #[error("failed to decompose update record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One bound parameter of a COALESCE-style partial update
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Bound as SQL NULL so `COALESCE($n, existing)` keeps the stored column
    Null,
    /// Passed through exactly as the record held it
    Value(Value),
    /// An RFC 3339 string that parsed to a real instant
    Timestamp(DateTime<FixedOffset>),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlParam::Null | SqlParam::Value(Value::Null))
    }

    /// Text binding for a text column. Timestamps are rendered back to RFC 3339.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlParam::Null | SqlParam::Value(Value::Null) => None,
            SqlParam::Value(Value::String(s)) => Some(s.clone()),
            SqlParam::Value(other) => Some(other.to_string()),
            SqlParam::Timestamp(ts) => Some(ts.to_rfc3339()),
        }
    }

    /// Timestamp binding for a timestamptz column. Anything that is not a
    /// parsed instant binds as NULL.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SqlParam::Timestamp(ts) => Some(ts.with_timezone(&Utc)),
            _ => None,
        }
    }
}

/// Column name -> parameter, one entry per field of the sanitized record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedParams(HashMap<String, SqlParam>);

impl SanitizedParams {
    pub fn get(&self, column: &str) -> Option<&SqlParam> {
        self.0.get(column)
    }

    /// Text parameter for `column`; a missing column binds as NULL.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(SqlParam::as_text)
    }

    /// Timestamp parameter for `column`; a missing column binds as NULL.
    pub fn timestamp(&self, column: &str) -> Option<DateTime<Utc>> {
        self.get(column).and_then(SqlParam::as_timestamp)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> HashMap<String, SqlParam> {
        self.0
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn sanitize_value(value: Value) -> SqlParam {
    match value {
        Value::String(s) if s.is_empty() => SqlParam::Null,
        Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
            Ok(ts) if is_zero_instant(&ts) => SqlParam::Null,
            Ok(ts) => SqlParam::Timestamp(ts),
            Err(_) => SqlParam::Value(Value::String(s)),
        },
        // Only strings are sniffed; a numeric 0 is a real value
        other => SqlParam::Value(other),
    }
}

/// Convert a sparse update record into partial-update parameters.
///
/// The record is decomposed by its serialized field names. Empty strings and
/// the zero timestamp (`0001-01-01T00:00:00Z`) become [`SqlParam::Null`],
/// other RFC 3339 strings become [`SqlParam::Timestamp`], and every other
/// value passes through untouched. Values that do not serialize to a record
/// are rejected.
pub fn sanitize_update_params<T: Serialize + ?Sized>(
    record: &T,
) -> Result<SanitizedParams, SanitizeError> {
    let fields = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        other => return Err(SanitizeError::NotARecord(kind_of(&other))),
    };

    Ok(SanitizedParams(
        fields
            .into_iter()
            .map(|(column, value)| (column, sanitize_value(value)))
            .collect(),
    ))
}
