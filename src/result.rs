//! Shape of an unwrapped AXL payload
//!
//! The server decides the shape: a bare string (UUID), one record with
//! attributes, or a collection of rows. [`AxlResult`] makes the caller pick.

use crate::error::{AxlError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AxlResult {
    /// Several records, or one record the parser did not wrap in a list
    Rows(Vec<Value>),
    Record(Map<String, Value>),
    Scalar(String),
    /// `<return/>` or no `return` element
    Empty,
}

impl AxlResult {
    /// Classify an unwrapped value. `row_shaped` marks values taken from a
    /// `row` field, where a lone record still means a collection of one.
    pub fn classify(value: Value, row_shaped: bool) -> Self {
        match value {
            Value::Array(items) => AxlResult::Rows(items),
            Value::Object(map) if row_shaped => AxlResult::Rows(vec![Value::Object(map)]),
            Value::Object(map) => AxlResult::Record(map),
            Value::String(s) if s.is_empty() => AxlResult::Empty,
            Value::String(s) => AxlResult::Scalar(s),
            Value::Null => AxlResult::Empty,
            other => AxlResult::Scalar(other.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AxlResult::Rows(_) => "rows",
            AxlResult::Record(_) => "record",
            AxlResult::Scalar(_) => "scalar",
            AxlResult::Empty => "empty",
        }
    }

    /// Back to the raw JSON shape
    pub fn into_value(self) -> Value {
        match self {
            AxlResult::Rows(rows) => Value::Array(rows),
            AxlResult::Record(map) => Value::Object(map),
            AxlResult::Scalar(s) => Value::String(s),
            AxlResult::Empty => Value::Null,
        }
    }

    /// Rows of a query. An empty result set is an empty list.
    pub fn into_rows(self) -> Result<Vec<Value>> {
        match self {
            AxlResult::Rows(rows) => Ok(rows),
            AxlResult::Record(map) => Ok(vec![Value::Object(map)]),
            AxlResult::Empty => Ok(Vec::new()),
            other => Err(AxlError::UnexpectedShape {
                expected: "rows",
                found: other.kind(),
            }),
        }
    }

    pub fn expect_record(self) -> Result<Map<String, Value>> {
        match self {
            AxlResult::Record(map) => Ok(map),
            other => Err(AxlError::UnexpectedShape {
                expected: "record",
                found: other.kind(),
            }),
        }
    }

    pub fn expect_scalar(self) -> Result<String> {
        match self {
            AxlResult::Scalar(s) => Ok(s),
            other => Err(AxlError::UnexpectedShape {
                expected: "scalar",
                found: other.kind(),
            }),
        }
    }

    /// `rowsUpdated` of an `executeSQLUpdate` response
    pub fn rows_updated(self) -> Result<u64> {
        let found = self.kind();
        let record = match self {
            AxlResult::Record(map) => map,
            _ => {
                return Err(AxlError::UnexpectedShape {
                    expected: "record",
                    found,
                })
            }
        };

        let count = record.get("rowsUpdated").ok_or_else(|| {
            AxlError::MalformedResponse("SQL update response has no rowsUpdated".to_string())
        })?;

        match count {
            Value::String(s) => s.trim().parse::<u64>().map_err(|e| {
                AxlError::MalformedResponse(format!("Invalid rowsUpdated '{}': {}", s, e))
            }),
            Value::Number(n) => n.as_u64().ok_or_else(|| {
                AxlError::MalformedResponse(format!("Invalid rowsUpdated {}", n))
            }),
            other => Err(AxlError::MalformedResponse(format!(
                "Invalid rowsUpdated {}",
                other
            ))),
        }
    }
}

/// Strip the braces AXL puts around UUIDs: `{ABCD-...}` becomes `ABCD-...`
pub fn strip_uuid_braces(uuid: &str) -> &str {
    uuid.trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or_else(|| uuid.trim())
}
