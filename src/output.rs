//! Output formatting - deterministic JSON envelope

use crate::error::AxlError;
use crate::result::AxlResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard CLI output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputEnvelope {
    /// Indicates success or failure
    pub ok: bool,

    /// Output kind (call_result, query_result, update_result, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// AXL endpoint (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// AXL operation name, e.g. `getLine`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Result shape: rows, record, scalar or empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,

    /// Payload data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Error information (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    pub meta: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Envelope schema version
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl OutputEnvelope {
    /// Create a success response
    pub fn success(
        kind: &str,
        endpoint: &str,
        operation: Option<&str>,
        shape: Option<&str>,
        data: Value,
        duration_ms: Option<u64>,
    ) -> Self {
        Self {
            ok: true,
            kind: Some(kind.to_string()),
            endpoint: Some(endpoint.to_string()),
            operation: operation.map(ToString::to_string),
            shape: shape.map(ToString::to_string),
            data: Some(data),
            error: None,
            meta: Metadata {
                version: "v1".to_string(),
                duration_ms,
            },
        }
    }

    /// Success envelope for a raw `run` result
    pub fn from_result(
        endpoint: &str,
        operation: &str,
        result: AxlResult,
        duration_ms: Option<u64>,
    ) -> Self {
        let shape = result.kind();
        Self::success(
            "call_result",
            endpoint,
            Some(operation),
            Some(shape),
            result.into_value(),
            duration_ms,
        )
    }

    /// Create an error response
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            kind: None,
            endpoint: None,
            operation: None,
            shape: None,
            data: None,
            error: Some(ErrorInfo {
                code: code.to_string(),
                message: message.to_string(),
            }),
            meta: Metadata {
                version: "v1".to_string(),
                duration_ms: None,
            },
        }
    }

    pub fn from_error(err: &AxlError) -> Self {
        Self::error(err.code(), &err.to_string())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
