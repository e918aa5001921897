//! AXL error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AxlError>;

#[derive(Error, Debug)]
pub enum AxlError {
    /// Network, TLS or HTTP status failure with no usable SOAP fault body.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// SOAP fault returned by the server. Displays the bare fault string.
    #[error("{0}")]
    Fault(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unexpected result shape: expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AxlError {
    /// Machine-readable code used in CLI error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            AxlError::Transport(_) => "TRANSPORT_ERROR",
            AxlError::Fault(_) => "SOAP_FAULT",
            AxlError::MalformedResponse(_) | AxlError::Xml(_) => "MALFORMED_RESPONSE",
            AxlError::UnexpectedShape { .. } => "UNEXPECTED_SHAPE",
            AxlError::InvalidArguments(_) => "INVALID_ARGUMENT",
            AxlError::Config(_) => "CONFIG_ERROR",
            AxlError::Json(_) | AxlError::Io(_) => "EXECUTION_FAILED",
        }
    }

    /// The fault string when the server rejected the request
    pub fn fault_string(&self) -> Option<&str> {
        match self {
            AxlError::Fault(message) => Some(message),
            _ => None,
        }
    }
}
