//! AXL - Cisco Unified Communications Manager administration client
//!
//! Every call goes through one primitive, `run(method, type, inner_body)`,
//! which wraps the body in a SOAP envelope, posts it to the AXL endpoint and
//! hands back the unwrapped payload or the server's fault string.

pub mod cli;
pub mod config;
pub mod error;
pub mod operations;
pub mod output;
pub mod result;
pub mod soap;
pub mod sql;
pub mod transport;
pub mod xml;

pub use config::{ConnectionConfig, Defaults, TransportOptions};
pub use error::{AxlError, Result};
pub use operations::AxlOperations;
pub use output::OutputEnvelope;
pub use result::AxlResult;
pub use sql::{SqlStatement, SqlValue};
pub use transport::{AxlRunner, AxlTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
