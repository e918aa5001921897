//! AXL transport: one SOAP request per call
//!
//! [`AxlTransport::run`] builds the envelope for `(method, type, inner body)`,
//! POSTs it with basic authentication and unwraps the payload or the fault
//! string. Calls share nothing mutable, so one transport can serve many
//! concurrent calls. A failed call is reported once and never retried.
//! Dropping the returned future cancels the request.

use crate::config::{ConnectionConfig, TransportOptions};
use crate::error::{AxlError, Result};
use crate::result::AxlResult;
use crate::soap;
use async_trait::async_trait;
use regex::Regex;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Anything that can execute an AXL operation
#[async_trait]
pub trait AxlRunner: Send + Sync {
    /// Execute `method` + `entity` with a pre-built inner body
    async fn run(&self, method: &str, entity: &str, inner_body: &str) -> Result<AxlResult>;
}

/// All parts of one AXL HTTP request
#[derive(Clone)]
pub struct SoapRequest {
    pub url: String,
    pub method_type: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl SoapRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for SoapRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| (*name, redact_credentials(value)))
            .collect::<Vec<_>>();
        f.debug_struct("SoapRequest")
            .field("url", &self.url)
            .field("method_type", &self.method_type)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

fn credentials_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(basic|bearer)\s+[A-Za-z0-9+/=._\-]+")
            .expect("credential redaction pattern is valid")
    })
}

/// Replace credentials in an `Authorization`-style value with `***`
pub fn redact_credentials(value: &str) -> Cow<'_, str> {
    credentials_pattern().replace_all(value, "$1 ***")
}

#[derive(Clone)]
pub struct AxlTransport {
    client: reqwest::Client,
    config: Arc<ConnectionConfig>,
    endpoint: String,
}

impl AxlTransport {
    /// Transport with default options: `https://{host}:8443/axl/`, no timeout
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        Self::with_options(config, TransportOptions::default())
    }

    pub fn with_options(config: ConnectionConfig, options: TransportOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let endpoint = options
            .endpoint
            .unwrap_or_else(|| soap::endpoint_url(&config.host));

        Ok(Self {
            client,
            config: Arc::new(config),
            endpoint,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL, headers and envelope for one call, without sending anything
    pub fn build_request(&self, method: &str, entity: &str, inner_body: &str) -> SoapRequest {
        let method_type = soap::method_type(method, entity);
        let headers = vec![
            (
                "Authorization",
                soap::basic_auth(&self.config.user, &self.config.pass),
            ),
            ("Content-Type", "text/xml".to_string()),
            (
                "SOAPAction",
                soap::soap_action(&self.config.version, &method_type),
            ),
        ];
        let body = soap::build_envelope(&self.config.version, &method_type, inner_body);

        SoapRequest {
            url: self.endpoint.clone(),
            method_type,
            headers,
            body,
        }
    }

    pub async fn run(&self, method: &str, entity: &str, inner_body: &str) -> Result<AxlResult> {
        let request = self.build_request(method, entity, inner_body);
        debug!(
            url = %request.url,
            soap_action = ?request.header("SOAPAction"),
            body_len = request.body.len(),
            "Sending AXL request"
        );

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status();

        if let Some(transport_error) = response.error_for_status_ref().err() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Could not read AXL error body: {}", e);
                    return Err(AxlError::Transport(transport_error));
                }
            };

            return match soap::extract_fault(&body) {
                Some(fault) => {
                    debug!(status = %status, "AXL fault for {}: {}", request.method_type, fault);
                    Err(AxlError::Fault(fault))
                }
                None => {
                    warn!(status = %status, "AXL error response carried no SOAP fault");
                    Err(AxlError::Transport(transport_error))
                }
            };
        }

        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "AXL response received");
        soap::parse_response(&body, &request.method_type, entity)
    }
}

#[async_trait]
impl AxlRunner for AxlTransport {
    async fn run(&self, method: &str, entity: &str, inner_body: &str) -> Result<AxlResult> {
        AxlTransport::run(self, method, entity, inner_body).await
    }
}

impl std::fmt::Debug for AxlTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxlTransport")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> AxlTransport {
        AxlTransport::new(ConnectionConfig::new("cucm.lab", "admin", "secret", "12.5")).unwrap()
    }

    #[test]
    fn default_endpoint_uses_axl_port() {
        assert_eq!(transport().endpoint(), "https://cucm.lab:8443/axl/");
    }

    #[test]
    fn endpoint_override() {
        let transport = AxlTransport::with_options(
            ConnectionConfig::new("cucm.lab", "admin", "secret", "12.5"),
            TransportOptions::new().with_endpoint("http://127.0.0.1:9000/axl/"),
        )
        .unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9000/axl/");
    }

    #[test]
    fn build_request_headers_and_body() {
        let request = transport().build_request("get", "line", "<pattern>1000</pattern>");

        assert_eq!(request.method_type, "getLine");
        assert_eq!(request.header("content-type"), Some("text/xml"));
        assert_eq!(request.header("SOAPAction"), Some("CUCM:DB ver=12.5 getLine"));
        assert_eq!(
            request.header("Authorization"),
            Some(soap::basic_auth("admin", "secret").as_str())
        );
        assert!(request
            .body
            .contains("<axl:getLine xmlns:axl=\"http://www.cisco.com/AXL/API/12.5\"><pattern>1000</pattern></axl:getLine>"));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let request = transport().build_request("get", "line", "");
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains(&soap::basic_auth("admin", "secret")));
        assert!(rendered.contains("Basic ***"));

        let rendered = format!("{:?}", transport());
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn redaction_keeps_scheme() {
        assert_eq!(redact_credentials("Basic YWRtaW46c2VjcmV0"), "Basic ***");
        assert_eq!(redact_credentials("text/xml"), "text/xml");
    }
}
