//! AXL SOAP envelope construction and response unwrapping
//!
//! Everything here is pure: the transport supplies the configuration and the
//! response text, these functions produce request parts and extract payloads.

use crate::error::{AxlError, Result};
use crate::result::AxlResult;
use crate::xml::parse_xml;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

pub const SOAPENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const AXL_NS_PREFIX: &str = "http://www.cisco.com/AXL/API/";

const ENVELOPE_KEY: &str = "soapenv:Envelope";
const BODY_KEY: &str = "soapenv:Body";
const FAULT_KEY: &str = "soapenv:Fault";

/// `method` followed by `entity` with its first character upper-cased.
///
/// `("get", "line")` gives `getLine`, `("execute", "SQLQuery")` gives
/// `executeSQLQuery`.
pub fn method_type(method: &str, entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", method, first.to_uppercase(), chars.as_str()),
        None => method.to_string(),
    }
}

pub fn endpoint_url(host: &str) -> String {
    format!("https://{}:{}/axl/", host, crate::config::AXL_PORT)
}

/// Value of the `Authorization` header
pub fn basic_auth(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
}

/// Value of the `SOAPAction` header
pub fn soap_action(version: &str, method_type: &str) -> String {
    format!("CUCM:DB ver={} {}", version, method_type)
}

/// Full SOAP 1.1 request envelope with `inner_body` placed verbatim
pub fn build_envelope(version: &str, method_type: &str, inner_body: &str) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="{soapenv}" xmlns:xsd="{xsd}" xmlns:xsi="{xsi}">"#,
            "<soapenv:Body>",
            r#"<axl:{method_type} xmlns:axl="{axl}{version}">"#,
            "{inner_body}",
            "</axl:{method_type}>",
            "</soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        soapenv = SOAPENV_NS,
        xsd = XSD_NS,
        xsi = XSI_NS,
        axl = AXL_NS_PREFIX,
        version = version,
        method_type = method_type,
        inner_body = inner_body,
    )
}

/// Pick the payload out of a parsed success response.
///
/// Path: `soapenv:Envelope` / `soapenv:Body` / `ns:{methodType}Response` /
/// `return`, then `row` if present, else the field named `entity`, else the
/// whole `return` value.
pub fn unwrap_response(document: &Value, method_type: &str, entity: &str) -> Result<Value> {
    select_payload(document, method_type, entity).map(|(payload, _)| payload)
}

/// [`unwrap_response`] classified into an [`AxlResult`]
pub fn unwrap_result(document: &Value, method_type: &str, entity: &str) -> Result<AxlResult> {
    let (payload, from_rows) = select_payload(document, method_type, entity)?;
    Ok(AxlResult::classify(payload, from_rows))
}

fn select_payload(document: &Value, method_type: &str, entity: &str) -> Result<(Value, bool)> {
    let response_key = format!("ns:{}Response", method_type);
    let response = document
        .get(ENVELOPE_KEY)
        .and_then(|envelope| envelope.get(BODY_KEY))
        .and_then(|body| body.get(&response_key))
        .ok_or_else(|| {
            AxlError::MalformedResponse(format!("Response is missing {}", response_key))
        })?;

    let Some(returned) = response.get("return") else {
        // `<ns:xResponse/>` or a response without a `return` child
        return Ok((Value::Null, false));
    };

    if let Some(rows) = returned.get("row") {
        return Ok((rows.clone(), true));
    }
    match returned.get(entity) {
        Some(payload) if !payload.is_null() => Ok((payload.clone(), false)),
        _ => Ok((returned.clone(), false)),
    }
}

/// Parse `xml` and unwrap it per [`unwrap_response`]
pub fn parse_response(xml: &str, method_type: &str, entity: &str) -> Result<AxlResult> {
    let document = parse_xml(xml)?;
    unwrap_result(&document, method_type, entity)
}

/// `faultstring` of a SOAP fault document, if `xml` is one
pub fn extract_fault(xml: &str) -> Option<String> {
    let document = parse_xml(xml).ok()?;
    let fault_string = document
        .get(ENVELOPE_KEY)?
        .get(BODY_KEY)?
        .get(FAULT_KEY)?
        .get("faultstring")?;

    match fault_string {
        Value::String(text) => Some(text.clone()),
        // `<faultstring xml:lang="en">text</faultstring>`
        Value::Object(object) => object
            .get(crate::xml::TEXT_KEY)
            .and_then(|v| v.as_str())
            .map(ToString::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_xml(method_type: &str, inner: &str) -> String {
        format!(
            concat!(
                r#"<?xml version='1.0' encoding='UTF-8'?>"#,
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
                "<soapenv:Body>",
                r#"<ns:{0}Response xmlns:ns="http://www.cisco.com/AXL/API/12.5">{1}</ns:{0}Response>"#,
                "</soapenv:Body></soapenv:Envelope>"
            ),
            method_type, inner
        )
    }

    #[test]
    fn method_type_capitalizes_first_letter_only() {
        assert_eq!(method_type("get", "line"), "getLine");
        assert_eq!(method_type("execute", "SQLQuery"), "executeSQLQuery");
        assert_eq!(method_type("add", "remoteDestination"), "addRemoteDestination");
        assert_eq!(method_type("do", "ldapSync"), "doLdapSync");
        assert_eq!(method_type("get", ""), "get");
    }

    #[test]
    fn basic_auth_decodes_to_user_colon_pass() {
        let header = basic_auth("axladmin", "p@ss:word");
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "axladmin:p@ss:word");
    }

    #[test]
    fn url_and_soap_action() {
        assert_eq!(endpoint_url("10.1.1.1"), "https://10.1.1.1:8443/axl/");
        assert_eq!(soap_action("12.5", "getLine"), "CUCM:DB ver=12.5 getLine");
    }

    #[test]
    fn envelope_wraps_inner_body() {
        let envelope = build_envelope("12.5", "getLine", "<pattern>1000</pattern>");
        assert!(envelope.starts_with(r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(envelope.contains(r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema""#));
        assert!(envelope.contains(r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#));
        assert!(envelope.contains(
            r#"<axl:getLine xmlns:axl="http://www.cisco.com/AXL/API/12.5"><pattern>1000</pattern></axl:getLine>"#
        ));

        let parsed = parse_xml(&envelope).unwrap();
        assert_eq!(
            parsed["soapenv:Envelope"]["soapenv:Body"]["axl:getLine"]["pattern"],
            "1000"
        );
    }

    #[test]
    fn unwrap_prefers_rows() {
        let xml = response_xml(
            "executeSQLQuery",
            "<return><row><pkid>a</pkid></row><row><pkid>b</pkid></row><row><pkid>c</pkid></row></return>",
        );
        let rows = parse_response(&xml, "executeSQLQuery", "SQLQuery")
            .unwrap()
            .into_rows()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2]["pkid"], "c");
    }

    #[test]
    fn unwrap_returns_entity_field() {
        let xml = response_xml(
            "getLine",
            r#"<return><line uuid="{AAAA}"><pattern>1000</pattern></line></return>"#,
        );
        let document = parse_xml(&xml).unwrap();
        let value = unwrap_response(&document, "getLine", "line").unwrap();
        assert_eq!(value, json!({"$": {"uuid": "{AAAA}"}, "pattern": "1000"}));
        assert_eq!(
            unwrap_result(&document, "getLine", "line").unwrap().kind(),
            "record"
        );
    }

    #[test]
    fn unwrap_falls_back_to_return() {
        let xml = response_xml("addLine", "<return>{1A2B-3C4D}</return>");
        assert_eq!(
            parse_response(&xml, "addLine", "line").unwrap(),
            AxlResult::Scalar("{1A2B-3C4D}".to_string())
        );

        let xml = response_xml("executeSQLUpdate", "<return><rowsUpdated>1</rowsUpdated></return>");
        let document = parse_xml(&xml).unwrap();
        assert_eq!(
            unwrap_response(&document, "executeSQLUpdate", "SQLUpdate").unwrap(),
            json!({"rowsUpdated": "1"})
        );
        assert_eq!(
            parse_response(&xml, "executeSQLUpdate", "SQLUpdate")
                .unwrap()
                .rows_updated()
                .unwrap(),
            1
        );
    }

    #[test]
    fn single_row_is_still_a_collection() {
        let xml = response_xml(
            "executeSQLQuery",
            "<return><row><pkid>only</pkid></row></return>",
        );
        assert_eq!(
            parse_response(&xml, "executeSQLQuery", "SQLQuery").unwrap(),
            AxlResult::Rows(vec![json!({"pkid": "only"})])
        );

        let empty = response_xml("executeSQLQuery", "<return/>");
        assert_eq!(
            parse_response(&empty, "executeSQLQuery", "SQLQuery").unwrap(),
            AxlResult::Empty
        );
    }

    #[test]
    fn unwrap_missing_path_is_malformed() {
        let xml = response_xml("getPhone", "<return/>");
        let err = parse_response(&xml, "getLine", "line").unwrap_err();
        assert!(matches!(err, AxlError::MalformedResponse(_)));
    }

    #[test]
    fn fault_string_is_extracted() {
        let xml = concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soapenv:Body><soapenv:Fault><faultcode>soapenv:Client</faultcode>",
            "<faultstring>Item not found</faultstring>",
            "<detail><axlError><axlcode>5007</axlcode></axlError></detail>",
            "</soapenv:Fault></soapenv:Body></soapenv:Envelope>"
        );
        assert_eq!(extract_fault(xml).as_deref(), Some("Item not found"));
    }

    #[test]
    fn fault_absent_or_unparsable() {
        assert!(extract_fault("<html><body>502 Bad Gateway</body></html>").is_none());
        assert!(extract_fault("Service Unavailable").is_none());
    }
}
