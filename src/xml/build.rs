//! XML fragment builders for AXL request bodies.
//!
//! Three shapes cover every AXL operation:
//! - [`to_xml`]: a nested mapping serialized under a root element, where the
//!   attribute-marker key turns into attributes of its parent
//! - [`flat_elements`]: `<key>value</key>` per pair, in order
//! - [`search_body`]: `searchCriteria` plus `returnedTags` for list calls
//!
//! All text and attribute values are entity-escaped and element names are
//! checked before they reach the wire.

use crate::error::{AxlError, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Options for [`to_xml`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Key whose object value becomes attributes of the parent element
    pub attribute_marker: String,
    /// Key whose value becomes the text of an element that also has attributes
    pub value_marker: String,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first
    pub include_declaration: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            attribute_marker: "$".to_string(),
            value_marker: "#".to_string(),
            include_declaration: false,
        }
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9._\-]*(:[A-Za-z_][A-Za-z0-9._\-]*)?$")
            .expect("element name pattern is valid")
    })
}

/// Reject names that would not form a single well-formed tag
pub fn validate_name(name: &str) -> Result<()> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(AxlError::InvalidArguments(format!(
            "Invalid XML element name: {:?}",
            name
        )))
    }
}

/// Escape `<`, `>`, `&`, `'` and `"`
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text)
}

fn scalar_text(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(AxlError::InvalidArguments(format!(
            "Expected a scalar value for '{}'",
            name
        ))),
    }
}

/// Serialize `value` as the element `root`.
pub fn to_xml(root: &str, value: &Value, options: &SerializeOptions) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    if options.include_declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    write_element(&mut writer, root, value, options)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| AxlError::InvalidArguments(format!("Serialized XML is not UTF-8: {}", e)))
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
    options: &SerializeOptions,
) -> Result<()> {
    validate_name(name)?;

    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item, options)?;
            }
        }
        Value::Null => {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
        }
        Value::Object(map) => write_object(writer, name, map, options)?,
        scalar => {
            let text = scalar_text(name, scalar)?;
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }

    Ok(())
}

fn write_object<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    map: &Map<String, Value>,
    options: &SerializeOptions,
) -> Result<()> {
    let mut start = BytesStart::new(name);

    if let Some(attributes) = map.get(&options.attribute_marker) {
        let attributes = attributes.as_object().ok_or_else(|| {
            AxlError::InvalidArguments(format!(
                "Attributes of '{}' must be an object",
                name
            ))
        })?;
        for (key, value) in attributes {
            validate_name(key)?;
            let text = scalar_text(key, value)?;
            start.push_attribute((key.as_str(), text.as_str()));
        }
    }

    let text = match map.get(&options.value_marker) {
        Some(value) => Some(scalar_text(name, value)?),
        None => None,
    };
    let children = map
        .iter()
        .filter(|(key, _)| **key != options.attribute_marker && **key != options.value_marker)
        .collect::<Vec<_>>();

    if text.is_none() && children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for (key, child) in children {
        write_element(writer, key, child, options)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;

    Ok(())
}

/// `<key>value</key>` for each pair, in the order given
pub fn flat_elements<I, K, V>(pairs: I) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut body = String::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        validate_name(key)?;
        body.push_str(&format!("<{0}>{1}</{0}>", key, escape(value.as_ref())));
    }
    Ok(body)
}

/// Body of a `list*` request: search criteria and the tags to return
pub fn search_body<I, K, V, T>(criteria: I, returned_tags: &[T]) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
    T: AsRef<str>,
{
    let mut body = String::from("<searchCriteria>");
    body.push_str(&flat_elements(criteria)?);
    body.push_str("</searchCriteria><returnedTags>");
    for tag in returned_tags {
        let tag = tag.as_ref();
        validate_name(tag)?;
        body.push_str(&format!("<{}/>", tag));
    }
    body.push_str("</returnedTags>");
    Ok(body)
}
