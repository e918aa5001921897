//! XML document to nested mapping.
//!
//! The mapping follows the shape callers of AXL have always relied on:
//! - the document becomes `{ rootName: content }`
//! - element names keep their prefix (`soapenv:Envelope`)
//! - attributes are gathered under [`ATTRIBUTE_KEY`]
//! - an element with only text becomes a string, an empty element `""`
//! - whitespace-only text is dropped, other text keeps its spaces
//! - text next to attributes or children is stored under [`TEXT_KEY`]
//! - repeated siblings become an array, a single occurrence stays single

use crate::error::{AxlError, Result};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Key holding the attributes of an element
pub const ATTRIBUTE_KEY: &str = "$";

/// Key holding the text of an element that also has attributes or children
pub const TEXT_KEY: &str = "_";

struct Node {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    // Escaped form; unescaped once the element closes.
    raw_text: String,
}

impl Node {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                AxlError::MalformedResponse(format!("Invalid attribute on <{}>: {}", name, e))
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|e| {
                AxlError::MalformedResponse(format!("Invalid attribute value on <{}>: {}", name, e))
            })?;
            attributes.insert(key, Value::String(value.into_owned()));
        }

        Ok(Self {
            name,
            attributes,
            children: Map::new(),
            raw_text: String::new(),
        })
    }

    fn into_entry(self) -> Result<(String, Value)> {
        // Whitespace-only text is layout; any other text is kept as sent.
        let text = if self.raw_text.trim().is_empty() {
            String::new()
        } else {
            unescape(&self.raw_text)
                .map_err(|e| {
                    AxlError::MalformedResponse(format!("Invalid text in <{}>: {}", self.name, e))
                })?
                .into_owned()
        };

        if self.attributes.is_empty() && self.children.is_empty() {
            return Ok((self.name, Value::String(text)));
        }

        let mut object = Map::new();
        if !self.attributes.is_empty() {
            object.insert(ATTRIBUTE_KEY.to_string(), Value::Object(self.attributes));
        }
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        object.extend(self.children);

        Ok((self.name, Value::Object(object)))
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            // Element content is never an array, so an array here is the sibling list.
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }
}

fn close(node: Node, stack: &mut [Node], root: &mut Option<(String, Value)>) -> Result<()> {
    let (name, value) = node.into_entry()?;
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None => {
            if root.is_some() {
                return Err(AxlError::MalformedResponse(
                    "Multiple root elements".to_string(),
                ));
            }
            *root = Some((name, value));
        }
    }
    Ok(())
}

/// Parse an XML document into a nested mapping.
pub fn parse_xml(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Node::open(&e)?),
            Event::Empty(e) => {
                let node = Node::open(&e)?;
                close(node, &mut stack, &mut root)?;
            }
            Event::End(e) => {
                let node = stack.pop().ok_or_else(|| {
                    AxlError::MalformedResponse(format!(
                        "Unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                close(node, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    node.raw_text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(node) = stack.last_mut() {
                    node.raw_text.push('&');
                    node.raw_text.push_str(&String::from_utf8_lossy(&e));
                    node.raw_text.push(';');
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.raw_text.push_str(&escape(String::from_utf8_lossy(&e).as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(AxlError::MalformedResponse(format!(
            "Unclosed element <{}>",
            open.name
        )));
    }

    let (name, value) =
        root.ok_or_else(|| AxlError::MalformedResponse("Document has no root element".to_string()))?;

    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}
