//! XML collaborators for the SOAP layer
//!
//! - [`parse`]: XML document text into a nested `serde_json::Value` mapping
//! - [`build`]: nested mapping, flat pairs and search criteria into XML fragments

pub mod build;
pub mod parse;

pub use build::{
    escape_text, flat_elements, search_body, to_xml, validate_name, SerializeOptions,
};
pub use parse::{parse_xml, ATTRIBUTE_KEY, TEXT_KEY};
