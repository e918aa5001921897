//! Inner bodies of the convenience operations

use crate::error::Result;
use crate::xml::{flat_elements, search_body, to_xml, SerializeOptions};
use serde_json::Value;

/// `<entity>…</entity>` for add-style operations
pub fn add_body(entity: &str, details: &Value) -> Result<String> {
    to_xml(entity, details, &SerializeOptions::default())
}

/// Flat identifying fields for get/remove, e.g. `name` or `uuid`
pub fn criteria_body(criteria: &[(&str, &str)]) -> Result<String> {
    flat_elements(criteria.iter().copied())
}

pub fn list_body(criteria: &[(&str, &str)], returned_tags: &[&str]) -> Result<String> {
    search_body(criteria.iter().copied(), returned_tags)
}

/// `userid` first, then the fields to change
pub fn update_user_body(user_id: &str, fields: &[(&str, &str)]) -> Result<String> {
    flat_elements(std::iter::once(("userid", user_id)).chain(fields.iter().copied()))
}

pub fn ldap_sync_body(directory: &str, sync: bool) -> Result<String> {
    flat_elements([("name", directory), ("sync", if sync { "true" } else { "false" })])
}

pub fn ldap_status_body(directory: &str) -> Result<String> {
    flat_elements([("name", directory)])
}
