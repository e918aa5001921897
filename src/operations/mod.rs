//! Convenience operations over [`AxlRunner::run`]
//!
//! Each operation builds an inner body in one of three ways (structured
//! object, flat fields, SQL) and states the result shape it expects:
//!
//! | shape | operations |
//! |---|---|
//! | UUID string | `add_*`, `remove_*`, `update_user` |
//! | record | `get_*` |
//! | rows | `list_*`, `sql_query` and the SQL lookups |
//! | row count | `sql_update` and the SQL writes |

pub mod bodies;
pub mod queries;

use crate::error::Result;
use crate::sql::{sql_body, SqlStatement};
use crate::transport::AxlRunner;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Entity names as AXL spells them
pub mod entity {
    pub const LINE: &str = "line";
    pub const PHONE: &str = "phone";
    pub const REMOTE_DESTINATION: &str = "remoteDestination";
    pub const USER: &str = "user";
    pub const LDAP_SYNC: &str = "ldapSync";
    pub const LDAP_SYNC_STATUS: &str = "ldapSyncStatus";
    pub const SQL_QUERY: &str = "SQLQuery";
    pub const SQL_UPDATE: &str = "SQLUpdate";
}

#[async_trait]
pub trait AxlOperations: AxlRunner {
    /// Add a record and return its UUID (`{…}` as AXL sends it)
    async fn add(&self, entity: &str, details: &Value) -> Result<String> {
        let body = bodies::add_body(entity, details)?;
        self.run("add", entity, &body).await?.expect_scalar()
    }

    async fn get(&self, entity: &str, criteria: &[(&str, &str)]) -> Result<Map<String, Value>> {
        let body = bodies::criteria_body(criteria)?;
        self.run("get", entity, &body).await?.expect_record()
    }

    async fn list(
        &self,
        entity: &str,
        criteria: &[(&str, &str)],
        returned_tags: &[&str],
    ) -> Result<Vec<Value>> {
        let body = bodies::list_body(criteria, returned_tags)?;
        self.run("list", entity, &body).await?.into_rows()
    }

    async fn remove(&self, entity: &str, criteria: &[(&str, &str)]) -> Result<String> {
        let body = bodies::criteria_body(criteria)?;
        self.run("remove", entity, &body).await?.expect_scalar()
    }

    async fn add_line(&self, details: &Value) -> Result<String> {
        self.add(entity::LINE, details).await
    }

    async fn add_phone(&self, details: &Value) -> Result<String> {
        self.add(entity::PHONE, details).await
    }

    async fn add_remote_destination(&self, details: &Value) -> Result<String> {
        self.add(entity::REMOTE_DESTINATION, details).await
    }

    async fn add_user(&self, details: &Value) -> Result<String> {
        self.add(entity::USER, details).await
    }

    async fn get_line(&self, criteria: &[(&str, &str)]) -> Result<Map<String, Value>> {
        self.get(entity::LINE, criteria).await
    }

    async fn get_phone(&self, criteria: &[(&str, &str)]) -> Result<Map<String, Value>> {
        self.get(entity::PHONE, criteria).await
    }

    async fn get_remote_destination(&self, criteria: &[(&str, &str)]) -> Result<Map<String, Value>> {
        self.get(entity::REMOTE_DESTINATION, criteria).await
    }

    async fn get_user(&self, criteria: &[(&str, &str)]) -> Result<Map<String, Value>> {
        self.get(entity::USER, criteria).await
    }

    async fn list_lines(&self, criteria: &[(&str, &str)], returned_tags: &[&str]) -> Result<Vec<Value>> {
        self.list(entity::LINE, criteria, returned_tags).await
    }

    async fn list_phones(&self, criteria: &[(&str, &str)], returned_tags: &[&str]) -> Result<Vec<Value>> {
        self.list(entity::PHONE, criteria, returned_tags).await
    }

    async fn remove_line(&self, criteria: &[(&str, &str)]) -> Result<String> {
        self.remove(entity::LINE, criteria).await
    }

    async fn remove_phone(&self, criteria: &[(&str, &str)]) -> Result<String> {
        self.remove(entity::PHONE, criteria).await
    }

    async fn remove_remote_destination(&self, criteria: &[(&str, &str)]) -> Result<String> {
        self.remove(entity::REMOTE_DESTINATION, criteria).await
    }

    async fn update_user(&self, user_id: &str, fields: &[(&str, &str)]) -> Result<String> {
        let body = bodies::update_user_body(user_id, fields)?;
        self.run("update", entity::USER, &body).await?.expect_scalar()
    }

    /// Start (or with `sync = false`, cancel) a directory synchronization
    async fn do_ldap_sync(&self, directory: &str, sync: bool) -> Result<String> {
        let body = bodies::ldap_sync_body(directory, sync)?;
        self.run("do", entity::LDAP_SYNC, &body).await?.expect_scalar()
    }

    async fn get_ldap_sync_status(&self, directory: &str) -> Result<String> {
        let body = bodies::ldap_status_body(directory)?;
        self.run("get", entity::LDAP_SYNC_STATUS, &body)
            .await?
            .expect_scalar()
    }

    async fn sql_query(&self, statement: &SqlStatement) -> Result<Vec<Value>> {
        let body = sql_body(statement)?;
        self.run("execute", entity::SQL_QUERY, &body).await?.into_rows()
    }

    /// Number of rows changed
    async fn sql_update(&self, statement: &SqlStatement) -> Result<u64> {
        let body = sql_body(statement)?;
        self.run("execute", entity::SQL_UPDATE, &body)
            .await?
            .rows_updated()
    }

    async fn get_application_user_uuid(&self, name: &str) -> Result<Option<String>> {
        let rows = self.sql_query(&queries::application_user_uuid(name)).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("pkid"))
            .and_then(Value::as_str)
            .map(ToString::to_string))
    }

    async fn get_application_user_device_associations(&self, name: &str) -> Result<Vec<Value>> {
        self.sql_query(&queries::application_user_device_associations(name))
            .await
    }

    async fn associate_device_with_application_user(
        &self,
        device_uuid: &str,
        name: &str,
    ) -> Result<u64> {
        self.sql_update(&queries::associate_device_with_application_user(
            device_uuid,
            name,
        ))
        .await
    }

    async fn disassociate_device_from_application_user(
        &self,
        device_uuid: &str,
        name: &str,
    ) -> Result<u64> {
        self.sql_update(&queries::disassociate_device_from_application_user(
            device_uuid,
            name,
        ))
        .await
    }

    async fn get_end_user_device_associations(&self, user_id: &str) -> Result<Vec<Value>> {
        self.sql_query(&queries::end_user_device_associations(user_id))
            .await
    }

    async fn associate_device_with_end_user(&self, device_uuid: &str, user_id: &str) -> Result<u64> {
        self.sql_update(&queries::associate_device_with_end_user(device_uuid, user_id))
            .await
    }

    async fn get_ipcc_extension(&self, user_id: &str) -> Result<Vec<Value>> {
        self.sql_query(&queries::ipcc_extension(user_id)).await
    }

    async fn set_ipcc_extension(&self, user_id: &str, line_uuid: &str) -> Result<u64> {
        self.sql_update(&queries::set_ipcc_extension(user_id, line_uuid))
            .await
    }

    async fn remove_ipcc_extension(&self, user_id: &str) -> Result<u64> {
        self.sql_update(&queries::remove_ipcc_extension(user_id)).await
    }
}

impl<T: AxlRunner + ?Sized> AxlOperations for T {}
