//! SQL behind the association and IPCC extension helpers
//!
//! Every caller value is bound, never spliced into the text.

use crate::result::strip_uuid_braces;
use crate::sql::SqlStatement;

/// `tkdnusage` of an IPCC extension in `endusernumplanmap`
pub const IPCC_DN_USAGE: i64 = 2;

/// `tkuserassociation` for a controlled device
pub const CONTROLLED_DEVICE: i64 = 1;

const APPLICATION_USER_PKID: &str = "(SELECT pkid FROM applicationuser WHERE name = ?)";
const END_USER_PKID: &str = "(SELECT pkid FROM enduser WHERE userid = ?)";

/// Database form of a UUID returned by AXL: no braces, lower case
pub fn normalize_uuid(uuid: &str) -> String {
    strip_uuid_braces(uuid).to_lowercase()
}

pub fn application_user_uuid(name: &str) -> SqlStatement {
    SqlStatement::new("SELECT pkid FROM applicationuser WHERE name = ?").bind(name)
}

pub fn application_user_device_associations(name: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "SELECT * FROM applicationuserdevicemap WHERE fkapplicationuser = {}",
        APPLICATION_USER_PKID
    ))
    .bind(name)
}

pub fn associate_device_with_application_user(device_uuid: &str, name: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "INSERT INTO applicationuserdevicemap (fkapplicationuser, fkdevice, tkuserassociation) VALUES ({}, ?, ?)",
        APPLICATION_USER_PKID
    ))
    .bind(name)
    .bind(normalize_uuid(device_uuid))
    .bind(CONTROLLED_DEVICE)
}

pub fn disassociate_device_from_application_user(device_uuid: &str, name: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "DELETE FROM applicationuserdevicemap WHERE fkapplicationuser = {} AND fkdevice = ?",
        APPLICATION_USER_PKID
    ))
    .bind(name)
    .bind(normalize_uuid(device_uuid))
}

pub fn end_user_device_associations(user_id: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "SELECT * FROM enduserdevicemap WHERE fkenduser = {}",
        END_USER_PKID
    ))
    .bind(user_id)
}

pub fn associate_device_with_end_user(device_uuid: &str, user_id: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "INSERT INTO enduserdevicemap (fkenduser, fkdevice, tkuserassociation) VALUES ({}, ?, ?)",
        END_USER_PKID
    ))
    .bind(user_id)
    .bind(normalize_uuid(device_uuid))
    .bind(CONTROLLED_DEVICE)
}

pub fn ipcc_extension(user_id: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "SELECT * FROM endusernumplanmap WHERE fkenduser = {} AND tkdnusage = ?",
        END_USER_PKID
    ))
    .bind(user_id)
    .bind(IPCC_DN_USAGE)
}

pub fn set_ipcc_extension(user_id: &str, line_uuid: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "INSERT INTO endusernumplanmap (fkenduser, fknumplan, tkdnusage) VALUES ({}, ?, ?)",
        END_USER_PKID
    ))
    .bind(user_id)
    .bind(normalize_uuid(line_uuid))
    .bind(IPCC_DN_USAGE)
}

pub fn remove_ipcc_extension(user_id: &str) -> SqlStatement {
    SqlStatement::new(format!(
        "DELETE FROM endusernumplanmap WHERE fkenduser = {} AND tkdnusage = ?",
        END_USER_PKID
    ))
    .bind(user_id)
    .bind(IPCC_DN_USAGE)
}
