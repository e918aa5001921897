//! CLI output integration tests
//!
//! The binary always prints one JSON envelope on stdout, for successes and
//! failures alike, and exits non-zero on failure.

use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::TempDir;

fn axl(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("axl"));
    cmd.env("HOME", home.path())
        .env_remove("AXL_HOST")
        .env_remove("AXL_USER")
        .env_remove("AXL_PASS")
        .env_remove("AXL_VERSION")
        .env_remove("AXL_PROFILE")
        .env_remove("AXL_DEVICE_POOL")
        .env_remove("AXL_CSS");
    cmd
}

fn connected(home: &TempDir, server: &Server) -> Command {
    let endpoint = format!("{}/axl/", server.url());
    let mut cmd = axl(home);
    cmd.args(["--host", "cucm.lab", "--user", "admin", "--pass", "secret"])
        .args(["--axl-version", "12.5"])
        .args(["--endpoint", endpoint.as_str()]);
    cmd
}

fn envelope(method_type: &str, inner: &str) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soapenv:Body>",
            r#"<ns:{0}Response xmlns:ns="http://www.cisco.com/AXL/API/12.5">{1}</ns:{0}Response>"#,
            "</soapenv:Body></soapenv:Envelope>"
        ),
        method_type, inner
    )
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    axl(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("sql"))
        .stdout(predicate::str::contains("ldap"));
}

#[test]
fn missing_connection_settings_use_error_envelope() {
    let home = TempDir::new().unwrap();
    let output = axl(&home)
        .args(["get", "line", "pattern=1000"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("CONFIG_ERROR"));

    let json = stdout_json(output.get_output());
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "CONFIG_ERROR");
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("host, user, pass, version")));
}

#[test]
fn malformed_criteria_use_error_envelope() {
    let home = TempDir::new().unwrap();
    let server = Server::new();
    let output = connected(&home, &server)
        .args(["get", "line", "pattern"])
        .assert()
        .failure();

    let json = stdout_json(output.get_output());
    assert_eq!(json["error"]["code"], "INVALID_ARGUMENT");
}

#[test]
fn get_line_prints_record() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/axl/")
        .match_header("SOAPAction", "CUCM:DB ver=12.5 getLine")
        .match_body(Matcher::Regex("<pattern>1000</pattern>".to_string()))
        .with_status(200)
        .with_body(envelope(
            "getLine",
            "<return><line uuid=\"{AAA-111}\"><pattern>1000</pattern></line></return>",
        ))
        .create();

    let output = connected(&home, &server)
        .args(["get", "line", "pattern=1000"])
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    assert_eq!(json["ok"], true);
    assert_eq!(json["operation"], "getLine");
    assert_eq!(json["shape"], "record");
    assert_eq!(json["data"]["pattern"], "1000");
    assert_eq!(json["meta"]["version"], "v1");
}

#[test]
fn soap_fault_uses_error_envelope() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/axl/")
        .with_status(500)
        .with_body(concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soapenv:Body><soapenv:Fault><faultcode>soapenv:Client</faultcode>",
            "<faultstring>Item not valid: The specified Line was not found</faultstring>",
            "</soapenv:Fault></soapenv:Body></soapenv:Envelope>"
        ))
        .create();

    let output = connected(&home, &server)
        .args(["remove", "line", "pattern=9999"])
        .assert()
        .failure();

    let json = stdout_json(output.get_output());
    assert_eq!(json["error"]["code"], "SOAP_FAULT");
    assert_eq!(
        json["error"]["message"],
        "Item not valid: The specified Line was not found"
    );
}

#[test]
fn add_phone_applies_profile_defaults() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/axl/")
        .match_body(Matcher::Regex(
            "<phone><name>SEP001122334455</name><devicePoolName>DP_HQ</devicePoolName></phone>"
                .to_string(),
        ))
        .with_status(200)
        .with_body(envelope("addPhone", "<return>{P-1}</return>"))
        .create();

    let output = connected(&home, &server)
        .env("AXL_DEVICE_POOL", "DP_HQ")
        .args(["add", "phone", "--json", r#"{"name": "SEP001122334455"}"#])
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    assert_eq!(json["shape"], "scalar");
    assert_eq!(json["data"], "{P-1}");
    mock.assert();
}

#[test]
fn sql_update_prints_rows_updated() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/axl/")
        .match_header("SOAPAction", "CUCM:DB ver=12.5 executeSQLUpdate")
        .match_body(Matcher::Regex(
            "<sql>DELETE FROM endusernumplanmap WHERE tkdnusage = 2</sql>".to_string(),
        ))
        .with_status(200)
        .with_body(envelope(
            "executeSQLUpdate",
            "<return><rowsUpdated>3</rowsUpdated></return>",
        ))
        .create();

    let output = connected(&home, &server)
        .args([
            "sql",
            "update",
            "DELETE FROM endusernumplanmap WHERE tkdnusage = 2",
        ])
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    assert_eq!(json["operation"], "executeSQLUpdate");
    assert_eq!(json["data"]["rowsUpdated"], 3);
}

#[test]
fn long_version_prints_version() {
    let home = TempDir::new().unwrap();
    let output = axl(&home)
        .arg("--version")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).expect("stdout should be UTF-8");
    assert_eq!(stdout.trim(), format!("axl {}", env!("CARGO_PKG_VERSION")));
}
