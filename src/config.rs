//! Connection configuration
//!
//! A [`ConnectionConfig`] is always handed to the transport explicitly.
//! The loaders in this module (environment, profile file) exist for the
//! CLI; request-building code never reads process state.
//!
//! # Profile file
//!
//! ```toml
//! [profile.default]
//! host = "cucm.example.com"
//! user = "axladmin"
//! pass = "secret"
//! version = "12.5"
//! device_pool = "Default"
//! accept_invalid_certs = true
//! ```

use crate::error::{AxlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default profiles directory relative to home directory
pub const DEFAULT_PROFILES_DIR: &str = ".axl";

/// Default profiles file name
pub const PROFILES_FILE: &str = "profiles.toml";

/// Port the AXL service listens on
pub const AXL_PORT: u16 = 8443;

/// Host, credentials and API version of one CUCM publisher
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
    pub version: String,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            pass: pass.into(),
            version: version.into(),
        }
    }

    /// Read `AXL_HOST`, `AXL_USER`, `AXL_PASS` and `AXL_VERSION`.
    ///
    /// Missing variables are reported together.
    pub fn from_env() -> Result<Self> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.push(name);
                String::new()
            }
        };

        let config = Self {
            host: read("AXL_HOST"),
            user: read("AXL_USER"),
            pass: read("AXL_PASS"),
            version: read("AXL_VERSION"),
        };

        if !missing.is_empty() {
            return Err(AxlError::Config(format!(
                "Missing environment variable(s): {}",
                missing.join(", ")
            )));
        }

        Ok(config)
    }

    /// Mask the password for display
    pub fn mask_pass(&self) -> String {
        "*".repeat(self.pass.len().min(8))
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("pass", &self.mask_pass())
            .field("version", &self.version)
            .finish()
    }
}

/// HTTP client knobs exposed to callers. No timeout by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Replaces `https://{host}:8443/axl/`
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
    /// CUCM ships with self-signed certificates
    pub accept_invalid_certs: bool,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

/// Provisioning defaults some integrations keep next to the connection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calling_search_space: Option<String>,
}

impl Defaults {
    /// Read `AXL_DEVICE_POOL` and `AXL_CSS`
    pub fn from_env() -> Self {
        Self {
            device_pool: std::env::var("AXL_DEVICE_POOL").ok(),
            calling_search_space: std::env::var("AXL_CSS").ok(),
        }
    }

    /// Fill missing `devicePoolName` / `callingSearchSpaceName` on an add payload
    pub fn apply_to(&self, entity: &str, details: &mut Value) {
        let Some(fields) = details.as_object_mut() else {
            return;
        };
        if entity == "phone" {
            if let Some(pool) = &self.device_pool {
                fields
                    .entry("devicePoolName")
                    .or_insert_with(|| Value::String(pool.clone()));
            }
        }
        if entity == "phone" || entity == "line" {
            if let Some(css) = &self.calling_search_space {
                fields
                    .entry("callingSearchSpaceName")
                    .or_insert_with(|| Value::String(css.clone()));
            }
        }
    }

    /// Field-wise fallback: values set here win over `other`
    pub fn or(self, other: Defaults) -> Self {
        Self {
            device_pool: self.device_pool.or(other.device_pool),
            calling_search_space: self.calling_search_space.or(other.calling_search_space),
        }
    }
}

/// One `[profile.<name>]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(flatten)]
    pub connection: ConnectionConfig,

    #[serde(flatten)]
    pub defaults: Defaults,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Profile {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            defaults: Defaults::default(),
            endpoint: None,
            timeout_secs: None,
            accept_invalid_certs: false,
        }
    }

    /// Transport options carried by this profile
    pub fn transport_options(&self) -> Result<TransportOptions> {
        let mut options = TransportOptions::new().with_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| AxlError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
            options = options.with_endpoint(endpoint.clone());
        }
        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        Ok(options)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    profile: HashMap<String, Profile>,
}

/// Profiles collection
#[derive(Debug, Clone, Default)]
pub struct Profiles {
    pub profiles: HashMap<String, Profile>,
}

impl Profiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// `~/.axl/profiles.toml`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AxlError::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(DEFAULT_PROFILES_DIR).join(PROFILES_FILE))
    }

    /// Load from the default location. A missing file yields no profiles.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)?;
        let file: ProfilesFile = toml::from_str(&contents).map_err(|e| {
            AxlError::Config(format!("Failed to parse profiles file {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded {} profile(s) from {:?}", file.profile.len(), path);
        Ok(Self {
            profiles: file.profile,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = ProfilesFile {
            profile: self.profiles.clone(),
        };
        let contents = toml::to_string_pretty(&file)
            .map_err(|e| AxlError::Config(format!("Failed to serialize profiles: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| {
            AxlError::Config(format!(
                "Profile '{}' not found. Available profiles: {}",
                name,
                self.profile_names().join(", ")
            ))
        })
    }

    pub fn set_profile(&mut self, name: impl Into<String>, profile: Profile) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home));
        }

        #[cfg(windows)]
        {
            if let Some(user_profile) = std::env::var_os("USERPROFILE") {
                return Some(PathBuf::from(user_profile));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectionConfig {
        ConnectionConfig::new("cucm.example.com", "axladmin", "s3cret", "12.5")
    }

    #[test]
    fn debug_masks_password() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("cucm.example.com"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("******"));
    }

    #[test]
    fn transport_options_builder() {
        let options = TransportOptions::new()
            .with_endpoint("http://127.0.0.1:1234/axl/")
            .with_timeout(Duration::from_secs(5))
            .with_accept_invalid_certs(true);

        assert_eq!(options.endpoint.as_deref(), Some("http://127.0.0.1:1234/axl/"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.accept_invalid_certs);
    }

    #[test]
    fn profile_parses_flat_table() {
        let contents = r#"
[profile.lab]
host = "10.0.0.1"
user = "admin"
pass = "pw"
version = "11.5"
device_pool = "DP_LAB"
timeout_secs = 30
accept_invalid_certs = true
"#;
        let file: ProfilesFile = toml::from_str(contents).unwrap();
        let profile = &file.profile["lab"];
        assert_eq!(profile.connection.host, "10.0.0.1");
        assert_eq!(profile.connection.version, "11.5");
        assert_eq!(profile.defaults.device_pool.as_deref(), Some("DP_LAB"));
        assert!(profile.defaults.calling_search_space.is_none());

        let options = profile.transport_options().unwrap();
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert!(options.accept_invalid_certs);
        assert!(options.endpoint.is_none());
    }

    #[test]
    fn profile_rejects_bad_endpoint() {
        let mut profile = Profile::new(sample());
        profile.endpoint = Some("not a url".to_string());
        assert!(matches!(
            profile.transport_options(),
            Err(AxlError::Config(_))
        ));
    }

    #[test]
    fn missing_profile_lists_available() {
        let mut profiles = Profiles::new();
        profiles.set_profile("prod", Profile::new(sample()));
        profiles.set_profile("dev", Profile::new(sample()));

        let err = profiles.get_profile("lab").unwrap_err();
        assert!(err.to_string().contains("dev, prod"));
    }

    #[test]
    fn defaults_fill_only_missing_fields() {
        let defaults = Defaults {
            device_pool: Some("DP_HQ".to_string()),
            calling_search_space: Some("CSS_Internal".to_string()),
        };

        let mut phone = serde_json::json!({"name": "SEP001122334455", "devicePoolName": "DP_BR"});
        defaults.apply_to("phone", &mut phone);
        assert_eq!(phone["devicePoolName"], "DP_BR");
        assert_eq!(phone["callingSearchSpaceName"], "CSS_Internal");

        let mut line = serde_json::json!({"pattern": "1000"});
        defaults.apply_to("line", &mut line);
        assert!(line.get("devicePoolName").is_none());
        assert_eq!(line["callingSearchSpaceName"], "CSS_Internal");

        let mut user = serde_json::json!({"userid": "jdoe"});
        defaults.apply_to("user", &mut user);
        assert_eq!(user, serde_json::json!({"userid": "jdoe"}));
    }

    #[test]
    fn defaults_or_prefers_self() {
        let env = Defaults {
            device_pool: Some("DP_ENV".to_string()),
            calling_search_space: None,
        };
        let profile = Defaults {
            device_pool: Some("DP_PROFILE".to_string()),
            calling_search_space: Some("CSS_PROFILE".to_string()),
        };
        let merged = env.or(profile);
        assert_eq!(merged.device_pool.as_deref(), Some("DP_ENV"));
        assert_eq!(merged.calling_search_space.as_deref(), Some("CSS_PROFILE"));
    }
}
