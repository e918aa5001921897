//! CLI orchestration module
//!
//! Testable pieces of the `axl` binary: connection resolution and argument
//! parsing. Precedence for every connection field is flag, then environment,
//! then the selected profile.

use crate::config::{ConnectionConfig, Defaults, Profile, Profiles, TransportOptions};
use crate::error::{AxlError, Result};
use serde_json::Value;
use std::time::Duration;

/// Trait for loading connection profiles (abstracted for testing)
pub trait ProfileLoader: Send + Sync {
    /// Load a profile by name, `None` selects the default
    fn load_profile(&self, name: Option<String>) -> Result<Option<Profile>>;
}

/// Reads `~/.axl/profiles.toml`
pub struct DefaultProfileLoader;

impl ProfileLoader for DefaultProfileLoader {
    fn load_profile(&self, cli_profile: Option<String>) -> Result<Option<Profile>> {
        let (profile_name, explicitly_selected) = if let Some(profile) = cli_profile {
            (profile, true)
        } else if let Ok(profile) = std::env::var("AXL_PROFILE") {
            (profile, true)
        } else {
            ("default".to_string(), false)
        };

        let profiles = Profiles::load()?;
        match profiles.get_profile(&profile_name) {
            Ok(profile) => Ok(Some(profile.clone())),
            Err(_) if !explicitly_selected => {
                tracing::debug!("No 'default' profile found, using flags and environment only");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Connection flags as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectionFlags {
    pub host: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub version: Option<String>,
    pub profile: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure: bool,
}

fn pick(
    flag: &Option<String>,
    env_name: &str,
    profile_value: Option<&String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    if let Some(value) = flag {
        return value.clone();
    }
    if let Ok(value) = std::env::var(env_name) {
        return value;
    }
    if let Some(value) = profile_value {
        return value.clone();
    }
    missing.push(field);
    String::new()
}

/// Everything the binary needs to build a transport
#[derive(Debug, Clone)]
pub struct ResolvedConnection {
    pub config: ConnectionConfig,
    pub options: TransportOptions,
    pub defaults: Defaults,
}

/// Merge flags, environment and profile into transport settings
pub fn resolve_connection(
    flags: &ConnectionFlags,
    loader: &dyn ProfileLoader,
) -> Result<ResolvedConnection> {
    let profile = loader.load_profile(flags.profile.clone())?;
    let from_profile = profile.as_ref().map(|p| &p.connection);

    let mut missing = Vec::new();
    let config = ConnectionConfig {
        host: pick(&flags.host, "AXL_HOST", from_profile.map(|c| &c.host), "host", &mut missing),
        user: pick(&flags.user, "AXL_USER", from_profile.map(|c| &c.user), "user", &mut missing),
        pass: pick(&flags.pass, "AXL_PASS", from_profile.map(|c| &c.pass), "pass", &mut missing),
        version: pick(
            &flags.version,
            "AXL_VERSION",
            from_profile.map(|c| &c.version),
            "version",
            &mut missing,
        ),
    };

    if !missing.is_empty() {
        return Err(AxlError::Config(format!(
            "Missing connection setting(s): {}. Pass flags, set AXL_* variables or add a profile to ~/.axl/profiles.toml",
            missing.join(", ")
        )));
    }

    let mut options = match &profile {
        Some(profile) => profile.transport_options()?,
        None => TransportOptions::new(),
    };
    if let Some(endpoint) = &flags.endpoint {
        url::Url::parse(endpoint)
            .map_err(|e| AxlError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        options = options.with_endpoint(endpoint.clone());
    }
    if let Some(secs) = flags.timeout_secs {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    if flags.insecure {
        options = options.with_accept_invalid_certs(true);
    }

    let defaults = match &profile {
        Some(profile) => Defaults::from_env().or(profile.defaults.clone()),
        None => Defaults::from_env(),
    };

    Ok(ResolvedConnection {
        config,
        options,
        defaults,
    })
}

/// Argument parser for operation arguments
pub struct ArgumentParser;

impl ArgumentParser {
    /// Parse `key=value` pairs, keeping their order
    pub fn parse_pairs(args: &[String]) -> Result<Vec<(String, String)>> {
        args.iter()
            .map(|arg| {
                arg.split_once('=')
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .ok_or_else(|| {
                        AxlError::InvalidArguments(format!(
                            "Expected key=value, got '{}'",
                            arg
                        ))
                    })
            })
            .collect()
    }

    /// Parse a JSON object payload for add operations
    pub fn parse_details(json: &str) -> Result<Value> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| AxlError::InvalidArguments(format!("Invalid JSON payload: {}", e)))?;
        if !value.is_object() {
            return Err(AxlError::InvalidArguments(
                "JSON payload must be an object".to_string(),
            ));
        }
        Ok(value)
    }
}

/// Borrow owned pairs for the operation helpers
pub fn as_str_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}
