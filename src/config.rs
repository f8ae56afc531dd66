use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::tools::schema::SchemaDialect;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CREDENTIAL_KEY: &str = "GOOGLE_ACCESS_TOKEN";

/// Where the calendar bearer token comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// `accessToken` travels in every call's arguments.
    PerCall,
    /// One token read from the process environment at startup.
    ProcessConfig,
}

impl FromStr for CredentialMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perCall" | "per-call" => Ok(CredentialMode::PerCall),
            "processConfig" | "process-config" => Ok(CredentialMode::ProcessConfig),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialMode::PerCall => f.write_str("perCall"),
            CredentialMode::ProcessConfig => f.write_str("processConfig"),
        }
    }
}

/// Settings the calendar handlers read from the host.
#[derive(Debug, Clone)]
pub struct CalendarSettings {
    pub credential_mode: CredentialMode,
    pub credential_key: String,
    pub calendar_id: String,
    pub api_base: String,
    pub time_zone: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            credential_mode: CredentialMode::PerCall,
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            calendar_id: "primary".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            time_zone: "UTC".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub mcp_port: u16,
    pub mcp_auth_token: Option<String>,
    pub calendar: CalendarSettings,
    pub schema_dialect: SchemaDialect,
    pub http_timeout_secs: Option<u64>,
    /// Plugin-style key/value config, visible to handlers through the host.
    pub plugin_config: HashMap<String, String>,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mcp_port = parse_or(&lookup, "MCP_PORT", 5233, "port number")?;

        let credential_mode = match lookup("GCAL_CREDENTIAL_MODE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "GCAL_CREDENTIAL_MODE",
                expected: "credential mode (perCall or processConfig)",
                value: raw.clone(),
            })?,
            None => CredentialMode::PerCall,
        };

        let schema_dialect = match lookup("GCAL_SCHEMA_DIALECT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "GCAL_SCHEMA_DIALECT",
                expected: "schema dialect (flat or function)",
                value: raw.clone(),
            })?,
            None => SchemaDialect::Flat,
        };

        let http_timeout_secs = match lookup("GCAL_HTTP_TIMEOUT_SECS") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                key: "GCAL_HTTP_TIMEOUT_SECS",
                expected: "number of seconds",
                value: raw.clone(),
            })?),
            None => None,
        };

        let credential_key =
            lookup("GCAL_CREDENTIAL_KEY").unwrap_or_else(|| DEFAULT_CREDENTIAL_KEY.to_string());

        // The token is resolved once here; handlers only ever see this snapshot.
        let mut plugin_config = HashMap::new();
        if let Some(token) = lookup(&credential_key).filter(|t| !t.is_empty()) {
            plugin_config.insert(credential_key.clone(), token);
        }

        Ok(Self {
            mcp_port,
            mcp_auth_token: lookup("MCP_AUTH_TOKEN").filter(|t| !t.is_empty()),
            calendar: CalendarSettings {
                credential_mode,
                credential_key,
                calendar_id: lookup("GCAL_CALENDAR_ID").unwrap_or_else(|| "primary".to_string()),
                api_base: lookup("GCAL_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                time_zone: lookup("GCAL_TIME_ZONE").unwrap_or_else(|| "UTC".to_string()),
            },
            schema_dialect,
            http_timeout_secs,
            plugin_config,
        })
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value: raw,
        }),
        None => Ok(default),
    }
}
