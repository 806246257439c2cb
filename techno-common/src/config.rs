//! Configuration loading
//!
//! Loaded once at startup and never mutated afterwards. Sources, highest
//! priority first:
//! 1. Command-line arguments (applied by the binary)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::types::{ApiConfig, ResolveTarget, SharedSecret};
use crate::resolver::LOGIN_SERVICE;
use crate::{Error, Result};

pub const ENV_TYPE: &str = "TYPE";
pub const ENV_DEV: &str = "DEV";
pub const ENV_SECRET: &str = "SECRET";
pub const ENV_PROJECT: &str = "PROJECT";
pub const ENV_REGION: &str = "REGION";
pub const ENV_DIRECTORY_HOST: &str = "DIRECTORY_HOST";
pub const ENV_DIRECTORY_PREFIX: &str = "DIRECTORY_PREFIX";
pub const ENV_DIRECTORY_VERSION: &str = "DIRECTORY_VERSION";
pub const ENV_API_PREFIX: &str = "API_PREFIX";
pub const ENV_API_VERSION: &str = "API_VERSION";
pub const ENV_API_PATH: &str = "API_PATH";
pub const ENV_AUTHORITY_SERVICE: &str = "AUTHORITY_SERVICE";
pub const ENV_SESSION_CONTRACT: &str = "SESSION_CONTRACT";

/// Response contract of `checkSessionByToken`
///
/// The authority exposes one of two shapes and nothing on the wire says
/// which, so the deployment states it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionContract {
    /// GET, body is a bare JSON boolean
    #[default]
    RawBool,
    /// POST with an empty body, response is `{"result": bool}`
    Envelope,
}

impl FromStr for SessionContract {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw_bool" | "raw" | "bool" => Ok(SessionContract::RawBool),
            "envelope" => Ok(SessionContract::Envelope),
            other => Err(Error::Config(format!("Unknown session contract '{}'", other))),
        }
    }
}

/// Process-wide configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TechnoConfig {
    /// Deployment type (e.g. `production`, `staging`)
    #[serde(rename = "type")]
    pub env_type: String,

    /// Development mode
    pub dev: bool,

    /// Secret identifying this service to the session authority
    pub secret: SharedSecret,

    pub project: String,

    /// Region appended to directory lookups
    pub region: String,

    /// Route prefix of the embedding service (log labels only)
    pub api: ApiConfig,

    /// Location of the directory service
    pub directory: ResolveTarget,

    /// Directory name of the session authority
    ///
    /// Default: `loginEmp`
    pub authority_service: String,

    pub session_contract: SessionContract,
}

impl Default for TechnoConfig {
    fn default() -> Self {
        Self {
            env_type: String::new(),
            dev: false,
            secret: SharedSecret::default(),
            project: String::new(),
            region: String::new(),
            api: ApiConfig::default(),
            directory: ResolveTarget::default(),
            authority_service: LOGIN_SERVICE.to_string(),
            session_contract: SessionContract::default(),
        }
    }
}

impl TechnoConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load file (explicit path, else the platform default if present),
    /// then apply environment overrides
    ///
    /// An explicit path that cannot be read is an error. A missing default
    /// file is not: built-in defaults are used with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => match default_config_path() {
                Some(path) => {
                    tracing::info!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => {
                    tracing::warn!("No configuration file found, using built-in defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(value) = get(ENV_TYPE) {
            self.env_type = value;
        }
        if let Some(value) = get(ENV_DEV) {
            self.dev = parse_flag(&value);
        }
        if let Some(value) = get(ENV_SECRET) {
            self.secret = SharedSecret::new(value);
        }
        if let Some(value) = get(ENV_PROJECT) {
            self.project = value;
        }
        if let Some(value) = get(ENV_REGION) {
            self.region = value;
        }
        if let Some(value) = get(ENV_DIRECTORY_HOST) {
            self.directory.host = value;
        }
        if let Some(value) = get(ENV_DIRECTORY_PREFIX) {
            self.directory.prefix = value;
        }
        if let Some(value) = get(ENV_DIRECTORY_VERSION) {
            self.directory.version = value;
        }
        if let Some(value) = get(ENV_API_PREFIX) {
            self.api.prefix = value;
        }
        if let Some(value) = get(ENV_API_VERSION) {
            self.api.version = value;
        }
        if let Some(value) = get(ENV_API_PATH) {
            self.api.api_path = value;
        }
        if let Some(value) = get(ENV_AUTHORITY_SERVICE) {
            self.authority_service = value;
        }
        if let Some(value) = get(ENV_SESSION_CONTRACT) {
            self.session_contract = value.parse()?;
        }

        Ok(())
    }

    /// Region for directory lookups, `None` when unset
    pub fn region(&self) -> Option<&str> {
        Some(self.region.as_str()).filter(|r| !r.is_empty())
    }

    /// Reject configurations no call can succeed with
    pub fn validate(&self) -> Result<()> {
        if self.directory.host.is_empty() {
            return Err(Error::Config("Directory host is not set".to_string()));
        }
        if self.authority_service.is_empty() {
            return Err(Error::Config("Authority service name is empty".to_string()));
        }
        if self.secret.is_empty() && !self.dev {
            tracing::warn!("Shared secret is not set, service validation will be denied");
        }
        Ok(())
    }
}

/// `1`, `true`, `yes`, `on` (any case) are true; everything else is false
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// First existing config file for the platform
///
/// `<config dir>/techno/config.toml`, then `/etc/techno/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("techno").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/techno/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
