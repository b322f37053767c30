//! Connection settings for the service under test.

use std::{env, fmt, fs, io};

use log::warn;
use serde::Deserialize;

const ENV_HOST: &str = "CANDLEPIN_HOST";
const ENV_PORT: &str = "CANDLEPIN_PORT";
const ENV_USERNAME: &str = "CANDLEPIN_USERNAME";
const ENV_PASSWORD: &str = "CANDLEPIN_PASSWORD";

//------------ ConfigDefaults ------------------------------------------------

pub struct ConfigDefaults;

impl ConfigDefaults {
    fn host() -> String {
        env::var(ENV_HOST).unwrap_or_else(|_| "localhost".to_string())
    }

    fn port() -> u16 {
        match env::var(ENV_PORT) {
            Ok(port) => match port.parse() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "Unrecognized value for port in env var {}",
                        ENV_PORT
                    );
                    8443
                }
            },
            Err(_) => 8443,
        }
    }

    fn prefix() -> String {
        "/candlepin".to_string()
    }

    fn username() -> String {
        env::var(ENV_USERNAME).unwrap_or_else(|_| "admin".to_string())
    }

    fn password() -> String {
        env::var(ENV_PASSWORD).unwrap_or_else(|_| "admin".to_string())
    }
}

//------------ Config --------------------------------------------------------

/// Where and how to reach the service under test.
///
/// Every field has a default matching a local developer deployment, so
/// an empty config file, or none at all, yields a working setup.
/// Environment variables override the defaults but not explicit config
/// file values.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "ConfigDefaults::host")]
    pub host: String,

    #[serde(default = "ConfigDefaults::port")]
    pub port: u16,

    #[serde(default = "ConfigDefaults::prefix")]
    pub prefix: String,

    #[serde(default = "ConfigDefaults::username")]
    pub username: String,

    #[serde(default = "ConfigDefaults::password")]
    pub password: String,
}

impl Config {
    /// The default test configuration: a local deployment with the
    /// standard admin credentials.
    pub fn test() -> Self {
        Config {
            host: ConfigDefaults::host(),
            port: ConfigDefaults::port(),
            prefix: ConfigDefaults::prefix(),
            username: ConfigDefaults::username(),
            password: ConfigDefaults::password(),
        }
    }

    pub fn read_config(file: &str) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(file)?;
        let config: Config = toml::from_str(&s)?;
        Ok(config)
    }

    /// The base URI requests for this deployment go to.
    pub fn service_uri(&self) -> String {
        format!("https://{}:{}{}", self.host, self.port, self.prefix)
    }
}

//------------ ConfigError ---------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    TomlError(toml::de::Error),
    Other(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => e.fmt(f),
            ConfigError::TomlError(e) => e.fmt(f),
            ConfigError::Other(s) => s.fmt(f),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn other(s: &str) -> ConfigError {
        ConfigError::Other(s.to_string())
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::TomlError(e)
    }
}

//------------ Tests ---------------------------------------------------------
