use crate::errors::{CatError, CatResult};
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

pub const CCAT_HOST: &str = "localhost";
pub const CCAT_PORT: u16 = 1865;
pub const DEFAULT_USER_ID: &str = "user";
pub const DEFAULT_AGENT_ID: &str = "agent";

/// Connection settings for a Cat instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CatConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Use https/wss instead of http/ws
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secure: false,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            user_id: default_user_id(),
            agent_id: default_agent_id(),
        }
    }
}

impl CatConfig {
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Load defaults layered with `CCAT_*` environment variables.
    ///
    /// Values are kept as strings and only converted for typed fields, so
    /// `CCAT_API_KEY=0123` stays `"0123"`.
    pub fn from_env() -> CatResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CCAT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize().map_err(CatError::Config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn http_base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn ws_base_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

fn default_host() -> String {
    CCAT_HOST.to_string()
}

fn default_port() -> u16 {
    CCAT_PORT
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_agent_id() -> String {
    DEFAULT_AGENT_ID.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("CCAT_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let config = CatConfig::from_env().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1865);
        assert!(!config.secure);
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout_secs, 600);
        assert_eq!(config.user_id, "user");
        assert_eq!(config.agent_id, "agent");
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("CCAT_HOST", "cat.example.com");
        env::set_var("CCAT_PORT", "443");
        env::set_var("CCAT_SECURE", "true");
        env::set_var("CCAT_API_KEY", "meow");
        env::set_var("CCAT_USER_ID", "alice");

        let config = CatConfig::from_env().unwrap();
        assert_eq!(config.host, "cat.example.com");
        assert_eq!(config.port, 443);
        assert!(config.secure);
        assert_eq!(config.api_key.as_deref(), Some("meow"));
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.http_base_url(), "https://cat.example.com:443");
        assert_eq!(config.ws_base_url(), "wss://cat.example.com:443");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port() {
        clean_env();
        env::set_var("CCAT_PORT", "not-a-port");

        let result = CatConfig::from_env();
        assert!(matches!(result, Err(CatError::Config(_))));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_numeric_looking_strings_are_kept() {
        clean_env();
        env::set_var("CCAT_API_KEY", "0123");
        env::set_var("CCAT_USER_ID", "007");
        env::set_var("CCAT_AGENT_ID", "42");

        let config = CatConfig::from_env().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("0123"));
        assert_eq!(config.user_id, "007");
        assert_eq!(config.agent_id, "42");

        clean_env();
    }

    #[test]
    fn test_base_urls() {
        let config = CatConfig::new("localhost", 1865);
        assert_eq!(config.http_base_url(), "http://localhost:1865");
        assert_eq!(config.ws_base_url(), "ws://localhost:1865");
        assert_eq!(config.timeout(), Duration::from_secs(600));
    }
}
