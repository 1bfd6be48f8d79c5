//! HTTP transport configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::config::{env_flag, env_parse};

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// Directory holding a prebuilt client bundle to serve, if any.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Largest accepted request body, uploads included.
    #[serde(default = "default_body_limit")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cors() -> bool {
    true
}

fn default_body_limit() -> usize {
    25 * 1024 * 1024
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            host: default_host(),
            enable_cors: default_cors(),
            static_dir: None,
            max_body_bytes: default_body_limit(),
        }
    }
}

impl HttpConfig {
    /// Load HTTP config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env_parse("NOTES_HTTP_PORT").or_else(|| env_parse("PORT")) {
            config.port = port;
        }

        if let Ok(host) = std::env::var("NOTES_HTTP_HOST") {
            config.host = host;
        }

        if let Some(enable_cors) = env_flag("NOTES_HTTP_CORS") {
            config.enable_cors = enable_cors;
        }

        if let Ok(dir) = std::env::var("NOTES_STATIC_DIR") {
            config.static_dir = Some(PathBuf::from(dir));
        }

        if let Some(limit) = env_parse("NOTES_HTTP_MAX_BODY_BYTES") {
            config.max_body_bytes = limit;
        }

        config
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this listener for logging.
    pub fn description(&self) -> String {
        format!(
            "HTTP on {} (CORS {})",
            self.address(),
            if self.enable_cors { "enabled" } else { "disabled" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.address(), "127.0.0.1:3001");
        assert!(config.enable_cors);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_http_config_description() {
        let config = HttpConfig {
            port: 8080,
            host: "0.0.0.0".to_string(),
            enable_cors: false,
            ..Default::default()
        };
        assert_eq!(config.description(), "HTTP on 0.0.0.0:8080 (CORS disabled)");
    }
}
