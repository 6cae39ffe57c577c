//! Configuration management

use crate::error::{ErrorContext, HearthError, HearthResult};
use crate::types::{AuthConfig, HearthConfig, ServerConfig};

use std::path::Path;

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                api_root: "/api/v1".to_string(),
            },
            auth: AuthConfig {
                signing_secret: "hearth-default-secret-change-in-production".to_string(),
                token_ttl_secs: 3600,
                issuer: "hearth".to_string(),
            },
            federation: None,
        }
    }
}

impl HearthConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> HearthResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HearthError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: HearthConfig = toml::from_str(&content).map_err(|e| HearthError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> HearthResult<()> {
        if self.auth.signing_secret.is_empty() {
            return Err(HearthError::Config {
                message: "auth.signing_secret must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set auth.signing_secret to a non-empty value"),
            });
        }

        if self.auth.token_ttl_secs <= 0 {
            return Err(HearthError::Config {
                message: "auth.token_ttl_secs must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set auth.token_ttl_secs to a positive value"),
            });
        }

        if !self.server.api_root.starts_with('/') {
            return Err(HearthError::Config {
                message: "server.api_root must start with '/'".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use an absolute path prefix such as /api/v1"),
            });
        }

        if let Some(federation) = &self.federation {
            if federation.issuer_url.is_empty() {
                return Err(HearthError::Config {
                    message: "federation.issuer_url must not be empty when federation is enabled"
                        .to_string(),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion("Set federation.issuer_url or remove the section"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = HearthConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_signing_secret() {
        let mut config = HearthConfig::default();
        config.auth.signing_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let mut config = HearthConfig::default();
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_config_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 9090
api_root = "/api/v1"

[auth]
signing_secret = "unit-test-secret"
token_ttl_secs = 600
issuer = "hearth-test"
"#
        )
        .unwrap();

        let config = HearthConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.token_ttl_secs, 600);
        assert!(config.federation.is_none());
        assert!(config.validate().is_ok());
    }
}
