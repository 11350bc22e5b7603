//! Server configuration parsed from environment variables.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres backend when set, in-memory otherwise.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("INTAKE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "INTAKE_BIND_ADDR",
            expected: "a socket address such as 0.0.0.0:8080",
            value: bind_addr.clone(),
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let db_max_connections = match lookup("INTAKE_DB_MAX_CONNECTIONS") {
            None => DEFAULT_DB_MAX_CONNECTIONS,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "INTAKE_DB_MAX_CONNECTIONS",
                    expected: "a positive integer",
                    value: raw,
                })?,
        };

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_select_in_memory_backend() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.database_url, None);
        assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    }

    #[test]
    fn blank_database_url_is_ignored() {
        let config = parse(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = parse(&[
            ("INTAKE_BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/intake"),
            ("INTAKE_DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/intake"));
        assert_eq!(config.db_max_connections, 12);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse(&[("INTAKE_BIND_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().starts_with("INTAKE_BIND_ADDR"));

        for bad in ["0", "-1", "many"] {
            let err = parse(&[("INTAKE_DB_MAX_CONNECTIONS", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "INTAKE_DB_MAX_CONNECTIONS", .. }));
        }
    }
}
