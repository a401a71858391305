//! Process configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first (if present), so
//! local runs don't need exported variables.

use std::net::SocketAddr;

use thiserror::Error;

const DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Runtime settings for the API binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Postgres URL; `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub session_secret: String,
    pub session_ttl_minutes: i64,
    pub admin_username: String,
    pub admin_password: String,
}

impl Settings {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8000)),
        };

        let session_ttl_minutes = match get("SESSION_TTL_MINUTES") {
            Some(raw) => {
                let minutes: i64 = raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        var: "SESSION_TTL_MINUTES",
                        reason: e.to_string(),
                    }
                })?;
                if minutes <= 0 {
                    return Err(ConfigError::Invalid {
                        var: "SESSION_TTL_MINUTES",
                        reason: "must be positive".to_string(),
                    });
                }
                minutes
            }
            None => 24 * 60,
        };

        let session_secret = get("SESSION_SECRET").unwrap_or_else(|| {
            tracing::warn!("SESSION_SECRET not set; using insecure dev default");
            DEV_SESSION_SECRET.to_string()
        });

        let admin_username = get("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
        let admin_password = get("ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!("ADMIN_PASSWORD not set; bootstrap account uses the dev default");
            "admin".to_string()
        });

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            session_secret,
            session_ttl_minutes,
            admin_username,
            admin_password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_select_in_memory_dev_setup() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(settings.database_url, None);
        assert_eq!(settings.session_ttl_minutes, 1440);
        assert_eq!(settings.admin_username, "admin");
    }

    #[test]
    fn reads_explicit_values() {
        let settings = Settings::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/tours"),
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_TTL_MINUTES", "30"),
            ("ADMIN_USERNAME", "guia"),
            ("ADMIN_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert_eq!(settings.bind_addr.port(), 9000);
        assert_eq!(settings.database_url.as_deref(), Some("postgres://localhost/tours"));
        assert_eq!(settings.session_secret, "s3cret");
        assert_eq!(settings.session_ttl_minutes, 30);
        assert_eq!(settings.admin_username, "guia");
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let settings = Settings::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(settings.database_url, None);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = Settings::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BIND_ADDR", .. }));

        let err = Settings::from_lookup(lookup(&[("SESSION_TTL_MINUTES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SESSION_TTL_MINUTES", .. }));
    }
}
