// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::leaderboard::CommitPolicy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which document store backs the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL, allowed as a CORS origin
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    pub store_backend: StoreBackend,
    /// How long a leaderboard save is awaited before reporting a timeout
    pub leaderboard_save_timeout: Duration,
    /// How long a profile fetch is awaited before falling back
    pub profile_fetch_timeout: Duration,
    pub leaderboard_commit_policy: CommitPolicy,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            store_backend: StoreBackend::Memory,
            leaderboard_save_timeout: Duration::from_secs(10),
            profile_fetch_timeout: Duration::from_secs(5),
            leaderboard_commit_policy: CommitPolicy::LastWriterWins,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_value("PORT", env::var("PORT").ok(), 8080)?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            store_backend: parse_value(
                "STORE_BACKEND",
                env::var("STORE_BACKEND").ok(),
                StoreBackend::Firestore,
            )?,
            leaderboard_save_timeout: Duration::from_secs(parse_value(
                "LEADERBOARD_SAVE_TIMEOUT_SECS",
                env::var("LEADERBOARD_SAVE_TIMEOUT_SECS").ok(),
                10,
            )?),
            profile_fetch_timeout: Duration::from_secs(parse_value(
                "PROFILE_FETCH_TIMEOUT_SECS",
                env::var("PROFILE_FETCH_TIMEOUT_SECS").ok(),
                5,
            )?),
            leaderboard_commit_policy: parse_value(
                "LEADERBOARD_COMMIT_POLICY",
                env::var("LEADERBOARD_COMMIT_POLICY").ok(),
                CommitPolicy::LastWriterWins,
            )?,
        })
    }
}

/// Parse an optional variable, using `default` when it is unset or blank.
fn parse_value<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("LEADERBOARD_COMMIT_POLICY", "version-checked");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.leaderboard_commit_policy, CommitPolicy::VersionChecked);
    }

    #[test]
    fn test_parse_value_defaults_and_errors() {
        assert_eq!(parse_value::<u16>("PORT", None, 8080).unwrap(), 8080);
        assert_eq!(parse_value::<u16>("PORT", Some("  ".into()), 8080).unwrap(), 8080);
        assert_eq!(parse_value::<u64>("T", Some("3".into()), 10).unwrap(), 3);

        let err = parse_value::<u16>("PORT", Some("eighty".into()), 8080).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = parse_value("STORE_BACKEND", Some("postgres".into()), StoreBackend::Memory)
            .unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_default_timeouts() {
        let config = Config::default();
        assert_eq!(config.leaderboard_save_timeout, Duration::from_secs(10));
        assert_eq!(config.profile_fetch_timeout, Duration::from_secs(5));
    }
}
