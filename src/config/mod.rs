// src/config/mod.rs

use std::env;

/// Environments that turn on diagnostic error bodies.
const DIAGNOSTIC_ENVIRONMENTS: [&str; 2] = ["local", "testing"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set (put it in .env for local runs)")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub app_env: String,
    pub app_debug: bool,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
                expected: "a port number",
            })?,
            None => 8080,
        };

        let app_env = lookup("APP_ENV")
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "production".into());

        let app_debug = match lookup("APP_DEBUG") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name: "APP_DEBUG",
                value: raw,
                expected: "true/false",
            })?,
            None => false,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "DB_MAX_CONNECTIONS",
                    value: raw,
                    expected: "a positive integer",
                })?,
            None => 10,
        };

        Ok(Self { database_url, port, app_env, app_debug, db_max_connections })
    }

    /// Internal error detail goes out in responses only for local/testing
    /// environments or when APP_DEBUG is on.
    pub fn diagnostic_mode(&self) -> bool {
        self.app_debug || DIAGNOSTIC_ENVIRONMENTS.contains(&self.app_env.as_str())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
