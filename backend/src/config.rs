//! Server configuration read from the environment.
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `3000`)
//! - `DATABASE_URL`: SQLite location (default `sqlite:///tasks.db`).
//!   `sqlite:///relative.db`, `sqlite:////abs/path.db`, a bare path, and
//!   `sqlite://` or `sqlite:///:memory:` for an in-memory store are accepted.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::db::DatabaseLocation;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///tasks.db";

const SQLITE_SCHEME: &str = "sqlite://";
const MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: ParseIntError,
    },

    #[error("unsupported DATABASE_URL {0:?}: only sqlite is supported")]
    UnsupportedDatabaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseLocation,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with variables taken from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };
        let database = parse_database_url(
            var("DATABASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_DATABASE_URL),
        )?;

        Ok(Self {
            host,
            port,
            database,
        })
    }
}

pub fn parse_database_url(url: &str) -> Result<DatabaseLocation, ConfigError> {
    let url = url.trim();
    let path = match url.strip_prefix(SQLITE_SCHEME) {
        // One slash separates the (empty) authority from the path.
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None if url.contains("://") => {
            return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()))
        }
        None => url,
    };

    if path.is_empty() || path == MEMORY {
        Ok(DatabaseLocation::Memory)
    } else {
        Ok(DatabaseLocation::File(PathBuf::from(path)))
    }
}
