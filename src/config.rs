use std::{collections::HashMap, env, fmt, hash::BuildHasher, time::Duration};
use thiserror::Error;

pub const DB_TYPE: &str = "DB_TYPE";
pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_NAME: &str = "DB_NAME";
pub const DB_CONNECT_TIMEOUT: &str = "DB_CONNECT_TIMEOUT";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Read-only view over named configuration values
///
/// The resolver only ever asks for a key and gets back the raw value, so the
/// process environment can be swapped for a fixed mapping in tests.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Live process environment, read on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl ConfigSource for Env {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl<S: BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Supported database kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatabaseKind {
    #[default]
    Postgres,
    Mysql,
}

impl DatabaseKind {
    /// Map a raw kind selector onto a supported kind, unknown values fall back to postgres
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("mysql") => Self::Mysql,
            _ => Self::Postgres,
        }
    }

    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Mysql => 3306,
        }
    }

    #[must_use]
    pub const fn default_database(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }

    /// Client driver used to reach this kind of database
    #[must_use]
    pub const fn driver(self) -> &'static str {
        match self {
            Self::Postgres => "sqlx-postgres",
            Self::Mysql => "sqlx-mysql",
        }
    }

    /// URL scheme used in the redacted connection string
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::Mysql => "mysql",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value was present in the configuration but could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: expected a port number between 1 and 65535")]
    InvalidPort { key: &'static str, value: String },

    #[error("invalid {key} value {value:?}: expected a positive number of seconds")]
    InvalidTimeout { key: &'static str, value: String },
}

impl ConfigError {
    #[must_use]
    pub const fn hint(&self) -> &'static str {
        match self {
            Self::InvalidPort { .. } => "Set DB_PORT to a numeric port, or unset it to use the default.",
            Self::InvalidTimeout { .. } => {
                "Set DB_CONNECT_TIMEOUT to a whole number of seconds, or unset it to use the default."
            }
        }
    }
}

/// Configuration after defaults have been applied
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub kind: DatabaseKind,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub timeout: Duration,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Read a key, trimming whitespace; empty values count as absent
fn read<S: ConfigSource + ?Sized>(source: &S, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort {
            key: DB_PORT,
            value: value.to_string(),
        }),
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            key: DB_CONNECT_TIMEOUT,
            value: value.to_string(),
        }),
    }
}

/// Resolve the database configuration from `source`
///
/// Missing keys fall back to their defaults, kind-dependent defaults follow
/// the normalized kind.
///
/// # Errors
///
/// Returns an error if a port or timeout is present but not a valid number
pub fn resolve<S: ConfigSource + ?Sized>(source: &S) -> Result<ResolvedConfig, ConfigError> {
    let kind = DatabaseKind::normalize(read(source, DB_TYPE).as_deref());

    let port = read(source, DB_PORT)
        .map(|v| parse_port(&v))
        .transpose()?
        .unwrap_or_else(|| kind.default_port());

    let timeout = read(source, DB_CONNECT_TIMEOUT)
        .map(|v| parse_timeout(&v))
        .transpose()?
        .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    Ok(ResolvedConfig {
        kind,
        host: read(source, DB_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port,
        user: read(source, DB_USER),
        password: read(source, DB_PASSWORD),
        database: read(source, DB_NAME).unwrap_or_else(|| kind.default_database().to_string()),
        timeout,
    })
}
