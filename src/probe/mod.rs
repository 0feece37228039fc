pub mod classify;
pub mod outcome;

pub use outcome::{Category, Classification, ProbeOutcome};

use crate::{config::DatabaseKind, descriptor::ConnectionDescriptor, metrics};
use futures::FutureExt;
use std::{any::Any, panic::AssertUnwindSafe, time::Duration};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Stage of a probe that failed or timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Query,
}

/// Raw failure of a probe, before classification
#[derive(Debug)]
pub enum Failure {
    DriverUnavailable,
    InvalidTarget(String),
    Connect(sqlx::Error),
    Query(sqlx::Error),
    Timeout { phase: Phase, after: Duration },
    Panicked(String),
}

/// Client drivers the prober may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drivers {
    postgres: bool,
    mysql: bool,
}

impl Drivers {
    /// Drivers built into this binary
    #[must_use]
    pub const fn compiled() -> Self {
        Self {
            postgres: cfg!(feature = "postgres"),
            mysql: cfg!(feature = "mysql"),
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            postgres: false,
            mysql: false,
        }
    }

    #[must_use]
    pub const fn without(self, kind: DatabaseKind) -> Self {
        match kind {
            DatabaseKind::Postgres => Self {
                postgres: false,
                ..self
            },
            DatabaseKind::Mysql => Self {
                mysql: false,
                ..self
            },
        }
    }

    #[must_use]
    pub const fn is_available(self, kind: DatabaseKind) -> bool {
        match kind {
            DatabaseKind::Postgres => self.postgres,
            DatabaseKind::Mysql => self.mysql,
        }
    }
}

impl Default for Drivers {
    fn default() -> Self {
        Self::compiled()
    }
}

/// Runs one connect + `SELECT 1` attempt per call
#[derive(Debug, Clone, Copy)]
pub struct Prober {
    drivers: Drivers,
    timeout: Duration,
}

impl Prober {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            drivers: Drivers::compiled(),
            timeout,
        }
    }

    #[must_use]
    pub const fn with_drivers(mut self, drivers: Drivers) -> Self {
        self.drivers = drivers;
        self
    }

    /// Probe the database, every failure ends up classified in the outcome
    pub async fn probe(&self, descriptor: &ConnectionDescriptor) -> ProbeOutcome {
        let started = Instant::now();
        debug!(db = %descriptor, timeout = ?self.timeout, "probing database");

        let result = AssertUnwindSafe(self.attempt(descriptor))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Failure::Panicked(panic_message(panic.as_ref()))));

        let outcome = match result {
            Ok(()) => {
                info!(db = %descriptor, "database is alive");
                ProbeOutcome::healthy(descriptor)
            }
            Err(failure) => {
                let classification = classify::classify(&failure, descriptor);
                warn!(
                    db = %descriptor,
                    category = %classification.category,
                    reason = %classification.message,
                    "database probe failed"
                );
                ProbeOutcome::failed(classification, descriptor)
            }
        };

        metrics::record(descriptor.kind, &outcome, started.elapsed());

        outcome
    }

    async fn attempt(&self, descriptor: &ConnectionDescriptor) -> Result<(), Failure> {
        if !self.drivers.is_available(descriptor.kind) {
            return Err(Failure::DriverUnavailable);
        }

        validate(descriptor).map_err(Failure::InvalidTarget)?;

        match descriptor.kind {
            #[cfg(feature = "postgres")]
            DatabaseKind::Postgres => crate::queries::postgres::ping(descriptor, self.timeout).await,
            #[cfg(feature = "mysql")]
            DatabaseKind::Mysql => crate::queries::mysql::ping(descriptor, self.timeout).await,
            #[allow(unreachable_patterns)]
            _ => Err(Failure::DriverUnavailable),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "driver panicked".to_string())
}

fn has_control(value: &str) -> bool {
    value.chars().any(char::is_control)
}

/// Reject descriptors that cannot name a TCP endpoint
///
/// # Errors
///
/// Returns the reason the descriptor is unusable
pub fn validate(descriptor: &ConnectionDescriptor) -> Result<(), String> {
    let host = descriptor.host.as_str();

    if host.is_empty() {
        return Err("host is empty".to_string());
    }

    if host.chars().any(char::is_whitespace) || has_control(host) {
        return Err(format!("host {host:?} contains whitespace or control characters"));
    }

    if let Some(c) = host.chars().find(|c| matches!(c, '/' | '?' | '#' | '@' | '\\')) {
        return Err(format!("host {host:?} contains invalid character {c:?}"));
    }

    if host.starts_with('[') != host.ends_with(']') {
        return Err(format!("host {host:?} has unbalanced brackets"));
    }

    if descriptor.port == 0 {
        return Err("port must be between 1 and 65535".to_string());
    }

    if has_control(&descriptor.database) {
        return Err(format!(
            "database name {:?} contains control characters",
            descriptor.database
        ));
    }

    if let Some(user) = descriptor.username.as_deref()
        && has_control(user)
    {
        return Err(format!("username {user:?} contains control characters"));
    }

    Ok(())
}
