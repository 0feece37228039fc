use sqlx::{ConnectOptions, Connection, mysql::MySqlConnectOptions};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::{
    descriptor::ConnectionDescriptor,
    probe::{Failure, Phase},
};

/// Connect, run `SELECT 1`, close
///
/// # Errors
///
/// Returns the failure of whichever phase did not complete
pub async fn ping(descriptor: &ConnectionDescriptor, limit: Duration) -> Result<(), Failure> {
    let mut options = MySqlConnectOptions::new()
        .host(super::bare_host(&descriptor.host))
        .port(descriptor.port)
        .database(&descriptor.database);

    if let Some(username) = descriptor.username.as_deref() {
        options = options.username(username);
    }

    if let Some(password) = descriptor.password() {
        options = options.password(password);
    }

    let options = options.disable_statement_logging();

    let mut conn = timeout(limit, options.connect())
        .await
        .map_err(|_| Failure::Timeout {
            phase: Phase::Connect,
            after: limit,
        })?
        .map_err(Failure::Connect)?;

    let result = timeout(limit, sqlx::query("SELECT 1").execute(&mut conn))
        .await
        .map_err(|_| Failure::Timeout {
            phase: Phase::Query,
            after: limit,
        })
        .and_then(|r| r.map_err(Failure::Query));

    if let Err(e) = conn.close().await {
        debug!("closing mysql connection: {e}");
    }

    result.map(|_| ())
}
