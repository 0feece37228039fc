//! Driver-specific liveness queries
//!
//! Each driver module opens one connection, runs `SELECT 1` and closes it,
//! with both the connect and the query bounded by the probe timeout.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Host as the drivers expect it, IPv6 literals without brackets
#[cfg(any(feature = "postgres", feature = "mysql"))]
fn bare_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}
